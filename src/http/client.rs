//! HTTP helper with base configuration and outcome hooks.
//!
//! # Responsibilities
//! - Hold the active configuration (base URI, base headers, base init)
//! - Send prepared requests through a shared `reqwest::Client`
//! - Route every outcome through the success or error hook

use std::sync::Arc;

use arc_swap::ArcSwap;
use reqwest::Method;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::schema::NetkitConfig;
use crate::http::request::{resolve_uri, PreparedRequest};
use crate::http::response::handle_response;
use crate::http::types::{
    Body, ErrorHook, HttpConfig, HttpError, HttpResult, RequestOptions, SuccessHook,
};

#[derive(Clone)]
struct Hooks {
    success: SuccessHook,
    error: ErrorHook,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            success: Arc::new(pass_through),
            error: Arc::new(rethrow),
        }
    }
}

fn pass_through(payload: Value) -> HttpResult<Value> {
    Ok(payload)
}

fn rethrow(error: HttpError) -> HttpResult<Value> {
    Err(error)
}

/// HTTP helper.
///
/// Configuration and hooks can be replaced at any time through a shared
/// reference; calls already in flight keep the values they started with.
pub struct Http {
    client: reqwest::Client,
    config: ArcSwap<HttpConfig>,
    hooks: ArcSwap<Hooks>,
}

impl Http {
    pub fn new(config: HttpConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Use a preconfigured `reqwest` client.
    pub fn with_client(client: reqwest::Client, config: HttpConfig) -> Self {
        Self {
            client,
            config: ArcSwap::from_pointee(config),
            hooks: ArcSwap::from_pointee(Hooks::default()),
        }
    }

    /// Replace the configuration wholesale.
    pub fn init(&self, config: HttpConfig) {
        tracing::debug!(
            base_uri = %config.base_uri,
            headers = config.base_headers.len(),
            "HTTP config replaced"
        );
        self.config.store(Arc::new(config));
    }

    /// Current configuration.
    pub fn config(&self) -> Arc<HttpConfig> {
        self.config.load_full()
    }

    /// Replace the hook applied to every successful payload.
    pub fn on_success<F>(&self, hook: F)
    where
        F: Fn(Value) -> HttpResult<Value> + Send + Sync + 'static,
    {
        let mut hooks = Hooks::clone(&self.hooks.load());
        hooks.success = Arc::new(hook);
        self.hooks.store(Arc::new(hooks));
    }

    /// Replace the hook applied to every failed outcome.
    pub fn on_error<F>(&self, hook: F)
    where
        F: Fn(HttpError) -> HttpResult<Value> + Send + Sync + 'static,
    {
        let mut hooks = Hooks::clone(&self.hooks.load());
        hooks.error = Arc::new(hook);
        self.hooks.store(Arc::new(hooks));
    }

    /// Full URL for `uri` under the current configuration.
    pub fn resolve(&self, uri: &str) -> String {
        resolve_uri(&self.config.load().base_uri, uri)
    }

    /// Apply every config received on `updates` until the sender closes.
    pub fn follow(
        self: Arc<Self>,
        mut updates: mpsc::UnboundedReceiver<NetkitConfig>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(config) = updates.recv().await {
                tracing::info!(base_uri = %config.http.base_uri, "Applying reloaded HTTP config");
                self.init(config.http);
            }
        })
    }

    /// Send a request.
    ///
    /// Transport failures are returned as-is. Everything else goes through
    /// the hooks: a parsed payload through the success hook, and a status
    /// error or a failing success hook through the error hook.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Body,
        options: RequestOptions,
    ) -> HttpResult<Value> {
        let config = self.config.load_full();
        let prepared = PreparedRequest::new(&config, method, uri, body, options)?;

        tracing::debug!(method = %prepared.method, url = %prepared.url, "Sending request");

        let response = prepared.into_builder(&self.client).send().await?;

        let hooks = self.hooks.load_full();
        match handle_response(response).await.and_then(|payload| (hooks.success)(payload)) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                tracing::debug!(error = %error, "Request failed");
                (hooks.error)(error)
            }
        }
    }

    pub async fn get(&self, uri: &str, options: RequestOptions) -> HttpResult<Value> {
        self.request(Method::GET, uri, Body::Empty, options).await
    }

    pub async fn delete(&self, uri: &str, options: RequestOptions) -> HttpResult<Value> {
        self.request(Method::DELETE, uri, Body::Empty, options).await
    }

    pub async fn post(
        &self,
        uri: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> HttpResult<Value> {
        self.request(Method::POST, uri, body.into(), options).await
    }

    pub async fn patch(
        &self,
        uri: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> HttpResult<Value> {
        self.request(Method::PATCH, uri, body.into(), options).await
    }

    pub async fn put(
        &self,
        uri: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> HttpResult<Value> {
        self.request(Method::PUT, uri, body.into(), options).await
    }
}

impl Default for Http {
    fn default() -> Self {
        Self::new(HttpConfig::default())
    }
}

impl std::fmt::Debug for Http {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.config.load();
        f.debug_struct("Http")
            .field("base_uri", &config.base_uri)
            .field("base_headers", &config.base_headers)
            .field("base_init", &config.base_init)
            .finish()
    }
}
