//! Connection lifecycle hooks.
//!
//! # Responsibilities
//! - Hold the optional callbacks for before-open, open, error, message, close
//! - Merge a partial hook set over an existing one
//!
//! # Design Decisions
//! - Unset hooks are no-ops
//! - Merging keeps existing hooks unless the newer set provides one

use std::sync::Arc;

use serde_json::Value;

use crate::socket::types::{CloseInfo, SocketError};

type Hook = Arc<dyn Fn() + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&SocketError) + Send + Sync>;
type MessageHook = Arc<dyn Fn(&Value) + Send + Sync>;
type CloseHook = Arc<dyn Fn(&CloseInfo) + Send + Sync>;

/// Callbacks invoked at connection-state transitions.
#[derive(Clone, Default)]
pub struct Lifecycle {
    before_open: Option<Hook>,
    open: Option<Hook>,
    error: Option<ErrorHook>,
    message: Option<MessageHook>,
    close: Option<CloseHook>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs on every `init`, before any connection attempt.
    pub fn before_open<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.before_open = Some(Arc::new(hook));
        self
    }

    /// Runs once the handshake completes.
    pub fn on_open<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.open = Some(Arc::new(hook));
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SocketError) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(hook));
        self
    }

    /// Runs for every decoded inbound payload, before event handlers.
    pub fn on_message<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.message = Some(Arc::new(hook));
        self
    }

    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CloseInfo) + Send + Sync + 'static,
    {
        self.close = Some(Arc::new(hook));
        self
    }

    /// Overlay the hooks set in `other` on top of `self`.
    pub fn merge(self, other: Lifecycle) -> Lifecycle {
        Lifecycle {
            before_open: other.before_open.or(self.before_open),
            open: other.open.or(self.open),
            error: other.error.or(self.error),
            message: other.message.or(self.message),
            close: other.close.or(self.close),
        }
    }

    pub(crate) fn fire_before_open(&self) {
        if let Some(hook) = &self.before_open {
            hook();
        }
    }

    pub(crate) fn fire_open(&self) {
        if let Some(hook) = &self.open {
            hook();
        }
    }

    pub(crate) fn fire_error(&self, error: &SocketError) {
        if let Some(hook) = &self.error {
            hook(error);
        }
    }

    pub(crate) fn fire_message(&self, payload: &Value) {
        if let Some(hook) = &self.message {
            hook(payload);
        }
    }

    pub(crate) fn fire_close(&self, info: &CloseInfo) {
        if let Some(hook) = &self.close {
            hook(info);
        }
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("before_open", &self.before_open.is_some())
            .field("open", &self.open.is_some())
            .field("error", &self.error.is_some())
            .field("message", &self.message.is_some())
            .field("close", &self.close.is_some())
            .finish()
    }
}
