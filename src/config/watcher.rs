//! Config file hot reload.
//!
//! # Responsibilities
//! - Watch the directory holding the config file
//! - Reload and validate the file when it changes
//! - Hand each accepted config to the consumer (usually [`Http::follow`])
//!
//! # Design Decisions
//! - The parent directory is watched, not the file, so saves that replace
//!   the file by rename keep being seen
//! - A file that fails to load keeps the current config in place
//! - Once the consumer is gone the watcher stops reloading for good
//!
//! [`Http::follow`]: crate::http::Http::follow

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::NetkitConfig;

/// Result of one reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    /// The new config was sent to the consumer.
    Applied,
    /// The file did not load or validate; nothing was sent.
    Rejected,
    /// The consumer is gone; no further reloads happen.
    Closed,
}

/// Reloads a config file into a channel whenever it changes.
pub struct ConfigWatcher {
    path: PathBuf,
    file_name: Option<OsString>,
    updates: mpsc::UnboundedSender<NetkitConfig>,
    closed: AtomicBool,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<NetkitConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();

        let watcher = Self {
            path: path.to_path_buf(),
            file_name: path.file_name().map(OsString::from),
            updates,
            closed: AtomicBool::new(false),
        };
        (watcher, rx)
    }

    /// Directory that gets watched.
    pub fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// True once the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Whether `event` touches the watched file.
    pub fn concerns(&self, event: &Event) -> bool {
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return false;
        }
        event
            .paths
            .iter()
            .any(|path| path.file_name() == self.file_name.as_deref())
    }

    /// Load the file and send it to the consumer.
    pub fn reload(&self) -> Reload {
        if self.is_closed() || self.updates.is_closed() {
            self.close();
            return Reload::Closed;
        }

        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Config reload rejected, keeping current config"
                );
                return Reload::Rejected;
            }
        };

        match self.updates.send(config) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Config reloaded");
                Reload::Applied
            }
            Err(_) => {
                self.close();
                Reload::Closed
            }
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::warn!(
                path = %self.path.display(),
                "Config consumer dropped, stopping reloads"
            );
        }
    }

    /// Start watching. Keep the returned watcher alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let directory = self.directory().to_path_buf();
        let this = Arc::new(self);
        let handler = Arc::clone(&this);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if !handler.is_closed() && handler.concerns(&event) => {
                    tracing::debug!(kind = ?event.kind, "Config file changed");
                    handler.reload();
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(
            path = %this.path.display(),
            directory = %directory.display(),
            "Config watcher started"
        );
        Ok(watcher)
    }
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}
