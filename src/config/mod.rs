//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NetkitConfig (validated)
//!     → Http::init / Socket::init
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent over a channel; Http::follow swaps it in
//! ```
//!
//! # Design Decisions
//! - Reconfiguration replaces a component's config wholesale
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BaseInit, HttpConfig, LoggingConfig, NetkitConfig, SocketConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::{ConfigWatcher, Reload};
