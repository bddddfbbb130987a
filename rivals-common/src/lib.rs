//! Shared plumbing for the Rivals workspace.
//!
//! Kept dependency-light so every crate (and every test binary) can pull it in
//! without dragging the HTTP or TUI stacks along.
//!
//! - [`observability`]: centralised `tracing` initialisation
//!
//! ```rust
//! use rivals_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, "rivals");
//! ```

pub mod observability;

/// Application name used for log file names and default data directories.
pub const APP_NAME: &str = "rivals";
