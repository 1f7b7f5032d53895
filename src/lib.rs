// Email Separator - Remove unwanted addresses from a mailing list
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the command-line entry point.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use app::{Notification, SeparatorController};
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{AppState, EmailSet, SeparatorSettings, TaskSlot, UserConfig};
pub use services::TaskError;
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
