//! Services module - Pure business logic for list loading, separation and export.
//!
//! The services are **framework-agnostic**: they know nothing about slots, channels or
//! the presentation layer. Progress is reported through plain `FnMut(u8)` callbacks,
//! which the [`TaskExecutor`](crate::app::TaskExecutor) wires to its event channel.
//!
//! # Components
//!
//! - [`loader`]: reads a UTF-8 list file into an [`EmailSet`](crate::models::EmailSet),
//!   reporting batched progress
//! - [`set_ops`]: combiner, difference engine and preview calculator (no I/O)
//! - [`exporter`]: writes a set sorted byte-wise, one entry per line, with a summary
//! - [`progress`]: the batched cadence shared by loader and exporter
//! - [`error`]: [`TaskError`], the failure taxonomy surfaced to the user
//!
//! # Usage Example
//!
//! ```ignore
//! use camino::Utf8Path;
//! use email_separator::services::{combine, load_set, separate};
//!
//! let main = load_set(Utf8Path::new("main.txt"), 1000, |p| println!("{p}%")).await?;
//! let unwanted = combine("spam@x.com\n", None);
//! let remaining = separate(&main.emails, &unwanted);
//! ```

pub mod error;
pub mod exporter;
pub mod loader;
pub mod progress;
pub mod set_ops;

pub use error::TaskError;
pub use exporter::{ExportSummary, export_sorted, format_elapsed, format_size};
pub use loader::{LoadOutcome, load_set, parse_with_progress};
pub use progress::ProgressCadence;
pub use set_ops::{Preview, TruncatedList, combine, preview, separate};
