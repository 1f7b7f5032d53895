//! Data models for the email separator.
//!
//! - [`EmailSet`]: deduplicated, trimmed, case-sensitive set of addresses
//! - [`TaskSlot`]: the four independent operation slots (load main, load unwanted, separate, export)
//! - [`AppState`]: the central state container (main list, unwanted list, pasted text, result)
//! - [`UserConfig`]: user preferences loaded from `Separator Settings.yaml`
//!
//! # Architecture Note
//!
//! Large sets are shared as `Arc<EmailSet>` so that cloning [`AppState`] for a snapshot,
//! or handing a set to a worker, never copies the entries. State updates go through
//! [`StateManager`](crate::state::StateManager).

pub mod app_state;
pub mod config;
pub mod email_set;
pub mod task;

pub use app_state::{AppState, LoadedList, READY_STATUS, SeparationInputs, SeparationResult};
pub use config::{SeparatorSettings, UserConfig};
pub use email_set::{EmailSet, LineBreaks, Lines, normalize_line, split_lines};
pub use task::TaskSlot;
