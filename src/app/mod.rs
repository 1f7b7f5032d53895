// App module - orchestration between the front end and the workers
//
// This module contains:
// - TaskExecutor: spawns one tokio worker per operation and funnels progress/finished events
// - SeparatorController: validates operations, applies results to state, produces notifications

pub mod controller;
pub mod executor;

pub use controller::{Notification, SeparatorController};
pub use executor::{ProgressReporter, TaskEvent, TaskEventKind, TaskExecutor, TaskOutput};
