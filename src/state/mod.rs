// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for presentation updates.

use crate::models::{AppState, LoadedList, SeparationInputs, SeparationResult, TaskSlot};
use camino::Utf8PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events notify interested parties (the presentation layer, tests)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A new main list replaced the previous one
    MainListLoaded { count: usize, source: Utf8PathBuf },

    /// A new unwanted list replaced the previous one
    UnwantedListLoaded { count: usize, source: Utf8PathBuf },

    /// The pasted text changed
    PastedTextChanged { pasted_count: usize },

    /// A separation completed
    ResultComputed { remaining: usize, removed: usize },

    /// Inputs changed after the result was computed
    ResultInvalidated,

    /// An operation slot became busy
    TaskStarted { slot: TaskSlot },

    /// Progress of a running slot changed
    ProgressUpdated { slot: TaskSlot, percent: u8 },

    /// An operation slot became idle again
    TaskFinished { slot: TaskSlot },

    /// The status line changed
    StatusChanged { message: String },

    /// State has been reset
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`AppState`] directly:
/// - [`read()`](Self::read) for reading state through a closure
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// Writers are expected to be the controller's completion handling only; see
/// [`crate::app::SeparatorController`].
pub struct StateManager {
    /// The application state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a snapshot of the current state
    ///
    /// Sets are behind `Arc`, so this never copies list entries.
    pub fn snapshot(&self) -> AppState {
        self.read(AppState::clone)
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let loaded = state_manager.read(|state| state.main_count());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        // Poisoning only means a writer panicked; the state is still readable
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        let same_list = |a: &Option<LoadedList>, b: &Option<LoadedList>| match (a, b) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        };

        // Task lifecycle first so listeners see "started" before any progress
        for slot in new.active_tasks.difference(&old.active_tasks) {
            changes.push(StateChange::TaskStarted { slot: *slot });
        }

        if !same_list(&old.main_list, &new.main_list) {
            if let Some(list) = &new.main_list {
                changes.push(StateChange::MainListLoaded {
                    count: list.len(),
                    source: list.source.clone(),
                });
            }
        }

        if !same_list(&old.unwanted_list, &new.unwanted_list) {
            if let Some(list) = &new.unwanted_list {
                changes.push(StateChange::UnwantedListLoaded {
                    count: list.len(),
                    source: list.source.clone(),
                });
            }
        }

        if old.pasted_text != new.pasted_text {
            changes.push(StateChange::PastedTextChanged {
                pasted_count: new.pasted_emails().len(),
            });
        }

        let result_changed = match (&old.result, &new.result) {
            (Some(a), Some(b)) => !a.same_as(b),
            (None, None) => false,
            _ => true,
        };
        if result_changed {
            if let Some(result) = &new.result {
                changes.push(StateChange::ResultComputed {
                    remaining: result.emails.len(),
                    removed: result.main_count.saturating_sub(result.emails.len()),
                });
            }
        }

        if !old.result_stale && new.result_stale {
            changes.push(StateChange::ResultInvalidated);
        }

        for (slot, percent) in &new.progress {
            if old.progress.get(slot) != Some(percent) {
                changes.push(StateChange::ProgressUpdated {
                    slot: *slot,
                    percent: *percent,
                });
            }
        }

        for slot in old.active_tasks.difference(&new.active_tasks) {
            changes.push(StateChange::TaskFinished { slot: *slot });
        }

        if old.status_message != new.status_message {
            changes.push(StateChange::StatusChanged {
                message: new.status_message.clone(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Replace the main list wholesale; an existing result becomes stale
    pub fn set_main_list(&self, list: LoadedList) -> Vec<StateChange> {
        self.update(|state| {
            state.main_list = Some(list);
            state.invalidate_result();
        })
    }

    /// Replace the unwanted list wholesale; an existing result becomes stale
    pub fn set_unwanted_list(&self, list: LoadedList) -> Vec<StateChange> {
        self.update(|state| {
            state.unwanted_list = Some(list);
            state.invalidate_result();
        })
    }

    /// Store the current pasted text; a different text makes an existing result stale
    pub fn set_pasted_text(&self, text: impl Into<String>) -> Vec<StateChange> {
        let text = text.into();
        self.update(|state| {
            if *state.pasted_text != *text {
                state.pasted_text = Arc::from(text);
                state.invalidate_result();
            }
        })
    }

    /// Publish a result computed from `inputs`.
    ///
    /// The result is stored either way, but flagged stale when the inputs held by
    /// the state are no longer the ones it was computed from.
    pub fn set_result(
        &self,
        result: SeparationResult,
        inputs: &SeparationInputs,
    ) -> Vec<StateChange> {
        self.update(|state| {
            let stale = !inputs.matches(state);
            if stale {
                tracing::warn!("Inputs changed during separation; result is stale");
            }
            state.result = Some(result);
            state.result_stale = stale;
        })
    }

    /// Mark a slot as running and reset its progress
    pub fn begin_task(&self, slot: TaskSlot) -> Vec<StateChange> {
        self.update(|state| {
            state.active_tasks.insert(slot);
            state.progress.insert(slot, 0);
        })
    }

    /// Record progress for a running slot
    pub fn update_progress(&self, slot: TaskSlot, percent: u8) -> Vec<StateChange> {
        self.update(|state| {
            state.progress.insert(slot, percent.min(100));
        })
    }

    /// Mark a slot as idle and hide its progress
    pub fn finish_task(&self, slot: TaskSlot) -> Vec<StateChange> {
        self.update(|state| {
            state.active_tasks.remove(&slot);
            state.progress.remove(&slot);
        })
    }

    /// Replace the status line
    pub fn set_status(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.status_message = message;
        })
    }

    /// Remember the destination of the last successful export
    pub fn record_export(&self, destination: Utf8PathBuf) -> Vec<StateChange> {
        self.update(|state| {
            state.last_export = Some(destination);
        })
    }

    /// Drop every container and return to the start-up state
    pub fn reset(&self) -> Vec<StateChange> {
        let mut changes = self.update(AppState::reset);

        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
