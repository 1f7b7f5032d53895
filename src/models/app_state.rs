use crate::models::{EmailSet, TaskSlot};
use camino::Utf8PathBuf;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Status line shown before any operation has run.
pub const READY_STATUS: &str = "Ready.";

/// A list loaded from a file, together with the file it came from.
///
/// The set is shared behind an `Arc` so snapshots and worker hand-off never
/// copy the entries.
#[derive(Clone, Debug)]
pub struct LoadedList {
    pub emails: Arc<EmailSet>,
    pub source: Utf8PathBuf,
}

impl LoadedList {
    pub fn new(emails: EmailSet, source: Utf8PathBuf) -> Self {
        Self {
            emails: Arc::new(emails),
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// True when both refer to the very same loaded set.
    pub fn same_as(&self, other: &LoadedList) -> bool {
        Arc::ptr_eq(&self.emails, &other.emails) && self.source == other.source
    }
}

/// Output of the most recent completed separation.
#[derive(Clone, Debug)]
pub struct SeparationResult {
    pub emails: Arc<EmailSet>,
    /// Size of the combined unwanted set used for this result
    pub removal_count: usize,
    /// Size of the main set the result was computed from
    pub main_count: usize,
}

impl SeparationResult {
    pub fn same_as(&self, other: &SeparationResult) -> bool {
        Arc::ptr_eq(&self.emails, &other.emails)
    }
}

/// Identity of the inputs a separation was computed from.
///
/// Used when the result arrives to tell whether the main list, the unwanted
/// list or the pasted text changed while the worker was running.
#[derive(Clone, Debug, Default)]
pub struct SeparationInputs {
    pub main: Option<Arc<EmailSet>>,
    pub unwanted: Option<Arc<EmailSet>>,
    pub pasted_text: Arc<str>,
}

impl SeparationInputs {
    /// Capture the inputs currently held by `state`.
    pub fn capture(state: &AppState) -> Self {
        Self {
            main: state.main_emails().cloned(),
            unwanted: state.unwanted_emails().cloned(),
            pasted_text: Arc::clone(&state.pasted_text),
        }
    }

    /// True when `state` still holds exactly these inputs.
    pub fn matches(&self, state: &AppState) -> bool {
        let same = |a: Option<&Arc<EmailSet>>, b: Option<&Arc<EmailSet>>| match (a, b) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same(self.main.as_ref(), state.main_emails())
            && same(self.unwanted.as_ref(), state.unwanted_emails())
            && self.pasted_text == state.pasted_text
    }
}

/// Single source of truth for all application state.
///
/// Holds the four containers (main list, unwanted list, pasted text, result)
/// plus task bookkeeping for display. `AppState` is wrapped in
/// `Arc<RwLock<AppState>>` by [`crate::state::StateManager`]; mutate it only
/// through [`update()`](crate::state::StateManager::update) so change events
/// are emitted.
///
/// # Invariants
///
/// - `result`, when present, is a subset of the main set that was in effect when
///   it was computed and shares no member with the unwanted set used for it.
/// - `result_stale` turns true when the main list, the unwanted list or the pasted
///   text changes after the result was computed. The result is kept, never
///   recomputed implicitly.
#[derive(Clone, Debug)]
pub struct AppState {
    // Inputs
    pub main_list: Option<LoadedList>,
    pub unwanted_list: Option<LoadedList>,
    /// Shared so snapshots and change detection never copy the text
    pub pasted_text: Arc<str>,

    // Output
    pub result: Option<SeparationResult>,
    pub result_stale: bool,
    pub last_export: Option<Utf8PathBuf>,

    // Task bookkeeping
    pub active_tasks: BTreeSet<TaskSlot>,
    pub progress: BTreeMap<TaskSlot, u8>,
    pub status_message: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            main_list: None,
            unwanted_list: None,
            pasted_text: Arc::from(""),

            result: None,
            result_stale: false,
            last_export: None,

            active_tasks: BTreeSet::new(),
            progress: BTreeMap::new(),
            status_message: READY_STATUS.to_string(),
        }
    }
}

impl AppState {
    /// Main set, if one has been loaded
    pub fn main_emails(&self) -> Option<&Arc<EmailSet>> {
        self.main_list.as_ref().map(|list| &list.emails)
    }

    /// Unwanted set loaded from a file, if any
    pub fn unwanted_emails(&self) -> Option<&Arc<EmailSet>> {
        self.unwanted_list.as_ref().map(|list| &list.emails)
    }

    pub fn main_count(&self) -> usize {
        self.main_list.as_ref().map_or(0, LoadedList::len)
    }

    /// Parse the current pasted text. Never cached: the text can change between reads.
    pub fn pasted_emails(&self) -> EmailSet {
        EmailSet::parse(&self.pasted_text)
    }

    /// True when a non-empty result exists
    pub fn has_result(&self) -> bool {
        self.result.as_ref().is_some_and(|result| !result.emails.is_empty())
    }

    pub fn is_busy(&self, slot: TaskSlot) -> bool {
        self.active_tasks.contains(&slot)
    }

    /// Mark the current result as out of date, if there is one.
    pub fn invalidate_result(&mut self) {
        if self.result.is_some() {
            self.result_stale = true;
        }
    }

    /// Drop every container and return to the start-up state.
    pub fn reset(&mut self) {
        *self = AppState::default();
    }
}
