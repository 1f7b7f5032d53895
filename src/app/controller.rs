// Separator Controller - The orchestrating layer between a front end and the workers
//
// This module contains the SeparatorController which coordinates between:
// - StateManager (application state)
// - TaskExecutor (one worker per operation, progress/finished events)
// - The services layer (loader, set operations, exporter)
//
// It handles:
// - Validating and starting operations (load main, load unwanted, separate, export)
// - Composing the combined unwanted set from the pasted text and the loaded file
// - Applying completion events to state (the only place list state is written)
// - Translating events into presentation notifications and status messages

use crate::app::executor::{TaskEvent, TaskEventKind, TaskExecutor, TaskOutput};
use crate::metrics::Metrics;
use crate::models::{
    EmailSet, LoadedList, SeparationInputs, SeparationResult, SeparatorSettings, TaskSlot,
};
use crate::services::{self, Preview, TaskError};
use crate::state::StateManager;
use camino::Utf8PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;

/// What the presentation layer needs to render after each event
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Move the slot's progress indicator
    Progress { slot: TaskSlot, percent: u8 },
    /// The slot finished; re-enable its control and show the summary
    Completed { slot: TaskSlot, message: String },
    /// The slot failed; re-enable its control and show the cause
    Failed { slot: TaskSlot, error: TaskError },
}

impl Notification {
    pub fn slot(&self) -> TaskSlot {
        match self {
            Notification::Progress { slot, .. }
            | Notification::Completed { slot, .. }
            | Notification::Failed { slot, .. } => *slot,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Progress { .. })
    }
}

/// Orchestrates list operations on behalf of a single interactive thread.
///
/// All `&mut self` methods are meant to be called from that one thread: it starts
/// operations, drains events and is therefore the only writer of list state.
/// Operations in different slots run concurrently; a second start of a running
/// slot is refused with [`TaskError::SlotBusy`].
///
/// # Example
/// ```ignore
/// let mut controller = SeparatorController::new(state, settings, runtime.handle().clone(), metrics);
/// controller.load_main_list("main.txt")?;
/// controller.load_unwanted_list("unsubscribed.txt")?;
/// controller.run_until_idle(|n| println!("{n:?}")).await;
///
/// controller.set_pasted_text("bounce@example.com\n");
/// controller.separate()?;
/// controller.run_until_idle(|_| {}).await;
/// controller.export_result("clean.txt")?;
/// ```
pub struct SeparatorController {
    state: Arc<StateManager>,
    executor: TaskExecutor,
    settings: SeparatorSettings,
    metrics: Arc<Metrics>,
}

impl SeparatorController {
    pub fn new(
        state: Arc<StateManager>,
        settings: SeparatorSettings,
        runtime: Handle,
        metrics: Arc<Metrics>,
    ) -> Self {
        let executor = TaskExecutor::new(
            runtime,
            settings.effective_event_capacity(),
            Arc::clone(&metrics),
        );
        tracing::info!(
            "Separator controller initialized (progress interval {}, event capacity {})",
            settings.effective_progress_interval(),
            settings.effective_event_capacity()
        );
        Self {
            state,
            executor,
            settings,
            metrics,
        }
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn settings(&self) -> &SeparatorSettings {
        &self.settings
    }

    pub fn is_busy(&self, slot: TaskSlot) -> bool {
        self.executor.is_running(slot)
    }

    pub fn is_idle(&self) -> bool {
        self.executor.is_idle()
    }

    /// Start loading the main list from `path`.
    pub fn load_main_list(&mut self, path: impl Into<Utf8PathBuf>) -> Result<(), TaskError> {
        self.start_load(TaskSlot::LoadMain, path.into())
    }

    /// Start loading the unwanted list from `path`.
    pub fn load_unwanted_list(&mut self, path: impl Into<Utf8PathBuf>) -> Result<(), TaskError> {
        self.start_load(TaskSlot::LoadUnwanted, path.into())
    }

    fn start_load(&mut self, slot: TaskSlot, path: Utf8PathBuf) -> Result<(), TaskError> {
        let interval = self.settings.effective_progress_interval();
        tracing::info!("{} requested: {}", slot, path);

        self.executor.start(slot, move |reporter| async move {
            let outcome = services::load_set(&path, interval, reporter.into_callback()).await?;
            Ok(match slot {
                TaskSlot::LoadMain => TaskOutput::MainLoaded(outcome),
                _ => TaskOutput::UnwantedLoaded(outcome),
            })
        })?;

        self.state.begin_task(slot);
        Ok(())
    }

    /// Replace the pasted text (the free-form "emails to remove" input).
    pub fn set_pasted_text(&self, text: impl Into<String>) {
        self.state.set_pasted_text(text);
    }

    /// Union of the parsed pasted text and the loaded unwanted list, as of now.
    ///
    /// Recomputed on every call; the pasted text may have changed since the last one.
    pub fn combined_unwanted(&self) -> EmailSet {
        let (pasted_text, unwanted) = self
            .state
            .read(|s| (s.pasted_text.clone(), s.unwanted_emails().cloned()));
        services::combine(&pasted_text, unwanted.as_deref())
    }

    /// Which unwanted entries are in the main list and which are not.
    ///
    /// Synchronous and read-only. The answer reflects the main list loaded right
    /// now; reloading it before separating makes this preview stale.
    pub fn preview(&self) -> Preview {
        let main = self.state.read(|s| s.main_emails().cloned());
        let unwanted = self.combined_unwanted();
        let preview = services::preview(main.as_deref(), &unwanted);
        tracing::debug!(
            "Preview: {} to remove, {} not found, main list {}",
            preview.to_remove.len(),
            preview.not_found.len(),
            preview.main_list_size
        );
        preview
    }

    /// Start subtracting the combined unwanted set from the main list.
    ///
    /// Validation happens here, before any worker is spawned:
    /// [`TaskError::EmptyMainList`] without a (non-empty) main list,
    /// [`TaskError::EmptyRemovalSet`] when neither the pasted text nor the
    /// unwanted file contributes an entry.
    pub fn separate(&mut self) -> Result<(), TaskError> {
        if self.executor.is_running(TaskSlot::Separate) {
            return Err(TaskError::SlotBusy(TaskSlot::Separate));
        }

        let inputs = self.state.read(SeparationInputs::capture);
        let main = match &inputs.main {
            Some(main) if !main.is_empty() => Arc::clone(main),
            _ => {
                tracing::warn!("Separation refused: no main list loaded");
                return Err(TaskError::EmptyMainList);
            }
        };

        let unwanted = services::combine(&inputs.pasted_text, inputs.unwanted.as_deref());
        if unwanted.is_empty() {
            tracing::warn!("Separation refused: nothing to remove");
            return Err(TaskError::EmptyRemovalSet);
        }

        let removal_count = unwanted.len();
        tracing::info!(
            "Separate requested: {} main, {} to remove",
            main.len(),
            removal_count
        );

        self.executor.start(TaskSlot::Separate, move |mut reporter| async move {
            let main_count = main.len();
            let remaining =
                tokio::task::spawn_blocking(move || services::separate(&main, &unwanted))
                    .await
                    .map_err(|e| TaskError::WorkerFailed {
                        slot: TaskSlot::Separate,
                        cause: e.to_string(),
                    })?;
            reporter.report(100);
            Ok(TaskOutput::Separated {
                remaining,
                removal_count,
                main_count,
                inputs,
            })
        })?;

        self.state.begin_task(TaskSlot::Separate);
        Ok(())
    }

    /// Start writing the current result to `destination`, sorted.
    ///
    /// Refused with [`TaskError::NoResult`] when no separation has produced a
    /// non-empty result. A stale result is exported as is, with a warning.
    pub fn export_result(&mut self, destination: impl Into<Utf8PathBuf>) -> Result<(), TaskError> {
        if self.executor.is_running(TaskSlot::Export) {
            return Err(TaskError::SlotBusy(TaskSlot::Export));
        }

        let destination = destination.into();
        let (result, stale) = self.state.read(|s| {
            (
                s.result.as_ref().map(|r| Arc::clone(&r.emails)),
                s.result_stale,
            )
        });
        let Some(result) = result.filter(|emails| !emails.is_empty()) else {
            tracing::warn!("Export refused: no result");
            return Err(TaskError::NoResult);
        };
        if stale {
            tracing::warn!("Exporting a result computed from inputs that have since changed");
        }

        let interval = self.settings.effective_progress_interval();
        tracing::info!("Export requested: {} emails to {}", result.len(), destination);

        self.executor.start(TaskSlot::Export, move |mut reporter| async move {
            let summary =
                services::export_sorted(&result, &destination, interval, |p| reporter.report(p))
                    .await?;
            Ok(TaskOutput::Exported(summary))
        })?;

        self.state.begin_task(TaskSlot::Export);
        Ok(())
    }

    /// Wait for the next task event, apply it to state and describe it.
    ///
    /// Returns `None` when nothing is running.
    pub async fn next_notification(&mut self) -> Option<Notification> {
        let event = self.executor.next_event().await?;
        Some(self.apply_event(event))
    }

    /// Drain events until every slot is idle.
    ///
    /// `on_notification` sees every notification in arrival order; the terminal
    /// ones are also returned.
    pub async fn run_until_idle<F>(&mut self, mut on_notification: F) -> Vec<Notification>
    where
        F: FnMut(&Notification),
    {
        let mut terminal = Vec::new();
        while let Some(notification) = self.next_notification().await {
            on_notification(&notification);
            if notification.is_terminal() {
                terminal.push(notification);
            }
        }
        terminal
    }

    fn apply_event(&mut self, event: TaskEvent) -> Notification {
        let slot = event.slot;
        match event.kind {
            TaskEventKind::Progress(percent) => {
                self.state.update_progress(slot, percent);
                Notification::Progress { slot, percent }
            }
            TaskEventKind::Finished(Ok(output)) => {
                let message = self.apply_output(output);
                tracing::info!("{} completed: {}", slot, message);
                self.state.finish_task(slot);
                self.state.set_status(message.clone());
                Notification::Completed { slot, message }
            }
            TaskEventKind::Finished(Err(error)) => {
                tracing::error!("{} failed: {}", slot, error);
                self.state.finish_task(slot);
                self.state.set_status(error.to_string());
                Notification::Failed { slot, error }
            }
        }
    }

    /// Commit a successful output to state and return its summary text.
    fn apply_output(&self, output: TaskOutput) -> String {
        match output {
            TaskOutput::MainLoaded(outcome) => {
                let message = format!(
                    "Loaded {} emails from {}",
                    outcome.count(),
                    outcome.source_name()
                );
                self.metrics.record_emails_loaded(outcome.count());
                self.state
                    .set_main_list(LoadedList::new(outcome.emails, outcome.source));
                message
            }
            TaskOutput::UnwantedLoaded(outcome) => {
                let message = format!(
                    "Loaded {} unwanted emails from {}",
                    outcome.count(),
                    outcome.source_name()
                );
                self.metrics.record_emails_loaded(outcome.count());
                self.state
                    .set_unwanted_list(LoadedList::new(outcome.emails, outcome.source));
                message
            }
            TaskOutput::Separated {
                remaining,
                removal_count,
                main_count,
                inputs,
            } => {
                let message = format!(
                    "Separated {} emails. {} remain.",
                    removal_count,
                    remaining.len()
                );
                let result = SeparationResult {
                    emails: Arc::new(remaining),
                    removal_count,
                    main_count,
                };
                self.state.set_result(result, &inputs);
                message
            }
            TaskOutput::Exported(summary) => {
                self.metrics.record_emails_exported(summary.count);
                self.state.record_export(summary.destination.clone());
                summary.summary()
            }
        }
    }
}
