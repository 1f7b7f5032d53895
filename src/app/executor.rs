// TaskExecutor - Runs list operations on tokio workers and reports back over one channel
//
// The interactive layer owns the executor and is the only one that starts tasks or
// drains events, so the per-slot "in flight" flags need no synchronization.
// Workers only ever talk back through the event channel.

use crate::metrics::Metrics;
use crate::models::{EmailSet, SeparationInputs, TaskSlot};
use crate::services::{ExportSummary, LoadOutcome, TaskError};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Success payload of a finished task
#[derive(Debug, Clone)]
pub enum TaskOutput {
    MainLoaded(LoadOutcome),
    UnwantedLoaded(LoadOutcome),
    Separated {
        remaining: EmailSet,
        removal_count: usize,
        main_count: usize,
        inputs: SeparationInputs,
    },
    Exported(ExportSummary),
}

/// Progress or completion of one task invocation
#[derive(Debug, Clone)]
pub enum TaskEventKind {
    /// Percentage in `0..=100`, non-decreasing within one invocation
    Progress(u8),
    /// Terminal event, sent exactly once per invocation and after all its progress
    Finished(Result<TaskOutput, TaskError>),
}

#[derive(Debug, Clone)]
pub struct TaskEvent {
    pub slot: TaskSlot,
    pub kind: TaskEventKind,
}

/// Handed to each worker to publish progress for its slot.
///
/// Progress is best effort: when the channel is full the update is dropped
/// instead of stalling the worker. Values never go backwards.
pub struct ProgressReporter {
    slot: TaskSlot,
    tx: mpsc::Sender<TaskEvent>,
    last: Option<u8>,
    metrics: Arc<Metrics>,
}

impl ProgressReporter {
    fn new(slot: TaskSlot, tx: mpsc::Sender<TaskEvent>, metrics: Arc<Metrics>) -> Self {
        Self {
            slot,
            tx,
            last: None,
            metrics,
        }
    }

    /// Publish a percentage; repeated or lower values are ignored.
    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);

        let event = TaskEvent {
            slot: self.slot,
            kind: TaskEventKind::Progress(percent),
        };
        match self.tx.try_send(event) {
            Ok(()) => {
                self.metrics.record_progress_sent();
                tracing::trace!("{} progress: {}%", self.slot, percent);
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_progress_dropped();
                tracing::debug!("Event channel full - dropped {} progress {}%", self.slot, percent);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send {} progress - executor has stopped", self.slot);
            }
        }
    }

    /// Turn the reporter into a plain callback for the services layer.
    pub fn into_callback(mut self) -> impl FnMut(u8) + Send + 'static {
        move |percent| self.report(percent)
    }
}

/// Runs at most one task per [`TaskSlot`] on the tokio runtime.
///
/// Each `start` spawns a dedicated task (one worker per invocation, not a pool).
/// Progress and completion come back as [`TaskEvent`]s on a bounded channel that
/// only the owner drains through [`next_event`](Self::next_event). A slot stays
/// in flight until its `Finished` event has been drained.
pub struct TaskExecutor {
    /// Handle to the tokio runtime for spawning workers
    runtime: Handle,

    event_tx: mpsc::Sender<TaskEvent>,
    event_rx: mpsc::Receiver<TaskEvent>,

    /// Indexed by `TaskSlot::index`
    in_flight: [bool; 4],

    metrics: Arc<Metrics>,
}

impl TaskExecutor {
    /// Create an executor whose event channel holds `capacity` events.
    pub fn new(runtime: Handle, capacity: usize, metrics: Arc<Metrics>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        Self {
            runtime,
            event_tx,
            event_rx,
            in_flight: [false; 4],
            metrics,
        }
    }

    pub fn is_running(&self, slot: TaskSlot) -> bool {
        self.in_flight[slot.index()]
    }

    pub fn is_idle(&self) -> bool {
        !self.in_flight.iter().any(|running| *running)
    }

    /// Start `job` in `slot`.
    ///
    /// Fails with [`TaskError::SlotBusy`] while the slot's previous invocation has
    /// not been drained yet. A panic inside the job is reported as
    /// [`TaskError::WorkerFailed`], so every start ends in exactly one `Finished` event.
    pub fn start<F, Fut>(&mut self, slot: TaskSlot, job: F) -> Result<(), TaskError>
    where
        F: FnOnce(ProgressReporter) -> Fut + Send + 'static,
        Fut: Future<Output = Result<TaskOutput, TaskError>> + Send + 'static,
    {
        if self.is_running(slot) {
            tracing::warn!("Refusing to start {}: already running", slot);
            return Err(TaskError::SlotBusy(slot));
        }
        self.in_flight[slot.index()] = true;
        self.metrics.record_task_started(slot);

        let reporter = ProgressReporter::new(slot, self.event_tx.clone(), Arc::clone(&self.metrics));
        let done_tx = self.event_tx.clone();

        self.runtime.spawn(async move {
            let worker = tokio::spawn(async move { job(reporter).await });
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("{} worker aborted: {}", slot, e);
                    Err(TaskError::WorkerFailed {
                        slot,
                        cause: e.to_string(),
                    })
                }
            };

            let event = TaskEvent {
                slot,
                kind: TaskEventKind::Finished(outcome),
            };
            if done_tx.send(event).await.is_err() {
                tracing::warn!("{} finished after the executor was dropped", slot);
            }
        });

        tracing::debug!("{} started", slot);
        Ok(())
    }

    /// Wait for the next event.
    ///
    /// Returns `None` immediately when no slot is in flight, since no event can arrive then.
    pub async fn next_event(&mut self) -> Option<TaskEvent> {
        if self.is_idle() {
            return None;
        }
        let event = self.event_rx.recv().await?;
        self.observe(&event);
        Some(event)
    }

    fn observe(&mut self, event: &TaskEvent) {
        if let TaskEventKind::Finished(outcome) = &event.kind {
            self.in_flight[event.slot.index()] = false;
            match outcome {
                Ok(_) => self.metrics.record_task_succeeded(),
                Err(_) => self.metrics.record_task_failed(),
            }
        }
    }
}
