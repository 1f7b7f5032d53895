//! Integration tests for SeparatorController driving real workers
//!
//! These tests verify the end-to-end behaviour of the four operations:
//! - Loads run concurrently and publish their sets only on success
//! - Separation and preview over the file list combined with the pasted text
//! - Validation errors are raised before anything is spawned
//! - Export writes the sorted result and reports a summary
//! - Each invocation ends in exactly one terminal notification after its progress

use camino::Utf8PathBuf;
use email_separator::models::READY_STATUS;
use email_separator::{
    Metrics, Notification, SeparatorController, SeparatorSettings, StateManager, TaskError,
    TaskSlot,
};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use tokio::runtime::Handle;

struct Fixture {
    controller: SeparatorController,
    metrics: Arc<Metrics>,
    temp_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self::with_settings(SeparatorSettings::default())
    }

    fn with_settings(settings: SeparatorSettings) -> Self {
        let metrics = Arc::new(Metrics::new());
        let controller = SeparatorController::new(
            Arc::new(StateManager::new()),
            settings,
            Handle::current(),
            Arc::clone(&metrics),
        );
        Self {
            controller,
            metrics,
            temp_dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::try_from(self.temp_dir.path().join(name)).unwrap()
    }

    fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    async fn load_main(&mut self, contents: &str) {
        let path = self.write("main.txt", contents);
        self.controller.load_main_list(path).unwrap();
        let terminal = self.controller.run_until_idle(|_| {}).await;
        assert!(matches!(terminal.as_slice(), [Notification::Completed { .. }]));
    }

    async fn load_unwanted(&mut self, contents: &str) {
        let path = self.write("unwanted.txt", contents);
        self.controller.load_unwanted_list(path).unwrap();
        let terminal = self.controller.run_until_idle(|_| {}).await;
        assert!(matches!(terminal.as_slice(), [Notification::Completed { .. }]));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_separate_with_file_and_pasted_text() {
    let mut fixture = Fixture::new();
    fixture.load_main("a@x.com\nb@x.com\nc@x.com\n").await;
    fixture.load_unwanted("b@x.com\n").await;
    fixture.controller.set_pasted_text("c@x.com\n");

    let preview = fixture.controller.preview();
    assert_eq!(preview.to_remove.sorted(), vec!["b@x.com", "c@x.com"]);
    assert!(preview.not_found.is_empty());
    assert_eq!(preview.main_list_size, 3);

    fixture.controller.separate().unwrap();
    let terminal = fixture.controller.run_until_idle(|_| {}).await;

    assert_eq!(
        terminal,
        vec![Notification::Completed {
            slot: TaskSlot::Separate,
            message: "Separated 2 emails. 1 remain.".to_string(),
        }]
    );
    let state = fixture.controller.state().snapshot();
    let result = state.result.unwrap();
    assert_eq!(result.emails.sorted(), vec!["a@x.com"]);
    assert_eq!(result.removal_count, 2);
    assert!(!state.result_stale);
    assert_eq!(state.status_message, "Separated 2 emails. 1 remain.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_main_list() {
    let mut fixture = Fixture::new();
    fixture.load_unwanted("z@x.com\n").await;

    assert_eq!(fixture.controller.separate(), Err(TaskError::EmptyMainList));
    assert!(fixture.controller.is_idle());

    let preview = fixture.controller.preview();
    assert!(preview.to_remove.is_empty());
    assert_eq!(preview.not_found.sorted(), vec!["z@x.com"]);
    assert_eq!(preview.main_list_size, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_removal_set() {
    let mut fixture = Fixture::new();
    fixture.load_main("a@x.com\n").await;
    fixture.controller.set_pasted_text("\n   \n");

    assert_eq!(fixture.controller.separate(), Err(TaskError::EmptyRemovalSet));
    assert!(!fixture.controller.is_busy(TaskSlot::Separate));
    assert_eq!(fixture.metrics.tasks_started(TaskSlot::Separate), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_main_file_counts_as_missing() {
    let mut fixture = Fixture::new();
    fixture.load_main("\n\n").await;
    fixture.controller.set_pasted_text("a@x.com");

    assert_eq!(fixture.controller.separate(), Err(TaskError::EmptyMainList));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_loads_run_concurrently_in_separate_slots() {
    let mut fixture = Fixture::new();
    let main: String = (0..5000).map(|i| format!("user{i}@x.com\n")).collect();
    let main_path = fixture.write("main.txt", &main);
    let unwanted_path = fixture.write("unwanted.txt", "user1@x.com\nuser2@x.com\n");

    fixture.controller.load_main_list(main_path.clone()).unwrap();
    fixture.controller.load_unwanted_list(unwanted_path).unwrap();
    assert_eq!(
        fixture.controller.load_main_list(main_path),
        Err(TaskError::SlotBusy(TaskSlot::LoadMain))
    );

    let mut seen: HashMap<TaskSlot, Vec<Notification>> = HashMap::new();
    fixture
        .controller
        .run_until_idle(|n| seen.entry(n.slot()).or_default().push(n.clone()))
        .await;

    for slot in [TaskSlot::LoadMain, TaskSlot::LoadUnwanted] {
        let notifications = &seen[&slot];
        let (last, progress) = notifications.split_last().unwrap();
        assert!(last.is_terminal(), "{slot} must end with its completion");
        assert!(progress.iter().all(|n| !n.is_terminal()));

        let percents: Vec<u8> = progress
            .iter()
            .map(|n| match n {
                Notification::Progress { percent, .. } => *percent,
                _ => unreachable!(),
            })
            .collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    let state = fixture.controller.state().snapshot();
    assert_eq!(state.main_count(), 5000);
    assert_eq!(state.unwanted_list.unwrap().len(), 2);
    assert!(state.active_tasks.is_empty());
    assert_eq!(fixture.metrics.tasks_succeeded.load(Ordering::Relaxed), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_load_publishes_nothing() {
    let mut fixture = Fixture::new();
    let bad = fixture.path("bad.txt");
    fs::write(&bad, [b'a', b'@', 0xff, 0xfe, b'\n']).unwrap();

    fixture.controller.load_main_list(bad.clone()).unwrap();
    let terminal = fixture.controller.run_until_idle(|_| {}).await;

    match terminal.as_slice() {
        [Notification::Failed { slot, error }] => {
            assert_eq!(*slot, TaskSlot::LoadMain);
            assert!(matches!(error, TaskError::LoadFailure { path, .. } if *path == bad));
        }
        other => panic!("expected one failure, got {other:?}"),
    }

    let state = fixture.controller.state().snapshot();
    assert!(state.main_list.is_none());
    assert!(state.status_message.starts_with("Failed to load"));
    assert!(!fixture.controller.is_busy(TaskSlot::LoadMain));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_export_writes_sorted_result() {
    let mut fixture = Fixture::new();
    fixture
        .load_main("d@x.com\nb@x.com\na@x.com\nc@x.com\n")
        .await;
    fixture.controller.set_pasted_text("c@x.com");
    fixture.controller.separate().unwrap();
    fixture.controller.run_until_idle(|_| {}).await;

    let destination = fixture.path("clean.txt");
    fixture.controller.export_result(destination.clone()).unwrap();
    let terminal = fixture.controller.run_until_idle(|_| {}).await;

    let [Notification::Completed { slot, message }] = terminal.as_slice() else {
        panic!("expected export completion, got {terminal:?}");
    };
    assert_eq!(*slot, TaskSlot::Export);
    assert!(
        message.starts_with("Exported 3 emails to clean.txt (24 B) in "),
        "unexpected summary: {message}"
    );

    assert_eq!(
        fs::read_to_string(&destination).unwrap(),
        "a@x.com\nb@x.com\nd@x.com\n"
    );
    let state = fixture.controller.state().snapshot();
    assert_eq!(state.last_export, Some(destination));
    assert_eq!(fixture.metrics.emails_exported.load(Ordering::Relaxed), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_export_refused_for_empty_result() {
    let mut fixture = Fixture::new();
    fixture.load_main("a@x.com\n").await;
    fixture.controller.set_pasted_text("a@x.com");
    fixture.controller.separate().unwrap();
    fixture.controller.run_until_idle(|_| {}).await;

    let destination = fixture.path("clean.txt");
    assert_eq!(
        fixture.controller.export_result(destination.clone()),
        Err(TaskError::NoResult)
    );
    assert!(!destination.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stale_result_still_exports() {
    let mut fixture = Fixture::new();
    fixture.load_main("a@x.com\nb@x.com\n").await;
    fixture.controller.set_pasted_text("b@x.com");
    fixture.controller.separate().unwrap();
    fixture.controller.run_until_idle(|_| {}).await;

    // Reloading the main list keeps the old result, marked stale
    fixture.load_main("x@x.com\n").await;
    assert!(fixture.controller.state().read(|s| s.result_stale));

    let destination = fixture.path("clean.txt");
    fixture.controller.export_result(destination.clone()).unwrap();
    fixture.controller.run_until_idle(|_| {}).await;

    assert_eq!(fs::read_to_string(&destination).unwrap(), "a@x.com\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_small_progress_interval() {
    let settings = SeparatorSettings {
        progress_interval: 1,
        ..SeparatorSettings::default()
    };
    let mut fixture = Fixture::with_settings(settings);
    let path = fixture.write("main.txt", "a@x.com\nb@x.com\nc@x.com\nd@x.com\n");

    fixture.controller.load_main_list(path).unwrap();
    let mut percents = Vec::new();
    fixture
        .controller
        .run_until_idle(|n| {
            if let Notification::Progress { percent, .. } = n {
                percents.push(*percent);
            }
        })
        .await;

    // Default capacity holds every update, so none are dropped
    assert_eq!(percents, vec![25, 50, 75, 100]);
    assert_eq!(fixture.metrics.progress_dropped.load(Ordering::Relaxed), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_after_session() {
    let mut fixture = Fixture::new();
    fixture.load_main("a@x.com\n").await;

    fixture.controller.state().reset();

    let state = fixture.controller.state().snapshot();
    assert!(state.main_list.is_none());
    assert_eq!(state.status_message, READY_STATUS);
    assert_eq!(fixture.controller.separate(), Err(TaskError::EmptyMainList));
}
