//! Email Separator - Remove unwanted addresses from a mailing list
//!
//! Main entry point for the command-line application.
//!
//! # Overview
//!
//! This binary drives the library's [`SeparatorController`] from the command line. It initializes:
//! - Configuration loading ([`ConfigManager`], `Separator Settings.yaml`)
//! - Logging infrastructure (daily log file + warnings on stderr)
//! - Tokio async runtime (workers for file I/O and set operations)
//! - State management ([`StateManager`])
//! - Progress rendering ([`ProgressDisplay`], one bar per operation)
//!
//! # Execution Flow
//!
//! 1. Parse arguments, read `--paste` input (file or stdin)
//! 2. Load settings from `<config-dir>/Separator Settings.yaml`
//! 3. Initialize logging → `<config-dir>/<Log Directory>/email-separator.<date>`
//! 4. Load the main and unwanted lists concurrently (either may be absent)
//! 5. Optionally print the preview; without `--main` the run ends here
//! 6. Separate, then export when `--output` is given
//! 7. Log metrics and shut down the runtime with a 5s timeout

use anyhow::{Context, Result};
use clap::Parser;
use email_separator::cli::{Cli, ProgressDisplay, read_pasted, render_preview};
use email_separator::logging::{LoggingOptions, setup_logging};
use email_separator::{
    APP_NAME, ConfigManager, Metrics, Notification, SeparatorController, StateManager, TaskSlot,
    VERSION,
};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Read stdin before anything draws to the terminal
    let pasted = cli.paste.as_deref().map(read_pasted).transpose()?;

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let settings = config_manager.load_user_config()?.separator_settings;

    let log_dir = config_manager.config_dir().join(&settings.log_directory);
    let _log_guard = setup_logging(&LoggingOptions {
        log_dir: &log_dir,
        log_prefix: APP_NAME,
        debug_mode: settings.debug_mode || cli.debug,
        console_output: true,
    })?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!("Using settings from {}", config_manager.user_config_path());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("separator-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let state = Arc::new(StateManager::new());
    let metrics = Arc::new(Metrics::new());
    let mut controller = SeparatorController::new(
        Arc::clone(&state),
        settings,
        runtime.handle().clone(),
        Arc::clone(&metrics),
    );
    let mut display = ProgressDisplay::new();

    let result = runtime.block_on(run(&cli, pasted, &mut controller, &mut display));

    match &result {
        Ok(()) => tracing::info!("Finished: {}", state.read(|s| s.status_message.clone())),
        Err(e) => tracing::error!("Stopped: {:#}", e),
    }
    metrics.log_summary();

    drop(controller);
    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Shutdown complete");

    result
}

async fn run(
    cli: &Cli,
    pasted: Option<String>,
    controller: &mut SeparatorController,
    display: &mut ProgressDisplay,
) -> Result<()> {
    // Both loads run at the same time in their own slots
    if let Some(main) = &cli.main {
        controller.load_main_list(main.clone())?;
        display.begin(TaskSlot::LoadMain);
    }
    if let Some(unwanted) = &cli.unwanted {
        controller.load_unwanted_list(unwanted.clone())?;
        display.begin(TaskSlot::LoadUnwanted);
    }
    drain(controller, display).await?;

    if let Some(text) = pasted {
        controller.set_pasted_text(text);
    }

    if cli.preview {
        let preview = controller.preview();
        display.println(render_preview(&preview, controller.settings().preview_limit));
    }

    // Preview-only run
    if cli.main.is_none() {
        return Ok(());
    }

    controller.separate()?;
    display.begin(TaskSlot::Separate);
    drain(controller, display).await?;

    if let Some(output) = &cli.output {
        controller.export_result(output.clone())?;
        display.begin(TaskSlot::Export);
        drain(controller, display).await?;
    }

    Ok(())
}

/// Render events until every slot is idle; the first failure becomes the error.
async fn drain(controller: &mut SeparatorController, display: &ProgressDisplay) -> Result<()> {
    let terminal = controller.run_until_idle(|n| display.handle(n)).await;
    for notification in terminal {
        if let Notification::Failed { error, .. } = notification {
            return Err(error.into());
        }
    }
    Ok(())
}
