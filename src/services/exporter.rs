use crate::models::EmailSet;
use crate::services::error::TaskError;
use crate::services::progress::ProgressCadence;
use camino::{Utf8Path, Utf8PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Summary of a completed export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub count: usize,
    pub bytes: u64,
    pub elapsed: Duration,
    pub destination: Utf8PathBuf,
}

impl ExportSummary {
    pub fn destination_name(&self) -> &str {
        self.destination
            .file_name()
            .unwrap_or(self.destination.as_str())
    }

    /// Status line for the presentation layer
    pub fn summary(&self) -> String {
        format!(
            "Exported {} emails to {} ({}) in {}",
            self.count,
            self.destination_name(),
            format_size(self.bytes),
            format_elapsed(self.elapsed)
        )
    }
}

/// Human-readable byte count (binary units)
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed.as_secs() >= 60 {
        format!("{}m {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

/// Write `emails` to `destination`, sorted byte-wise, one entry per line.
///
/// Progress follows the loader cadence (every `interval` entries and on the last).
/// On failure the destination is left as it is: a partially written file is not
/// rolled back and must be treated as untrustworthy.
pub async fn export_sorted<F>(
    emails: &EmailSet,
    destination: &Utf8Path,
    interval: usize,
    mut on_progress: F,
) -> Result<ExportSummary, TaskError>
where
    F: FnMut(u8),
{
    let started = Instant::now();
    let sorted = emails.sorted();
    tracing::debug!("Exporting {} emails to {}", sorted.len(), destination);

    let file = tokio::fs::File::create(destination)
        .await
        .map_err(|e| TaskError::export(destination, e))?;
    let mut writer = BufWriter::new(file);
    let mut cadence = ProgressCadence::new(sorted.len(), interval);

    for email in &sorted {
        writer
            .write_all(email.as_bytes())
            .await
            .map_err(|e| TaskError::export(destination, e))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| TaskError::export(destination, e))?;
        if let Some(percent) = cadence.advance() {
            on_progress(percent);
        }
    }
    if let Some(percent) = cadence.finish() {
        on_progress(percent);
    }

    writer
        .flush()
        .await
        .map_err(|e| TaskError::export(destination, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| TaskError::export(destination, e))?;

    let bytes = tokio::fs::metadata(destination)
        .await
        .map_err(|e| TaskError::export(destination, e))?
        .len();

    let summary = ExportSummary {
        count: sorted.len(),
        bytes,
        elapsed: started.elapsed(),
        destination: destination.to_path_buf(),
    };
    tracing::info!("{}", summary.summary());

    Ok(summary)
}
