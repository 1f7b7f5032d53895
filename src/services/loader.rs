use crate::models::{EmailSet, LineBreaks, split_lines};
use crate::services::error::TaskError;
use crate::services::progress::ProgressCadence;
use camino::{Utf8Path, Utf8PathBuf};
use std::time::{Duration, Instant};

/// Result of loading one list file
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub emails: EmailSet,
    pub source: Utf8PathBuf,
    /// Physical lines read, blank lines and duplicates included
    pub total_lines: usize,
    pub elapsed: Duration,
}

impl LoadOutcome {
    /// Number of distinct non-blank entries
    pub fn count(&self) -> usize {
        self.emails.len()
    }

    /// File name used in status messages
    pub fn source_name(&self) -> &str {
        self.source.file_name().unwrap_or(self.source.as_str())
    }
}

/// Parse text line by line, reporting progress at the given cadence.
///
/// `\n`, `\r\n` and a bare `\r` all end a line. Each physical line is trimmed,
/// blank lines are dropped and duplicates collapse. Progress is
/// `processed_lines / total_lines`.
pub fn parse_with_progress<F>(text: &str, interval: usize, mut on_progress: F) -> EmailSet
where
    F: FnMut(u8),
{
    let total = split_lines(text, LineBreaks::File).count();
    let mut cadence = ProgressCadence::new(total, interval);
    let mut emails = EmailSet::with_capacity(total);

    for line in split_lines(text, LineBreaks::File) {
        emails.insert(line);
        if let Some(percent) = cadence.advance() {
            on_progress(percent);
        }
    }
    if let Some(percent) = cadence.finish() {
        on_progress(percent);
    }

    emails
}

/// Load a UTF-8, line-delimited list file into an [`EmailSet`].
///
/// The file is read with tokio, then parsed on a blocking worker thread so the
/// runtime stays free for other slots. Any I/O or decoding error terminates the
/// load with [`TaskError::LoadFailure`]; no partial set is returned.
pub async fn load_set<F>(
    path: &Utf8Path,
    interval: usize,
    on_progress: F,
) -> Result<LoadOutcome, TaskError>
where
    F: FnMut(u8) + Send + 'static,
{
    let started = Instant::now();
    tracing::debug!("Reading list file: {}", path);

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| TaskError::load(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| TaskError::load(path, e))?;

    let (emails, total_lines) = tokio::task::spawn_blocking(move || {
        // A leading byte order mark is an encoding artefact, not part of the first address
        let body = text.strip_prefix('\u{feff}').unwrap_or(&text);
        let total_lines = split_lines(body, LineBreaks::File).count();
        (parse_with_progress(body, interval, on_progress), total_lines)
    })
    .await
    .map_err(|e| TaskError::load(path, format!("parser stopped: {e}")))?;

    let outcome = LoadOutcome {
        emails,
        source: path.to_path_buf(),
        total_lines,
        elapsed: started.elapsed(),
    };

    tracing::info!(
        "Loaded {} distinct emails from {} lines in {:?} ({})",
        outcome.count(),
        outcome.total_lines,
        outcome.elapsed,
        path
    );

    Ok(outcome)
}
