//! Command-line front end: argument definitions and terminal rendering.
//!
//! The binary drives [`SeparatorController`](crate::SeparatorController) with these
//! arguments and feeds every [`Notification`] to a [`ProgressDisplay`].

use crate::app::Notification;
use crate::models::TaskSlot;
use crate::services::{Preview, TruncatedList};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Read;

/// Value of `--paste` that reads the pasted text from standard input
pub const STDIN_MARKER: &str = "-";

const BAR_TEMPLATE: &str = "{prefix:>16.bold} [{bar:40.cyan/blue}] {pos:>3}% {msg}";

#[derive(Parser, Debug)]
#[command(
    name = "email-separator",
    version,
    about = "Remove unwanted addresses from a mailing list",
    long_about = "Load a main email list, subtract the addresses listed in an unwanted file \
                  and/or pasted text, and export what remains sorted, one address per line."
)]
pub struct Cli {
    /// Main email list, one address per line. Only optional with --preview.
    #[arg(long = "main", value_name = "FILE", required_unless_present = "preview")]
    pub main: Option<Utf8PathBuf>,

    /// Unwanted email list, one address per line.
    #[arg(long = "unwanted", value_name = "FILE")]
    pub unwanted: Option<Utf8PathBuf>,

    /// Extra addresses to remove, read from a file or from stdin with "-".
    #[arg(long = "paste", value_name = "FILE|-")]
    pub paste: Option<String>,

    /// Write the remaining addresses here, sorted.
    #[arg(long = "output", value_name = "FILE", requires = "main")]
    pub output: Option<Utf8PathBuf>,

    /// Print which addresses would be removed and which are not in the main list.
    #[arg(long = "preview")]
    pub preview: bool,

    /// Directory holding "Separator Settings.yaml".
    #[arg(long = "config-dir", value_name = "DIR", default_value = ".")]
    pub config_dir: Utf8PathBuf,

    /// Log at debug level regardless of the settings file.
    #[arg(long = "debug")]
    pub debug: bool,
}

/// Read the `--paste` source: a file path, or stdin for [`STDIN_MARKER`].
pub fn read_pasted(source: &str) -> Result<String> {
    if source == STDIN_MARKER {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read pasted emails from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read pasted emails from {}", source))
}

/// One progress bar per running slot.
pub struct ProgressDisplay {
    multi: MultiProgress,
    bars: BTreeMap<TaskSlot, ProgressBar>,
    style: ProgressStyle,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        Self {
            multi: MultiProgress::new(),
            bars: BTreeMap::new(),
            style,
        }
    }

    /// Show a fresh bar for `slot`, replacing a finished one.
    pub fn begin(&mut self, slot: TaskSlot) {
        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_style(self.style.clone());
        bar.set_prefix(slot.label());
        if let Some(old) = self.bars.insert(slot, bar) {
            self.multi.remove(&old);
        }
    }

    pub fn handle(&self, notification: &Notification) {
        let Some(bar) = self.bars.get(&notification.slot()) else {
            return;
        };
        match notification {
            Notification::Progress { percent, .. } => bar.set_position(u64::from(*percent)),
            Notification::Completed { message, .. } => {
                bar.set_position(100);
                bar.finish_with_message(message.clone());
            }
            Notification::Failed { error, .. } => bar.abandon_with_message(error.to_string()),
        }
    }

    /// Print a line without tearing the bars.
    pub fn println(&self, line: impl AsRef<str>) {
        if self.multi.println(line.as_ref()).is_err() {
            println!("{}", line.as_ref());
        }
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the preview as plain text, each list truncated to `limit` entries.
pub fn render_preview(preview: &Preview, limit: usize) -> String {
    let (to_remove, not_found) = preview.truncated(limit);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} of the addresses to remove are in the main list ({} entries):",
        preview.to_remove.len(),
        preview.main_list_size
    );
    push_list(&mut out, &to_remove);

    let _ = writeln!(
        out,
        "{} of the addresses to remove are not in the main list:",
        preview.not_found.len()
    );
    push_list(&mut out, &not_found);

    out
}

fn push_list(out: &mut String, list: &TruncatedList) {
    for email in &list.shown {
        let _ = writeln!(out, "  {}", email);
    }
    if list.remaining > 0 {
        let _ = writeln!(out, "  ... and {} more", list.remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailSet;
    use crate::services;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "email-separator",
            "--main",
            "main.txt",
            "--unwanted",
            "bounces.txt",
            "--paste",
            "-",
            "--output",
            "clean.txt",
            "--preview",
        ])
        .unwrap();

        assert_eq!(cli.main, Some(Utf8PathBuf::from("main.txt")));
        assert_eq!(cli.unwanted, Some(Utf8PathBuf::from("bounces.txt")));
        assert_eq!(cli.paste.as_deref(), Some(STDIN_MARKER));
        assert_eq!(cli.output, Some(Utf8PathBuf::from("clean.txt")));
        assert!(cli.preview);
        assert!(!cli.debug);
        assert_eq!(cli.config_dir, ".");
    }

    #[test]
    fn test_main_is_required_without_preview() {
        assert!(Cli::try_parse_from(["email-separator"]).is_err());
        assert!(Cli::try_parse_from(["email-separator", "--unwanted", "bounces.txt"]).is_err());
    }

    #[test]
    fn test_preview_alone_needs_no_main_list() {
        let cli = Cli::try_parse_from([
            "email-separator",
            "--unwanted",
            "bounces.txt",
            "--preview",
        ])
        .unwrap();

        assert!(cli.main.is_none());
        assert!(cli.preview);
        assert_eq!(cli.unwanted, Some(Utf8PathBuf::from("bounces.txt")));
    }

    #[test]
    fn test_output_requires_main_list() {
        let parsed = Cli::try_parse_from([
            "email-separator",
            "--preview",
            "--output",
            "clean.txt",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_render_preview_truncates() {
        let main = EmailSet::parse("a@x.com\nb@x.com\nc@x.com\n");
        let unwanted = EmailSet::parse("a@x.com\nb@x.com\nc@x.com\nz@x.com\n");
        let preview = services::preview(Some(&main), &unwanted);

        let text = render_preview(&preview, 2);

        assert_eq!(
            text,
            "3 of the addresses to remove are in the main list (3 entries):\n\
             \x20 a@x.com\n\
             \x20 b@x.com\n\
             \x20 ... and 1 more\n\
             1 of the addresses to remove are not in the main list:\n\
             \x20 z@x.com\n"
        );
    }

    #[test]
    fn test_display_ignores_unknown_slot() {
        let display = ProgressDisplay::new();
        display.handle(&Notification::Progress {
            slot: TaskSlot::Export,
            percent: 50,
        });
    }
}
