use serde::{Deserialize, Serialize};

/// User configuration from Separator Settings.yaml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Separator_Settings", default)]
    pub separator_settings: SeparatorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatorSettings {
    /// Lines (or entries) between two progress notifications
    #[serde(rename = "Progress Interval", default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Number of entries shown per preview list before truncation
    #[serde(rename = "Preview Limit", default = "default_preview_limit")]
    pub preview_limit: usize,

    /// Bound of the task event channel
    #[serde(rename = "Event Capacity", default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Log Directory", default = "default_log_directory")]
    pub log_directory: String,
}

impl Default for SeparatorSettings {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            preview_limit: default_preview_limit(),
            event_capacity: default_event_capacity(),
            debug_mode: false,
            log_directory: default_log_directory(),
        }
    }
}

impl SeparatorSettings {
    /// Progress cadence, never zero
    pub fn effective_progress_interval(&self) -> usize {
        self.progress_interval.max(1)
    }

    /// Channel bound, never zero (tokio rejects an empty bound)
    pub fn effective_event_capacity(&self) -> usize {
        self.event_capacity.max(1)
    }
}

fn default_progress_interval() -> usize {
    1000
}

fn default_preview_limit() -> usize {
    100
}

fn default_event_capacity() -> usize {
    256
}

fn default_log_directory() -> String {
    "logs".to_string()
}
