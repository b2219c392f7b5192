use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::fade::FadeTiming;
use crate::error::SinkError;
use crate::sinks::settings_file::read_document;

/// Settings section the rotation options are read from.
pub const SETTINGS_SECTION: &str = "hueCycle";

pub const DEFAULT_DURATION_MS: u64 = 1500;
pub const DEFAULT_STEPS: u32 = 30;
pub const DEFAULT_DWELL_MS: i64 = 4000;

/// User-facing rotation options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotationConfig {
    /// Folder holding one `*.json` palette per file.
    pub folder: PathBuf,
    /// Length of one cross-fade.
    pub duration_ms: u64,
    /// Interpolation steps per cross-fade.
    pub steps: u32,
    /// Pause at each palette after arriving; `0` or less disables it.
    pub dwell_ms: i64,
    /// Keys to animate. Empty means every key a palette defines.
    pub key_whitelist: Vec<String>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            duration_ms: DEFAULT_DURATION_MS,
            steps: DEFAULT_STEPS,
            dwell_ms: DEFAULT_DWELL_MS,
            key_whitelist: Vec::new(),
        }
    }
}

impl RotationConfig {
    /// Read the `hueCycle` section of a JSON settings file.
    ///
    /// A missing file or section yields the defaults.
    pub fn from_settings_file(path: &Path) -> Result<Self, SinkError> {
        let mut doc = read_document(path)?;
        match doc.remove(SETTINGS_SECTION) {
            None => Ok(Self::default()),
            Some(section) => {
                serde_json::from_value(section).map_err(|source| SinkError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    pub fn fade_timing(&self) -> FadeTiming {
        FadeTiming::new(self.duration_ms, self.steps)
    }

    pub fn dwell(&self) -> Option<Duration> {
        u64::try_from(self.dwell_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}
