use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::SinkError;
use crate::palettes::ColorMap;

use super::ConfigSink;

/// Settings key an editor reads color overrides from.
pub const DEFAULT_COLORS_KEY: &str = "workbench.colorCustomizations";

/// A JSON settings document on disk, with the color mapping under one key.
///
/// Other settings in the document are preserved on every write.
#[derive(Debug, Clone)]
pub struct SettingsFileSink {
    path: PathBuf,
    key: String,
}

impl SettingsFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, DEFAULT_COLORS_KEY)
    }

    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document. A missing file reads as an empty object.
    pub fn read_document(&self) -> Result<Map<String, Value>, SinkError> {
        read_document(&self.path)
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let mut content = serde_json::to_string_pretty(doc).map_err(|source| SinkError::Parse {
            path: self.path.clone(),
            source,
        })?;
        content.push('\n');
        std::fs::write(&self.path, content).map_err(|source| SinkError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl ConfigSink for SettingsFileSink {
    fn name(&self) -> &str {
        "settings file"
    }

    fn read_static(&self) -> Result<ColorMap, SinkError> {
        let doc = self.read_document()?;
        match doc.get(&self.key) {
            None | Some(Value::Null) => Ok(ColorMap::new()),
            Some(Value::Object(colors)) => Ok(colors
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()),
            Some(_) => Err(SinkError::NotAnObject {
                path: self.path.clone(),
                key: self.key.clone(),
            }),
        }
    }

    fn apply(&self, colors: &ColorMap) -> Result<(), SinkError> {
        let mut doc = self.read_document()?;
        let colors: Map<String, Value> = colors
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        doc.insert(self.key.clone(), Value::Object(colors));
        self.write_document(&doc)?;
        trace!(path = %self.path.display(), "color customizations written");
        Ok(())
    }
}

/// Parse a JSON settings document. A missing file reads as an empty object.
pub fn read_document(path: &Path) -> Result<Map<String, Value>, SinkError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(SinkError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(&text) {
        Ok(Value::Object(doc)) => Ok(doc),
        Ok(_) => Err(SinkError::NotAnObject {
            path: path.to_path_buf(),
            key: "<root>".to_string(),
        }),
        Err(source) => Err(SinkError::Parse {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolve the default settings file location.
pub fn default_settings_path() -> PathBuf {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            PathBuf::from(home).join(".config")
        });
    config_home.join("hue-cycle").join("settings.json")
}
