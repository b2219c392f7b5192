use std::path::PathBuf;

/// Broad class of a failure, used to word the notification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The theme folder is unset or unusable.
    Configuration,
    /// The folder exists but yields no usable palettes.
    Data,
    /// Reading or writing the host configuration store failed.
    Host,
}

/// Failures while loading a palette folder.
///
/// Individual unreadable or unparseable files are not errors; they are
/// logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("theme folder is not set")]
    FolderUnset,

    #[error("theme folder does not exist: {}", .path.display())]
    FolderNotFound { path: PathBuf },

    #[error("failed to read theme folder {}", .path.display())]
    ReadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no palette definition files (*.json) found in {}", .path.display())]
    NoDefinitionFiles { path: PathBuf },

    #[error("none of the palette files in {} contain usable colors", .path.display())]
    NoUsablePalettes { path: PathBuf },
}

impl LoadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FolderUnset | Self::FolderNotFound { .. } | Self::ReadFolder { .. } => {
                ErrorCategory::Configuration
            }
            Self::NoDefinitionFiles { .. } | Self::NoUsablePalettes { .. } => ErrorCategory::Data,
        }
    }
}

/// Failures of the host configuration store.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to read settings from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected `{key}` in {} to be an object", .path.display())]
    NotAnObject { path: PathBuf, key: String },

    #[error("failed to write settings to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons `start` can fail. State is left untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl StartError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Load(err) => err.category(),
            Self::Sink(_) => ErrorCategory::Host,
        }
    }
}
