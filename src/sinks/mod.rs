pub mod memory;
pub mod settings_file;

use crate::error::SinkError;
use crate::palettes::ColorMap;

pub use memory::MemorySink;
pub use settings_file::SettingsFileSink;

/// A host configuration store holding a single color-customization mapping.
///
/// Every `apply` is a full replacement of that mapping, never a partial update.
pub trait ConfigSink: Send + Sync {
    /// Human-readable store name (e.g. "settings file").
    fn name(&self) -> &str;

    /// The currently stored mapping.
    fn read_static(&self) -> Result<ColorMap, SinkError>;

    /// Replace the stored mapping with `colors`.
    fn apply(&self, colors: &ColorMap) -> Result<(), SinkError>;
}
