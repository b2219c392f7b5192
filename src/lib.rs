//! Cross-fade an editor's color customizations through a folder of palettes.
//!
//! Palettes are loaded in numeric-aware filename order, blended in linear
//! light, and written to the host configuration store through a
//! [`sinks::ConfigSink`]. [`engine::RotationController`] owns the
//! start/stop/advance lifecycle.

pub mod cli;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod palettes;
pub mod partition;
pub mod preview;
pub mod sinks;
