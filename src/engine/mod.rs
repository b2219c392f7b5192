pub mod cancel;
pub mod fade;
pub mod rotation;

pub use cancel::CancelToken;
pub use fade::{fade, step_colors, FadeOutcome, FadeTiming};
pub use rotation::{RotationController, RotationStatus, StartOutcome, StopOutcome};
