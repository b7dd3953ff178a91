//! Value mapping between sources and targets
//!
//! Maps normalized source values to target values (control) and back
//! (feedback) according to a mode.

mod feedback;
mod mode;
mod pipeline;
mod processor;
mod range;
pub mod transform;

pub use feedback::FeedbackProcessor;
pub use mode::{preferred_mode_kind, ModeConfig, ModeKind, DEFAULT_STEP_SIZE};
pub use pipeline::{Mapping, SharedCompiler};
pub use processor::{align_to_step_size, ModeProcessor};
pub use range::{denormalize, normalize, rescale, ValueRange};
pub use transform::{BuiltinTransforms, NoTransforms, Transform, TransformCompiler};
