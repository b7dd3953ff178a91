//! Feedback direction of a mode
//!
//! Maps a target's current value back into the source's normalized range so
//! the control surface can display it.

use super::range::ValueRange;
use super::transform::{self, compile_or_disable, Transform, TransformCompiler};
use super::{ModeConfig, ModeKind};

/// Feedback-direction engine for one mapping
#[derive(Clone)]
pub struct FeedbackProcessor {
    kind: ModeKind,
    target_range: ValueRange,
    source_range: ValueRange,
    reverse: bool,
    feedback_transform: Option<Transform>,
}

impl std::fmt::Debug for FeedbackProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackProcessor")
            .field("kind", &self.kind)
            .field("target_range", &self.target_range)
            .field("source_range", &self.source_range)
            .field("reverse", &self.reverse)
            .field("feedback_transform", &self.feedback_transform.is_some())
            .finish()
    }
}

impl FeedbackProcessor {
    pub fn derive(config: &ModeConfig, compiler: &dyn TransformCompiler) -> Self {
        Self {
            kind: config.kind(),
            target_range: config.target_range(),
            source_range: config.source_range(),
            reverse: config.reverse(),
            feedback_transform: compile_or_disable(compiler, config.feedback_transform()),
        }
    }

    /// Source value to display for the target value `target_value`.
    ///
    /// `None` in, `None` out: a target without a current value sends no
    /// feedback.
    pub fn feedback_value(&self, target_value: Option<f64>) -> Option<f64> {
        let value = target_value?;
        let value = match self.kind {
            ModeKind::Absolute => {
                let reversed = self.reversed(value);
                let transformed = transform::apply(self.feedback_transform.as_ref(), reversed);
                let position = self.target_range.normalize(transformed);
                self.source_range.denormalize(position)
            }
            ModeKind::Relative => self.target_range.normalize(self.reversed(value)),
            ModeKind::Toggle => {
                let position = self.target_range.normalize(value);
                self.source_range.denormalize(position)
            }
        };
        Some(value)
    }

    fn reversed(&self, value: f64) -> f64 {
        if self.reverse {
            1.0 - value
        } else {
            value
        }
    }
}
