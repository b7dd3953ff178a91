//! Mode processor
//!
//! Immutable snapshot of a [`ModeConfig`] that runs the control direction:
//! a normalized source value goes in, zero or one target hit comes out.

use super::range::{denormalize, rescale, ValueRange};
use super::transform::{self, compile_or_disable, Transform, TransformCompiler};
use super::{ModeConfig, ModeKind};
use crate::source::SourceProcessor;
use crate::target::Target;

/// Round `value` to the nearest multiple of `step_size`.
///
/// Continuous targets (no step size) are left alone.
pub fn align_to_step_size(value: f64, step_size: Option<f64>) -> f64 {
    match step_size {
        Some(step) if step > 0.0 => (value / step).round() * step,
        _ => value,
    }
}

/// Control-direction engine for one mapping
#[derive(Clone)]
pub struct ModeProcessor {
    kind: ModeKind,
    target_range: ValueRange,
    source_range: ValueRange,
    reverse: bool,
    ignore_out_of_range: bool,
    target_jump: ValueRange,
    step_size: ValueRange,
    rotate: bool,
    round_target_value: bool,
    scale_mode: bool,
    control_transform: Option<Transform>,
}

impl std::fmt::Debug for ModeProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeProcessor")
            .field("kind", &self.kind)
            .field("target_range", &self.target_range)
            .field("source_range", &self.source_range)
            .field("reverse", &self.reverse)
            .field("control_transform", &self.control_transform.is_some())
            .finish_non_exhaustive()
    }
}

impl ModeProcessor {
    /// Take a snapshot of `config`, compiling its control transform
    pub fn derive(config: &ModeConfig, compiler: &dyn TransformCompiler) -> Self {
        Self {
            kind: config.kind(),
            target_range: config.target_range(),
            source_range: config.source_range(),
            reverse: config.reverse(),
            ignore_out_of_range: config.ignore_out_of_range(),
            target_jump: config.target_jump(),
            step_size: config.step_size(),
            rotate: config.rotate(),
            round_target_value: config.round_target_value(),
            scale_mode: config.scale_mode(),
            control_transform: compile_or_disable(compiler, config.control_transform()),
        }
    }

    pub fn kind(&self) -> ModeKind {
        self.kind
    }

    /// Process one decoded source value
    pub fn process<T: Target + ?Sized>(&self, value: f64, source: &SourceProcessor, target: &mut T) {
        match self.kind {
            ModeKind::Absolute => self.process_absolute(value, target),
            ModeKind::Relative => self.process_relative(value, source, target),
            ModeKind::Toggle => self.process_toggle(value, target),
        }
    }

    fn process_absolute<T: Target + ?Sized>(&self, value: f64, target: &mut T) {
        if self.source_range.contains(value) {
            let mapped = self.source_range.normalize(value);
            let transformed = transform::apply(self.control_transform.as_ref(), mapped);
            let in_target_range = self.target_range.denormalize(transformed);
            let absolute = if self.reverse {
                1.0 - in_target_range
            } else {
                in_target_range
            };
            let absolute = self.round_if_necessary(absolute, target);
            self.hit_considering_max_jump(target, absolute);
        } else if !self.ignore_out_of_range {
            if value < self.source_range.min() {
                self.hit_considering_max_jump(target, self.target_range.min());
            } else {
                self.hit_considering_max_jump(target, self.target_range.max());
            }
        }
    }

    fn process_relative<T: Target + ?Sized>(&self, value: f64, source: &SourceProcessor, target: &mut T) {
        if source.emits_step_counts() {
            // Encoder
            let step_count = value as i32;
            if step_count == 0 {
                return;
            }
            if target.wants_step_counts() {
                let pepped_up = self.pep_up_step_count(step_count, source, target);
                if pepped_up != 0 {
                    target.hit(pepped_up as f64, true);
                }
                return;
            }
            match target.step_size() {
                None => {
                    let step_size = rescale(
                        step_count as f64,
                        self.min_source_step_count(source) as f64,
                        self.max_source_step_count(source) as f64,
                        self.step_size.min(),
                        self.step_size.max(),
                    );
                    self.hit_with_delta(target, self.reverse_factor() * step_size);
                }
                Some(target_step_size) => {
                    let pepped_up = self.pep_up_step_count(step_count, source, target);
                    self.hit_with_delta(target, pepped_up as f64 * target_step_size);
                }
            }
        } else if value > 0.0 && self.source_range.contains(value) {
            // One-direction magnitude, e.g. a button or pressure
            if target.wants_step_counts() {
                let step_count = rescale(
                    value,
                    self.source_range.min(),
                    self.source_range.max(),
                    self.min_target_step_count(target) as f64,
                    self.max_target_step_count(target) as f64,
                );
                let pepped_up = self.reverse_factor() * step_count.round();
                if pepped_up != 0.0 {
                    target.hit(pepped_up, true);
                }
                return;
            }
            match target.step_size() {
                None => {
                    let step_size = rescale(
                        value,
                        self.source_range.min(),
                        self.source_range.max(),
                        self.step_size.min(),
                        self.step_size.max(),
                    );
                    self.hit_with_delta(target, self.reverse_factor() * step_size);
                }
                Some(target_step_size) => {
                    let step = Some(target_step_size);
                    let min = align_to_step_size(self.step_size.min(), step);
                    let max = align_to_step_size(self.step_size.max(), step);
                    let mapped = rescale(
                        value,
                        self.source_range.min(),
                        self.source_range.max(),
                        min,
                        max,
                    );
                    let aligned = align_to_step_size(mapped, step);
                    self.hit_with_delta(target, self.reverse_factor() * aligned);
                }
            }
        }
    }

    fn process_toggle<T: Target + ?Sized>(&self, value: f64, target: &mut T) {
        if value > 0.0 {
            let current = target.current_value().unwrap_or(0.0);
            let absolute = if current > self.target_range.center() {
                self.target_range.min()
            } else {
                self.target_range.max()
            };
            target.hit(absolute, false);
        }
    }

    /// Rescale an encoder step count into the target's step count range
    fn pep_up_step_count<T: Target + ?Sized>(
        &self,
        step_count: i32,
        source: &SourceProcessor,
        target: &T,
    ) -> i32 {
        if step_count == 0 {
            return 0;
        }
        let intermediate = rescale(
            step_count as f64,
            self.min_source_step_count(source) as f64,
            self.max_source_step_count(source) as f64,
            self.min_target_step_count(target) as f64,
            self.max_target_step_count(target) as f64,
        );
        self.reverse_factor() as i32 * intermediate.round() as i32
    }

    fn reverse_factor(&self) -> f64 {
        if self.reverse {
            -1.0
        } else {
            1.0
        }
    }

    fn min_source_step_count(&self, source: &SourceProcessor) -> i32 {
        to_step_count(self.source_range.min(), source.max_step_count())
    }

    fn max_source_step_count(&self, source: &SourceProcessor) -> i32 {
        to_step_count(self.source_range.max(), source.max_step_count())
    }

    fn min_target_step_count<T: Target + ?Sized>(&self, target: &T) -> i32 {
        to_step_count(self.step_size.min(), target.max_step_count())
    }

    fn max_target_step_count<T: Target + ?Sized>(&self, target: &T) -> i32 {
        to_step_count(self.step_size.max(), target.max_step_count())
    }

    /// Add `delta` to the current value, then align, rotate and clamp
    fn hit_with_delta<T: Target + ?Sized>(&self, target: &mut T, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let current = target.current_value().unwrap_or(0.0);
        let aligned = align_to_step_size(current + delta, target.step_size());
        let (min, max) = (self.target_range.min(), self.target_range.max());
        let rotated = if self.rotate && aligned < min {
            max
        } else if self.rotate && aligned > max {
            min
        } else {
            aligned
        };
        target.hit(rotated.clamp(min, max), false);
    }

    fn round_if_necessary<T: Target + ?Sized>(&self, value: f64, target: &T) -> f64 {
        if !self.round_target_value || !target.can_be_discrete() {
            return value;
        }
        match target.step_size() {
            Some(step) if step > 0.0 => {
                let span = (1.0 / step) as i32;
                if span == 0 {
                    return value;
                }
                (value * span as f64).round() / span as f64
            }
            _ => value,
        }
    }

    /// Hit the target unless the jump is too small or too large.
    ///
    /// With scale mode on, jumps above the maximum become a smaller approach
    /// step in the same direction.
    fn hit_considering_max_jump<T: Target + ?Sized>(&self, target: &mut T, value: f64) {
        let current = target.current_value().unwrap_or(0.0);
        let jump = (value - current).abs();
        if jump <= self.target_jump.max() {
            if jump >= self.target_jump.min() {
                target.hit(value, false);
            }
        } else if self.scale_mode {
            let approach = denormalize(jump, self.target_jump.min(), self.target_jump.max());
            if value < current {
                target.hit(current - approach, false);
            } else {
                target.hit(current + approach, false);
            }
        }
    }
}

/// Map a normalized value to a step count in `0..=max_step_count`
fn to_step_count(value: f64, max_step_count: i32) -> i32 {
    denormalize(value, 0.0, max_step_count as f64).round() as i32
}
