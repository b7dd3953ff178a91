//! Target contract
//!
//! A target is whatever parameter a mapping controls. The host owns it, this
//! crate only sees it through the [`Target`] trait for the duration of one
//! control or feedback cycle.

use strum::{EnumIter, EnumString, IntoStaticStr};

/// Behavioral character of a target parameter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, IntoStaticStr, EnumIter,
)]
pub enum TargetCharacter {
    /// Any value in [0, 1]
    #[default]
    Continuous,
    /// A fixed grid of values
    Discrete,
    /// On/off
    Switch,
    /// Fires on hit, has no persistent value
    Trigger,
}

/// Capability object for a controllable parameter
pub trait Target {
    /// Current normalized value, `None` if the target has none right now
    fn current_value(&self) -> Option<f64>;

    /// Native step size, `None` for continuous targets
    fn step_size(&self) -> Option<f64>;

    /// Largest step count the target accepts in one hit
    fn max_step_count(&self) -> i32;

    /// Whether the target prefers relative step counts over absolute values
    fn wants_step_counts(&self) -> bool;

    /// Whether rounding to the target's grid makes sense
    fn can_be_discrete(&self) -> bool;

    fn character(&self) -> TargetCharacter;

    /// Apply a value. If `is_step_count` is set, `value` is a signed integral
    /// step count, otherwise an absolute normalized value.
    fn hit(&mut self, value: f64, is_step_count: bool);
}

/// A simple in-memory target
///
/// Holds a value in [0, 1] and records every hit. The CLI uses it to
/// simulate control cycles, tests use it as a recording double.
#[derive(Debug, Clone)]
pub struct SimulatedTarget {
    value: Option<f64>,
    step_size: Option<f64>,
    max_step_count: i32,
    wants_step_counts: bool,
    character: TargetCharacter,
    hits: Vec<(f64, bool)>,
}

impl SimulatedTarget {
    /// A continuous target starting at `value`
    pub fn continuous(value: f64) -> Self {
        Self {
            value: Some(value),
            step_size: None,
            max_step_count: 1,
            wants_step_counts: false,
            character: TargetCharacter::Continuous,
            hits: Vec::new(),
        }
    }

    /// A discrete target with the given step size starting at `value`
    pub fn discrete(value: f64, step_size: f64) -> Self {
        Self {
            value: Some(value),
            step_size: Some(step_size),
            max_step_count: (1.0 / step_size).round() as i32,
            wants_step_counts: false,
            character: TargetCharacter::Discrete,
            hits: Vec::new(),
        }
    }

    /// A target that wants to be hit with step counts
    pub fn stepping(max_step_count: i32) -> Self {
        Self {
            value: None,
            step_size: None,
            max_step_count,
            wants_step_counts: true,
            character: TargetCharacter::Continuous,
            hits: Vec::new(),
        }
    }

    /// A two-state target
    pub fn switch(on: bool) -> Self {
        Self {
            value: Some(if on { 1.0 } else { 0.0 }),
            step_size: Some(1.0),
            max_step_count: 1,
            wants_step_counts: false,
            character: TargetCharacter::Switch,
            hits: Vec::new(),
        }
    }

    /// Replace the current value, `None` clears it
    pub fn with_value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }

    /// All hits so far as `(value, is_step_count)`
    pub fn hits(&self) -> &[(f64, bool)] {
        &self.hits
    }

    pub fn last_hit(&self) -> Option<(f64, bool)> {
        self.hits.last().copied()
    }
}

impl Target for SimulatedTarget {
    fn current_value(&self) -> Option<f64> {
        self.value
    }

    fn step_size(&self) -> Option<f64> {
        self.step_size
    }

    fn max_step_count(&self) -> i32 {
        self.max_step_count
    }

    fn wants_step_counts(&self) -> bool {
        self.wants_step_counts
    }

    fn can_be_discrete(&self) -> bool {
        self.step_size.is_some()
    }

    fn character(&self) -> TargetCharacter {
        self.character
    }

    fn hit(&mut self, value: f64, is_step_count: bool) {
        tracing::trace!(value, is_step_count, "target hit");
        self.hits.push((value, is_step_count));
        if !is_step_count {
            self.value = Some(value.clamp(0.0, 1.0));
        }
    }
}
