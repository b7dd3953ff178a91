//! Mode configuration
//!
//! How a normalized source value turns into a target change, and back.

use strum::{EnumIter, EnumString, FromRepr, IntoStaticStr};

use super::ValueRange;
use crate::source::{SourceCharacter, SourceConfig};
use crate::target::{Target, TargetCharacter};

pub const DEFAULT_STEP_SIZE: f64 = 0.01;

/// Mode algorithm
///
/// The discriminants are the persisted indices.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumString,
    IntoStaticStr,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
pub enum ModeKind {
    /// Source position maps to target position
    #[default]
    Absolute = 0,
    /// Source sends increments
    Relative = 1,
    /// Source flips the target between two values
    Toggle = 2,
}

impl ModeKind {
    pub fn label(&self) -> &'static str {
        self.name()
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Mode settings of one mapping
///
/// All values live in [0, 1]. Setters clamp, keep each min/max pair ordered
/// and mark the config dirty only if something actually changed. The owner
/// rebuilds its processors after a batch of changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeConfig {
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
    control_transform: String,
    feedback_transform: String,
    dirty: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            kind: ModeKind::Absolute,
            target_range: ValueRange::unit(),
            source_range: ValueRange::unit(),
            reverse: false,
            ignore_out_of_range: false,
            target_jump: ValueRange::unit(),
            step_size: ValueRange::new(DEFAULT_STEP_SIZE, DEFAULT_STEP_SIZE),
            rotate: false,
            round_target_value: false,
            scale_mode: false,
            control_transform: String::new(),
            feedback_transform: String::new(),
            dirty: false,
        }
    }
}

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn update<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        false
    } else {
        *field = value;
        true
    }
}

impl ModeConfig {
    pub fn new(kind: ModeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ModeKind {
        self.kind
    }

    pub fn target_range(&self) -> ValueRange {
        self.target_range
    }

    pub fn source_range(&self) -> ValueRange {
        self.source_range
    }

    pub fn target_jump(&self) -> ValueRange {
        self.target_jump
    }

    pub fn step_size(&self) -> ValueRange {
        self.step_size
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn ignore_out_of_range(&self) -> bool {
        self.ignore_out_of_range
    }

    pub fn rotate(&self) -> bool {
        self.rotate
    }

    pub fn round_target_value(&self) -> bool {
        self.round_target_value
    }

    pub fn scale_mode(&self) -> bool {
        self.scale_mode
    }

    pub fn control_transform(&self) -> &str {
        &self.control_transform
    }

    pub fn feedback_transform(&self) -> &str {
        &self.feedback_transform
    }

    pub fn set_kind(&mut self, kind: ModeKind) {
        self.dirty |= update(&mut self.kind, kind);
    }

    pub fn set_min_target_value(&mut self, value: f64) {
        self.dirty |= self.target_range.set_min(unit(value));
    }

    pub fn set_max_target_value(&mut self, value: f64) {
        self.dirty |= self.target_range.set_max(unit(value));
    }

    pub fn set_min_source_value(&mut self, value: f64) {
        self.dirty |= self.source_range.set_min(unit(value));
    }

    pub fn set_max_source_value(&mut self, value: f64) {
        self.dirty |= self.source_range.set_max(unit(value));
    }

    pub fn set_min_target_jump(&mut self, value: f64) {
        self.dirty |= self.target_jump.set_min(unit(value));
    }

    pub fn set_max_target_jump(&mut self, value: f64) {
        self.dirty |= self.target_jump.set_max(unit(value));
    }

    pub fn set_min_step_size(&mut self, value: f64) {
        self.dirty |= self.step_size.set_min(unit(value));
    }

    pub fn set_max_step_size(&mut self, value: f64) {
        self.dirty |= self.step_size.set_max(unit(value));
    }

    pub fn set_reverse(&mut self, reverse: bool) {
        self.dirty |= update(&mut self.reverse, reverse);
    }

    pub fn set_ignore_out_of_range(&mut self, ignore: bool) {
        self.dirty |= update(&mut self.ignore_out_of_range, ignore);
    }

    pub fn set_rotate(&mut self, rotate: bool) {
        self.dirty |= update(&mut self.rotate, rotate);
    }

    pub fn set_round_target_value(&mut self, round: bool) {
        self.dirty |= update(&mut self.round_target_value, round);
    }

    pub fn set_scale_mode(&mut self, scale_mode: bool) {
        self.dirty |= update(&mut self.scale_mode, scale_mode);
    }

    pub fn set_control_transform(&mut self, text: impl Into<String>) {
        self.dirty |= update(&mut self.control_transform, text.into());
    }

    pub fn set_feedback_transform(&mut self, text: impl Into<String>) {
        self.dirty |= update(&mut self.feedback_transform, text.into());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // Which settings mean anything for the current kind

    pub fn supports_reverse(&self) -> bool {
        matches!(self.kind, ModeKind::Absolute | ModeKind::Relative)
    }

    pub fn supports_ignore_out_of_range(&self) -> bool {
        self.kind == ModeKind::Absolute
    }

    pub fn supports_target_jump(&self) -> bool {
        self.kind == ModeKind::Absolute
    }

    pub fn supports_control_transform(&self) -> bool {
        self.kind == ModeKind::Absolute
    }

    pub fn supports_feedback_transform(&self) -> bool {
        self.kind == ModeKind::Absolute
    }

    pub fn supports_round_target_value(&self) -> bool {
        self.kind == ModeKind::Absolute
    }

    pub fn supports_scale_mode(&self) -> bool {
        self.kind == ModeKind::Absolute
    }

    pub fn supports_step_size(&self) -> bool {
        self.kind == ModeKind::Relative
    }

    pub fn supports_rotate(&self) -> bool {
        self.kind == ModeKind::Relative
    }

    // Presets

    /// Restore defaults for everything but the kind, then apply preferred
    /// values for `source` and `target`
    pub fn reset(&mut self, source: &SourceConfig, target: &dyn Target) {
        let defaults = Self::default();
        self.set_min_source_value(defaults.source_range.min());
        self.set_max_source_value(defaults.source_range.max());
        self.set_min_target_value(defaults.target_range.min());
        self.set_max_target_value(defaults.target_range.max());
        self.set_min_target_jump(defaults.target_jump.min());
        self.set_max_target_jump(defaults.target_jump.max());
        self.set_control_transform(defaults.control_transform);
        self.set_feedback_transform(defaults.feedback_transform);
        self.set_ignore_out_of_range(defaults.ignore_out_of_range);
        self.set_round_target_value(defaults.round_target_value);
        self.set_scale_mode(defaults.scale_mode);
        self.set_rotate(defaults.rotate);
        self.set_reverse(defaults.reverse);
        self.set_preferred_values(source, target);
    }

    /// Apply settings that suit `target` better than the defaults
    pub fn set_preferred_values(&mut self, _source: &SourceConfig, target: &dyn Target) {
        let step_size = match (target.character(), target.step_size()) {
            (TargetCharacter::Discrete, Some(step_size)) => step_size,
            _ => DEFAULT_STEP_SIZE,
        };
        self.set_min_step_size(step_size);
        self.set_max_step_size(step_size);
    }

    /// Switch to the preferred kind and apply preferred values
    pub fn set_preferred_kind_and_values(&mut self, source: &SourceConfig, target: &dyn Target) {
        self.set_kind(preferred_mode_kind(source, target));
        self.set_preferred_values(source, target);
    }

    /// Whether the current kind is a sensible choice for `source` and `target`
    pub fn settings_make_sense(&self, source: &SourceConfig, target: &dyn Target) -> bool {
        match source.character() {
            SourceCharacter::Range => self.kind == ModeKind::Absolute,
            SourceCharacter::Switch => match self.kind {
                ModeKind::Absolute | ModeKind::Toggle => !target.wants_step_counts(),
                ModeKind::Relative => {
                    target.wants_step_counts()
                        || matches!(
                            target.character(),
                            TargetCharacter::Continuous | TargetCharacter::Discrete
                        )
                }
            },
            SourceCharacter::Encoder1 | SourceCharacter::Encoder2 | SourceCharacter::Encoder3 => {
                self.kind == ModeKind::Relative
            }
        }
    }
}

/// The mode kind that fits a source/target combination best
pub fn preferred_mode_kind(source: &SourceConfig, target: &dyn Target) -> ModeKind {
    match source.character() {
        SourceCharacter::Range => ModeKind::Absolute,
        SourceCharacter::Switch => {
            if target.wants_step_counts() {
                ModeKind::Relative
            } else {
                match target.character() {
                    TargetCharacter::Continuous | TargetCharacter::Trigger => ModeKind::Absolute,
                    TargetCharacter::Discrete => ModeKind::Relative,
                    TargetCharacter::Switch => ModeKind::Toggle,
                }
            }
        }
        SourceCharacter::Encoder1 | SourceCharacter::Encoder2 | SourceCharacter::Encoder3 => {
            ModeKind::Relative
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;
    use crate::target::SimulatedTarget;

    #[test]
    fn test_defaults() {
        let mode = ModeConfig::default();
        assert_eq!(mode.kind(), ModeKind::Absolute);
        assert_eq!(mode.target_range(), ValueRange::unit());
        assert_eq!(mode.step_size(), ValueRange::new(0.01, 0.01));
        assert!(!mode.reverse());
        assert!(mode.control_transform().is_empty());
        assert!(!mode.is_dirty());
    }

    #[test]
    fn test_only_real_changes_mark_dirty() {
        let mut mode = ModeConfig::default();
        mode.set_reverse(false);
        mode.set_max_target_value(1.0);
        assert!(!mode.is_dirty());

        mode.set_min_target_value(0.2);
        assert!(mode.is_dirty());
        mode.mark_clean();
        mode.set_min_target_value(0.2);
        assert!(!mode.is_dirty());
    }

    #[test]
    fn test_values_are_clamped() {
        let mut mode = ModeConfig::default();
        mode.set_max_target_value(1.5);
        mode.set_min_source_value(-0.5);
        assert_eq!(mode.target_range().max(), 1.0);
        assert_eq!(mode.source_range().min(), 0.0);
    }

    #[test]
    fn test_paired_bounds_follow_each_other() {
        let mut mode = ModeConfig::default();
        mode.set_max_target_value(0.3);
        mode.set_min_target_value(0.6);
        assert_eq!(mode.target_range(), ValueRange::new(0.6, 0.6));

        mode.set_max_source_value(0.1);
        mode.set_min_source_value(0.0);
        assert_eq!(mode.source_range(), ValueRange::new(0.0, 0.1));
    }

    #[test]
    fn test_support_queries() {
        let absolute = ModeConfig::new(ModeKind::Absolute);
        assert!(absolute.supports_reverse());
        assert!(absolute.supports_ignore_out_of_range());
        assert!(absolute.supports_target_jump());
        assert!(absolute.supports_control_transform());
        assert!(absolute.supports_feedback_transform());
        assert!(absolute.supports_round_target_value());
        assert!(absolute.supports_scale_mode());
        assert!(!absolute.supports_step_size());
        assert!(!absolute.supports_rotate());

        let relative = ModeConfig::new(ModeKind::Relative);
        assert!(relative.supports_reverse());
        assert!(relative.supports_step_size());
        assert!(relative.supports_rotate());
        assert!(!relative.supports_target_jump());

        let toggle = ModeConfig::new(ModeKind::Toggle);
        assert!(!toggle.supports_reverse());
        assert!(!toggle.supports_step_size());
    }

    #[test]
    fn test_preferred_mode_kind() {
        let fader = SourceConfig::default();
        let mut button = SourceConfig::new(SourceKind::NoteVelocity);
        button.set_midi_message_number(Some(36));
        let mut encoder = SourceConfig::default();
        encoder.set_custom_character(SourceCharacter::Encoder1);

        let continuous = SimulatedTarget::continuous(0.0);
        let discrete = SimulatedTarget::discrete(0.0, 0.1);
        let switch = SimulatedTarget::switch(false);
        let stepping = SimulatedTarget::stepping(10);

        assert_eq!(preferred_mode_kind(&fader, &continuous), ModeKind::Absolute);
        assert_eq!(preferred_mode_kind(&button, &continuous), ModeKind::Absolute);
        assert_eq!(preferred_mode_kind(&button, &discrete), ModeKind::Relative);
        assert_eq!(preferred_mode_kind(&button, &switch), ModeKind::Toggle);
        assert_eq!(preferred_mode_kind(&button, &stepping), ModeKind::Relative);
        assert_eq!(preferred_mode_kind(&encoder, &continuous), ModeKind::Relative);
    }

    #[test]
    fn test_settings_make_sense() {
        let fader = SourceConfig::default();
        let button = SourceConfig::new(SourceKind::NoteVelocity);
        let switch = SimulatedTarget::switch(false);
        let stepping = SimulatedTarget::stepping(10);

        assert!(ModeConfig::new(ModeKind::Absolute).settings_make_sense(&fader, &switch));
        assert!(!ModeConfig::new(ModeKind::Toggle).settings_make_sense(&fader, &switch));
        assert!(ModeConfig::new(ModeKind::Toggle).settings_make_sense(&button, &switch));
        assert!(!ModeConfig::new(ModeKind::Relative).settings_make_sense(&button, &switch));
        assert!(!ModeConfig::new(ModeKind::Toggle).settings_make_sense(&button, &stepping));
    }

    #[test]
    fn test_reset_applies_preferred_step_size() {
        let mut mode = ModeConfig::new(ModeKind::Relative);
        mode.set_min_target_value(0.4);
        mode.set_reverse(true);
        mode.set_control_transform("y = x");

        let source = SourceConfig::default();
        mode.reset(&source, &SimulatedTarget::discrete(0.0, 0.25));
        assert_eq!(mode.kind(), ModeKind::Relative);
        assert_eq!(mode.target_range(), ValueRange::unit());
        assert!(!mode.reverse());
        assert!(mode.control_transform().is_empty());
        assert_eq!(mode.step_size(), ValueRange::new(0.25, 0.25));

        mode.reset(&source, &SimulatedTarget::continuous(0.0));
        assert_eq!(mode.step_size(), ValueRange::new(0.01, 0.01));
    }
}
