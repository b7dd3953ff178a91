//! A complete mapping
//!
//! Owns a source and a mode configuration plus the processor snapshots
//! derived from them. Configs are edited through their setters, which only
//! mark them dirty. The snapshots are rebuilt explicitly (or lazily on the
//! next control/feedback cycle), never mutated in place.

use std::sync::Arc;

use super::feedback::FeedbackProcessor;
use super::processor::ModeProcessor;
use super::transform::{BuiltinTransforms, TransformCompiler};
use super::ModeConfig;
use crate::midi::RawSourceEvent;
use crate::source::{FeedbackSink, SourceConfig, SourceProcessor};
use crate::target::Target;

/// Shared transform compiler
pub type SharedCompiler = Arc<dyn TransformCompiler + Send + Sync>;

/// Source + mode, with derived processors
pub struct Mapping {
    name: String,
    source: SourceConfig,
    mode: ModeConfig,
    compiler: SharedCompiler,
    source_processor: SourceProcessor,
    mode_processor: ModeProcessor,
    feedback_processor: FeedbackProcessor,
}

impl std::fmt::Debug for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapping")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Mapping {
    /// Create a mapping using the builtin transform compiler
    pub fn new(name: impl Into<String>, source: SourceConfig, mode: ModeConfig) -> Self {
        Self::with_compiler(name, source, mode, Arc::new(BuiltinTransforms))
    }

    pub fn with_compiler(
        name: impl Into<String>,
        mut source: SourceConfig,
        mut mode: ModeConfig,
        compiler: SharedCompiler,
    ) -> Self {
        source.mark_clean();
        mode.mark_clean();
        let source_processor = SourceProcessor::derive(&source);
        let mode_processor = ModeProcessor::derive(&mode, compiler.as_ref());
        let feedback_processor = FeedbackProcessor::derive(&mode, compiler.as_ref());
        Self {
            name: name.into(),
            source,
            mode,
            compiler,
            source_processor,
            mode_processor,
            feedback_processor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    pub fn mode(&self) -> &ModeConfig {
        &self.mode
    }

    /// Edit the source. Takes effect on the next rebuild.
    pub fn source_mut(&mut self) -> &mut SourceConfig {
        &mut self.source
    }

    /// Edit the mode. Takes effect on the next rebuild.
    pub fn mode_mut(&mut self) -> &mut ModeConfig {
        &mut self.mode
    }

    pub fn is_dirty(&self) -> bool {
        self.source.is_dirty() || self.mode.is_dirty()
    }

    /// Derive fresh snapshots from the current configs
    pub fn rebuild(&mut self) {
        self.source_processor = SourceProcessor::derive(&self.source);
        self.mode_processor = ModeProcessor::derive(&self.mode, self.compiler.as_ref());
        self.feedback_processor = FeedbackProcessor::derive(&self.mode, self.compiler.as_ref());
        self.source.mark_clean();
        self.mode.mark_clean();
        tracing::debug!(mapping = %self.name, kind = self.mode.kind().name(), "snapshots rebuilt");
    }

    /// Rebuild if any config changed since the last rebuild.
    ///
    /// Returns whether a rebuild happened.
    pub fn rebuild_if_dirty(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.rebuild();
        true
    }

    /// Whether `event` is addressed to this mapping's source
    pub fn matches(&self, event: &RawSourceEvent) -> bool {
        self.source_processor.matches(event)
    }

    /// Run one control cycle.
    ///
    /// Returns `false` if the event doesn't belong to this mapping.
    pub fn control<T: Target + ?Sized>(&mut self, event: &RawSourceEvent, target: &mut T) -> bool {
        self.rebuild_if_dirty();
        let Some(value) = self.source_processor.control_value(event) else {
            return false;
        };
        tracing::trace!(mapping = %self.name, value, "control");
        self.mode_processor
            .process(value, &self.source_processor, target);
        true
    }

    /// The source value to display for the target's current value
    pub fn feedback_value<T: Target + ?Sized>(&mut self, target: &T) -> Option<f64> {
        self.rebuild_if_dirty();
        self.feedback_processor.feedback_value(target.current_value())
    }

    /// Send feedback for the target's current value.
    ///
    /// Returns whether anything was sent.
    pub fn feedback<T: Target + ?Sized>(&mut self, target: &T, sink: &mut dyn FeedbackSink) -> bool {
        match self.feedback_value(target) {
            Some(value) => self.source.send_feedback(value, sink),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CtlmapError;
    use crate::mapping::transform::Transform;
    use crate::mapping::ModeKind;
    use crate::midi::ShortMessage;
    use crate::source::{FeedbackEvent, RecordingSink, SourceKind};
    use crate::target::SimulatedTarget;
    use float_cmp::approx_eq;

    fn cc(channel: u8, controller: u8, value: u8) -> RawSourceEvent {
        ShortMessage::ControlChange(channel, controller, value).into()
    }

    #[test]
    fn test_reversing_mapping_round_trip() {
        let mut mapping = Mapping::new("volume", SourceConfig::default(), ModeConfig::default());

        // Count real config changes the way an observer would
        fn changed(mapping: &mut Mapping, edit: impl FnOnce(&mut ModeConfig)) -> bool {
            edit(mapping.mode_mut());
            let dirty = mapping.mode().is_dirty();
            mapping.mode_mut().mark_clean();
            dirty
        }
        let changes = [
            changed(&mut mapping, |m| m.set_kind(ModeKind::Absolute)),
            changed(&mut mapping, |m| m.set_min_target_value(0.2)),
            changed(&mut mapping, |m| m.set_max_target_value(0.8)),
            changed(&mut mapping, |m| m.set_reverse(false)),
            changed(&mut mapping, |m| m.set_control_transform("y = 1 - x")),
        ];
        let change_count = changes.iter().filter(|c| **c).count();
        assert_eq!(change_count, 3);

        mapping.rebuild();
        let mut target = SimulatedTarget::continuous(0.0);
        assert!(mapping.control(&cc(0, 0, 0), &mut target));
        assert_eq!(target.hits().len(), 1);
        let (value, is_step_count) = target.hits()[0];
        assert!(approx_eq!(f64, value, 0.8, epsilon = 1e-9));
        assert!(!is_step_count);

        let mut sink = RecordingSink::new();
        assert!(mapping.feedback(&target, &mut sink));
        assert_eq!(
            sink.events(),
            &[FeedbackEvent::Single(ShortMessage::ControlChange(0, 0, 127))]
        );
    }

    #[test]
    fn test_edits_apply_lazily() {
        let mut mapping = Mapping::new("m", SourceConfig::default(), ModeConfig::default());
        assert!(!mapping.is_dirty());

        mapping.mode_mut().set_reverse(true);
        assert!(mapping.is_dirty());

        let mut target = SimulatedTarget::continuous(0.5);
        mapping.control(&cc(0, 0, 127), &mut target);
        assert!(!mapping.is_dirty());
        assert_eq!(target.last_hit(), Some((0.0, false)));
        assert!(!mapping.rebuild_if_dirty());
    }

    #[test]
    fn test_foreign_events_are_ignored() {
        let mut source = SourceConfig::new(SourceKind::ControlChangeValue);
        source.set_midi_message_number(Some(7));
        let mut mapping = Mapping::new("m", source, ModeConfig::default());
        let mut target = SimulatedTarget::continuous(0.5);
        assert!(!mapping.control(&cc(0, 8, 64), &mut target));
        assert!(!mapping.control(&cc(1, 7, 64), &mut target));
        assert!(target.hits().is_empty());
        assert!(mapping.matches(&cc(0, 7, 64)));
    }

    #[test]
    fn test_no_feedback_without_current_value() {
        let mut mapping = Mapping::new("m", SourceConfig::default(), ModeConfig::default());
        let target = SimulatedTarget::continuous(0.5).with_value(None);
        let mut sink = RecordingSink::new();
        assert!(!mapping.feedback(&target, &mut sink));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_injected_compiler() {
        let compiler = |text: &str| -> crate::error::Result<Transform> {
            match text {
                "half" => Ok(Arc::new(|x: f64| x / 2.0)),
                other => Err(CtlmapError::Transform(other.to_string())),
            }
        };
        let mut mode = ModeConfig::new(ModeKind::Absolute);
        mode.set_control_transform("half");
        let mut mapping =
            Mapping::with_compiler("m", SourceConfig::default(), mode, Arc::new(compiler));
        let mut target = SimulatedTarget::continuous(0.0);
        mapping.control(&cc(0, 0, 127), &mut target);
        assert_eq!(target.last_hit(), Some((0.5, false)));
    }
}
