//! Persisted form of sources and modes
//!
//! Flat camelCase records. Only the fields that mean something for the
//! current kind are written, absent fields keep their defaults on reading.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CtlmapError, Result};
use crate::mapping::{ModeConfig, ModeKind};
use crate::source::{ClockTransportKind, SourceCharacter, SourceConfig, SourceKind};

/// Persisted value meaning "any channel" or "any number"
pub const ANY: i32 = -1;

/// A persisted enum, by index or by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Index(i64),
    Name(String),
}

impl Default for EnumValue {
    fn default() -> Self {
        EnumValue::Index(0)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Index(i) => write!(f, "{}", i),
            EnumValue::Name(name) => write!(f, "{}", name),
        }
    }
}

impl EnumValue {
    fn decode<E: FromStr>(
        &self,
        field: &'static str,
        from_index: impl Fn(u8) -> Option<E>,
    ) -> Result<E> {
        let decoded = match self {
            EnumValue::Index(i) => u8::try_from(*i).ok().and_then(from_index),
            EnumValue::Name(name) => E::from_str(name).ok(),
        };
        decoded.ok_or_else(|| CtlmapError::invalid_field(field, self))
    }

    fn encode(index: u8, name: &'static str, style: EnumStyle) -> Self {
        match style {
            EnumStyle::Index => EnumValue::Index(index as i64),
            EnumStyle::Name => EnumValue::Name(name.to_string()),
        }
    }
}

/// How enums are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumStyle {
    #[default]
    Index,
    Name,
}

fn selector(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v >= 0)
}

fn persist_selector<T: Into<i32>>(value: Option<T>) -> i32 {
    value.map(Into::into).unwrap_or(ANY)
}

/// Persisted source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    #[serde(rename = "type")]
    pub kind: EnumValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<EnumValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
    #[serde(rename = "is14Bit", default, skip_serializing_if = "Option::is_none")]
    pub is_14_bit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<EnumValue>,
}

impl SourceConfig {
    /// Persisted form of this source
    pub fn to_record(&self, style: EnumStyle) -> SourceRecord {
        let kind = self.kind();
        let number = if self.supports_midi_message_number() {
            Some(persist_selector(self.midi_message_number()))
        } else if self.supports_parameter_number() {
            Some(persist_selector(self.parameter_number()))
        } else {
            None
        };
        SourceRecord {
            kind: EnumValue::encode(kind as u8, kind.name(), style),
            channel: self
                .supports_channel()
                .then(|| persist_selector(self.channel())),
            number,
            character: self.supports_custom_character().then(|| {
                let character = self.custom_character();
                EnumValue::encode(character as u8, character.name(), style)
            }),
            is_registered: self.supports_is_registered().then(|| self.is_registered()),
            is_14_bit: self.supports_14_bit().then(|| self.is_14_bit()),
            message: self.supports_clock_transport_kind().then(|| {
                let transport = self.clock_transport_kind();
                EnumValue::encode(transport as u8, transport.name(), style)
            }),
        }
    }

    /// Apply the fields present in `record`
    pub fn apply_record(&mut self, record: &SourceRecord) -> Result<()> {
        // Kind first, it decides where the number goes
        self.set_kind(record.kind.decode("type", SourceKind::from_repr)?);
        if let Some(channel) = record.channel {
            self.set_channel(selector(Some(channel)).map(|c| c.min(u8::MAX as i32) as u8));
        }
        if let Some(is_14_bit) = record.is_14_bit {
            self.set_is_14_bit(is_14_bit);
        }
        if let Some(is_registered) = record.is_registered {
            self.set_is_registered(is_registered);
        }
        if let Some(number) = record.number {
            self.set_number(selector(Some(number)).map(|n| n.min(u16::MAX as i32) as u16));
        }
        if let Some(character) = &record.character {
            self.set_custom_character(character.decode("character", SourceCharacter::from_repr)?);
        }
        if let Some(message) = &record.message {
            self.set_clock_transport_kind(message.decode("message", ClockTransportKind::from_repr)?);
        }
        Ok(())
    }

    /// A source built from `record` on top of the defaults
    pub fn from_record(record: &SourceRecord) -> Result<Self> {
        let mut config = Self::default();
        config.apply_record(record)?;
        config.mark_clean();
        Ok(config)
    }
}

/// Persisted mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRecord {
    #[serde(rename = "type")]
    pub kind: EnumValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_source_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_source_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_target_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_target_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_out_of_range_source_values_is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_target_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_target_jump: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_target_jump: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eel_control_transformation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eel_feedback_transformation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_step_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_step_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_is_enabled: Option<bool>,
}

impl ModeConfig {
    /// Persisted form of this mode
    pub fn to_record(&self, style: EnumStyle) -> ModeRecord {
        let kind = self.kind();
        let jump = self.supports_target_jump();
        let step = self.supports_step_size();
        ModeRecord {
            kind: EnumValue::encode(kind as u8, kind.name(), style),
            min_source_value: Some(self.source_range().min()),
            max_source_value: Some(self.source_range().max()),
            min_target_value: Some(self.target_range().min()),
            max_target_value: Some(self.target_range().max()),
            reverse_is_enabled: self.supports_reverse().then(|| self.reverse()),
            ignore_out_of_range_source_values_is_enabled: self
                .supports_ignore_out_of_range()
                .then(|| self.ignore_out_of_range()),
            round_target_value: self
                .supports_round_target_value()
                .then(|| self.round_target_value()),
            scale_mode_enabled: self.supports_scale_mode().then(|| self.scale_mode()),
            min_target_jump: jump.then(|| self.target_jump().min()),
            max_target_jump: jump.then(|| self.target_jump().max()),
            eel_control_transformation: self
                .supports_control_transform()
                .then(|| self.control_transform().to_string()),
            eel_feedback_transformation: self
                .supports_feedback_transform()
                .then(|| self.feedback_transform().to_string()),
            min_step_size: step.then(|| self.step_size().min()),
            max_step_size: step.then(|| self.step_size().max()),
            rotate_is_enabled: self.supports_rotate().then(|| self.rotate()),
        }
    }

    /// Apply the fields present in `record`
    pub fn apply_record(&mut self, record: &ModeRecord) -> Result<()> {
        self.set_kind(record.kind.decode("type", ModeKind::from_repr)?);
        // Max before min, so a stored [a, b] survives the bound dragging
        // no matter what the current range is
        if let Some(max) = record.max_source_value {
            self.set_max_source_value(max);
        }
        if let Some(min) = record.min_source_value {
            self.set_min_source_value(min);
        }
        if let Some(max) = record.max_target_value {
            self.set_max_target_value(max);
        }
        if let Some(min) = record.min_target_value {
            self.set_min_target_value(min);
        }
        if let Some(max) = record.max_target_jump {
            self.set_max_target_jump(max);
        }
        if let Some(min) = record.min_target_jump {
            self.set_min_target_jump(min);
        }
        if let Some(max) = record.max_step_size {
            self.set_max_step_size(max);
        }
        if let Some(min) = record.min_step_size {
            self.set_min_step_size(min);
        }
        if let Some(reverse) = record.reverse_is_enabled {
            self.set_reverse(reverse);
        }
        if let Some(ignore) = record.ignore_out_of_range_source_values_is_enabled {
            self.set_ignore_out_of_range(ignore);
        }
        if let Some(round) = record.round_target_value {
            self.set_round_target_value(round);
        }
        if let Some(scale_mode) = record.scale_mode_enabled {
            self.set_scale_mode(scale_mode);
        }
        if let Some(text) = &record.eel_control_transformation {
            self.set_control_transform(text.as_str());
        }
        if let Some(text) = &record.eel_feedback_transformation {
            self.set_feedback_transform(text.as_str());
        }
        if let Some(rotate) = record.rotate_is_enabled {
            self.set_rotate(rotate);
        }
        Ok(())
    }

    /// A mode built from `record` on top of the defaults
    pub fn from_record(record: &ModeRecord) -> Result<Self> {
        let mut config = Self::default();
        config.apply_record(record)?;
        config.mark_clean();
        Ok(config)
    }
}
