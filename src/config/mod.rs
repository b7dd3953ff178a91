//! Configuration loading and validation
//!
//! Mapping files are YAML or JSON, picked by file extension.

mod record;
mod schema;

pub use record::{EnumStyle, EnumValue, ModeRecord, SourceRecord, ANY};
pub use schema::{MappingEntry, MappingFile};

use std::path::Path;

use crate::error::Result;

/// Example mapping file, printed by `ctlmap init`
pub const EXAMPLE_CONFIG: &str = r#"# ctlmap mapping file
mappings:
  - name: volume
    source:
      type: ControlChangeValue
      channel: 0
      number: 7
      character: Range
      is14Bit: false
    mode:
      type: Absolute
      minSourceValue: 0.0
      maxSourceValue: 1.0
      minTargetValue: 0.0
      maxTargetValue: 0.8
      minTargetJump: 0.0
      maxTargetJump: 1.0

  - name: pan
    source:
      type: ControlChangeValue
      channel: 0
      number: 10
      character: Encoder1
    mode:
      type: Relative
      minSourceValue: 0.0
      maxSourceValue: 1.0
      minTargetValue: 0.0
      maxTargetValue: 1.0
      minStepSize: 0.01
      maxStepSize: 0.05

  - name: mute
    source:
      type: NoteVelocity
      channel: 9
      number: 36
    mode:
      type: Toggle
      minSourceValue: 0.0
      maxSourceValue: 1.0
      minTargetValue: 0.0
      maxTargetValue: 1.0

learn:
  burstSize: 10
  maxWaitMs: 250
  firstMessageSetsAgenda: true
"#;

/// Whether `path` names a JSON file
fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Parse mapping file content, JSON if `json` is set, YAML otherwise
pub fn parse_config(contents: &str, json: bool) -> Result<MappingFile> {
    let config: MappingFile = if json {
        serde_json::from_str(contents)?
    } else {
        serde_yaml::from_str(contents)?
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a YAML or JSON file
pub fn load_config(path: &Path) -> Result<MappingFile> {
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents, is_json(path))?;
    tracing::debug!(path = %path.display(), mappings = config.mappings.len(), "config loaded");
    Ok(config)
}
