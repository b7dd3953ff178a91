//! Mapping file schema

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::record::{ModeRecord, SourceRecord};
use crate::error::{CtlmapError, Result};
use crate::learn::LearnSettings;
use crate::mapping::{Mapping, ModeConfig};
use crate::source::SourceConfig;

/// Top-level content of a mapping file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingFile {
    /// Controller mappings
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,

    /// Source learning settings
    #[serde(default)]
    pub learn: LearnSettings,
}

/// One named mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Unique name of this mapping
    pub name: String,
    pub source: SourceRecord,
    pub mode: ModeRecord,
}

impl MappingEntry {
    /// Decode the records into a live mapping
    pub fn to_mapping(&self) -> Result<Mapping> {
        let source = SourceConfig::from_record(&self.source)?;
        let mode = ModeConfig::from_record(&self.mode)?;
        Ok(Mapping::new(self.name.clone(), source, mode))
    }
}

impl MappingFile {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for entry in &self.mappings {
            if entry.name.trim().is_empty() {
                return Err(CtlmapError::Validation(
                    "mapping names must not be empty".to_string(),
                ));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(CtlmapError::Validation(format!(
                    "duplicate mapping name '{}'",
                    entry.name
                )));
            }
            // Enum fields must decode
            entry.to_mapping()?;
        }
        if self.learn.burst_size == 0 {
            return Err(CtlmapError::Validation(
                "learn.burstSize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// All mappings, decoded
    pub fn build_mappings(&self) -> Result<Vec<Mapping>> {
        self.mappings.iter().map(MappingEntry::to_mapping).collect()
    }

    /// Look up a mapping by name
    pub fn find(&self, name: &str) -> Option<&MappingEntry> {
        self.mappings.iter().find(|m| m.name == name)
    }
}
