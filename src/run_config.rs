//! File-backed run configuration.
//!
//! A run is described by a JSON file naming the entity class, its allow-list,
//! the raw input files in chronological order, the local date range, and the
//! database path. One run covers exactly one entity class; classes
//! reconstruct from different files and share no state, so they run as
//! separate invocations.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::EntityClass;
use crate::decode::{LineDecoder, PhaseDecoder, PresenceDecoder, PHASE_FIELD_COUNT};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub entity_class: EntityClass,
    /// Entity ids to reconstruct; everything else in the raw stream is dropped.
    pub allow_list: Vec<String>,
    /// Phase class only: ids for the 16 code fields, index-aligned.
    #[serde(default)]
    pub phase_ids: Vec<String>,
    /// Literal tag token identifying phase-controller lines.
    #[serde(default = "default_phase_tag")]
    pub phase_tag: String,
    /// Raw log files, in chronological order.
    pub input_files: Vec<PathBuf>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub db_path: PathBuf,
}

fn default_phase_tag() -> String {
    "PHASE".to_string()
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read run config from {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse run config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            bail!(
                "start date {} is after end date {}",
                self.start_date,
                self.end_date
            );
        }
        if self.input_files.is_empty() {
            bail!("run config names no input files");
        }
        if self.allow_list.is_empty() {
            bail!("run config has an empty allow-list");
        }
        if self.entity_class == EntityClass::Phase && self.phase_ids.len() != PHASE_FIELD_COUNT {
            bail!(
                "phase runs need {} phase ids, got {}",
                PHASE_FIELD_COUNT,
                self.phase_ids.len()
            );
        }
        Ok(())
    }

    /// Line decoder matching this run's entity class.
    pub fn decoder(&self) -> Result<LineDecoder> {
        match self.entity_class {
            EntityClass::Presence => Ok(LineDecoder::Presence(PresenceDecoder)),
            EntityClass::Phase => Ok(LineDecoder::Phase(PhaseDecoder::new(
                self.phase_tag.clone(),
                self.phase_ids.clone(),
            )?)),
        }
    }
}
