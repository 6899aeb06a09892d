//! Wound-stage guidance table.
//!
//! The per-stage probabilities are fixed demo data with no lifecycle: the
//! table is parsed once at startup and read-only afterwards. Nothing in
//! the app infers these values from images.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Probabilities must sum to 1 within this tolerance.
const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Deserialize)]
pub struct Stage {
    pub name: String,
    pub probability: f64,
    pub guidance: String,
}

/// Immutable per-stage probability and guidance table.
#[derive(Debug, Clone, Deserialize)]
pub struct StageGuide {
    #[serde(rename = "stage")]
    pub stages: Vec<Stage>,
}

impl StageGuide {
    /// Built-in demo table.
    pub fn builtin() -> Result<Self> {
        Self::parse(include_str!("../../config/stages.toml"))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read stage table")?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        let guide: StageGuide = toml::from_str(content).context("Failed to parse stage table")?;
        guide.validate()?;
        Ok(guide)
    }

    fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            anyhow::bail!("stage table is empty");
        }
        for stage in &self.stages {
            if !(0.0..=1.0).contains(&stage.probability) {
                anyhow::bail!(
                    "stage '{}' has probability {} outside [0, 1]",
                    stage.name,
                    stage.probability
                );
            }
        }
        let total: f64 = self.stages.iter().map(|s| s.probability).sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            anyhow::bail!("stage probabilities sum to {}, expected 1", total);
        }
        Ok(())
    }

    /// The most likely stage.
    pub fn top(&self) -> Option<&Stage> {
        self.stages
            .iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
    }
}
