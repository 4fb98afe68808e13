use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::advisor::{Advisor, ModelSet, FERTILIZER_FIELDS, YIELD_FIELDS, YIELD_SCALE_FACTOR};
use crate::artifact;
use crate::encoding::{EncoderSet, LabelEncoder};
use crate::gain::{FertGainTable, DEFAULT_FERT_GAIN};
use crate::model::{ForestClassifier, ForestRegressor};

pub type ForestAdvisor = Advisor<ForestRegressor, ForestClassifier, ForestClassifier>;

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
    /// Base directory for every relative artifact path below. Defaults to the
    /// directory holding the config file.
    #[serde(default)]
    pub root: Option<PathBuf>,
    pub yield_model: PathBuf,
    pub yield_encoders: PathBuf,
    pub fertilizer_model: PathBuf,
    pub fertilizer_encoders: PathBuf,
    pub crop_model: PathBuf,
    pub crop_labels: PathBuf,
    /// Optional `{crop: {fertilizer: fraction}}` JSON table.
    #[serde(default)]
    pub fert_gain_table: Option<PathBuf>,
    /// Gain fraction for pairs the table does not list. Defaults to 0.10
    #[serde(default)]
    pub default_fert_gain: Option<f64>,
    /// Multiplier turning raw yield-model output into kg/ha. Defaults to 100.0
    #[serde(default)]
    pub yield_scale_factor: Option<f64>,
}

impl AdvisorConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path))?;
        let mut cfg: Self = toml::from_str(&content).map_err(|e| anyhow!(e))?;
        if cfg.root.is_none() {
            cfg.root = Path::new(path).parent().map(Path::to_path_buf);
        }
        Ok(cfg)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn default_fert_gain(&self) -> f64 {
        self.default_fert_gain.unwrap_or(DEFAULT_FERT_GAIN)
    }

    pub fn yield_scale_factor(&self) -> f64 {
        self.yield_scale_factor.unwrap_or(YIELD_SCALE_FACTOR)
    }

    /// Loads every configured artifact. Any missing or malformed required artifact
    /// is fatal; only the gain table may be absent.
    pub fn load_advisor(&self) -> Result<ForestAdvisor> {
        let yield_encoders: EncoderSet = artifact::load(&self.resolve(&self.yield_encoders))?;
        yield_encoders
            .require(&YIELD_FIELDS)
            .context("yield encoders")?;
        let fertilizer_encoders: EncoderSet =
            artifact::load(&self.resolve(&self.fertilizer_encoders))?;
        fertilizer_encoders
            .require(&FERTILIZER_FIELDS)
            .context("fertilizer encoders")?;
        let crop_labels: LabelEncoder = artifact::load(&self.resolve(&self.crop_labels))?;

        for (name, set) in [("yield", &yield_encoders), ("fertilizer", &fertilizer_encoders)] {
            for (field, size) in set.field_sizes() {
                log::info!("{} encoder '{}': {} labels", name, field, size);
            }
        }
        log::info!("crop label encoder: {} labels", crop_labels.len());

        let models = ModelSet {
            yield_model: ForestRegressor::load(&self.resolve(&self.yield_model))?,
            yield_encoders,
            fertilizer_model: ForestClassifier::load(&self.resolve(&self.fertilizer_model))?,
            fertilizer_encoders,
            crop_model: ForestClassifier::load(&self.resolve(&self.crop_model))?,
            crop_labels,
        };

        let gains = match &self.fert_gain_table {
            Some(path) => FertGainTable::load(&self.resolve(path))?,
            None => {
                log::warn!("No gain table configured. Every fertilizer assumes the default gain.");
                FertGainTable::default()
            }
        }
        .with_default_gain(self.default_fert_gain());

        Ok(Advisor::new(models, gains).with_yield_scale(self.yield_scale_factor()))
    }
}
