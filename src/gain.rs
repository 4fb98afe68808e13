use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Yield uplift assumed for any (crop, fertilizer) pair the table does not list.
pub const DEFAULT_FERT_GAIN: f64 = 0.10;

/// Expected yield-gain fraction per crop and fertilizer.
///
/// Keys are stored lowercase; lookups lowercase both inputs.
#[derive(Debug, Clone)]
pub struct FertGainTable {
    gains: HashMap<String, HashMap<String, f64>>,
    default_gain: f64,
}

impl Default for FertGainTable {
    fn default() -> Self {
        Self {
            gains: HashMap::new(),
            default_gain: DEFAULT_FERT_GAIN,
        }
    }
}

impl FertGainTable {
    /// Keys that collide once lowercased merge; on a clash the entry whose key was
    /// already lowercase wins, then the lexically greatest spelling.
    pub fn new(gains: HashMap<String, HashMap<String, f64>>) -> Self {
        let mut merged: HashMap<String, HashMap<String, f64>> = HashMap::new();
        let mut entries = Vec::new();
        for (crop, ferts) in gains {
            merged.entry(crop.to_lowercase()).or_default();
            for (fert, gain) in ferts {
                entries.push((crop.clone(), fert, gain));
            }
        }
        entries.sort_by(|a, b| {
            let rank = |crop: &str, fert: &str| {
                (crop == crop.to_lowercase(), fert == fert.to_lowercase())
            };
            rank(&a.0, &a.1)
                .cmp(&rank(&b.0, &b.1))
                .then_with(|| a.0.cmp(&b.0))
                .then_with(|| a.1.cmp(&b.1))
        });
        for (crop, fert, gain) in entries {
            merged
                .entry(crop.to_lowercase())
                .or_default()
                .insert(fert.to_lowercase(), gain);
        }
        Self {
            gains: merged,
            default_gain: DEFAULT_FERT_GAIN,
        }
    }

    pub fn with_default_gain(mut self, default_gain: f64) -> Self {
        self.default_gain = default_gain;
        self
    }

    /// Reads a `{crop: {fertilizer: fraction}}` JSON document. A missing file yields
    /// an empty table, so every lookup falls back to the default gain.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let raw: HashMap<String, HashMap<String, f64>> = serde_json::from_str(&text)
                    .with_context(|| format!("parsing gain table {}", path.display()))?;
                let table = Self::new(raw);
                log::info!(
                    "Loaded fertilizer gain table from {} ({} crops)",
                    path.display(),
                    table.gains.len()
                );
                Ok(table)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "Gain table '{}' not found. Every fertilizer assumes the default gain.",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("reading gain table {}", path.display())),
        }
    }

    pub fn gain_for(&self, crop: &str, fertilizer: &str) -> f64 {
        self.gains
            .get(&crop.to_lowercase())
            .and_then(|ferts| ferts.get(&fertilizer.to_lowercase()))
            .copied()
            .unwrap_or(self.default_gain)
    }

    pub fn default_gain(&self) -> f64 {
        self.default_gain
    }

    pub fn crop_count(&self) -> usize {
        self.gains.len()
    }
}
