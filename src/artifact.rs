//! Reading persisted training artifacts.
//!
//! `.json` files are parsed as JSON, anything else as bincode.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Bincode,
}

impl Format {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Bincode,
        }
    }
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading artifact {}", path.display()))?;
    let value = match Format::of(path) {
        Format::Json => serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing JSON artifact {}", path.display()))?,
        Format::Bincode => bincode::deserialize(&bytes)
            .with_context(|| format!("decoding bincode artifact {}", path.display()))?,
    };
    Ok(value)
}
