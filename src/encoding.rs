//! Categorical label encoding.
//!
//! Each trained model ships one encoder per categorical feature. An encoder is the
//! ordered class list learned at training time; a label's code is its position in
//! that list. Lookups are case-insensitive and never fail: a label outside the
//! vocabulary maps to [`UNSEEN_CODE`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Code substituted for labels that were never seen during training.
pub const UNSEEN_CODE: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl From<Vec<String>> for LabelEncoder {
    fn from(classes: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            // First occurrence keeps the code when two classes differ only by case.
            index.entry(class.to_lowercase()).or_insert(code);
        }
        Self { classes, index }
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(encoder: LabelEncoder) -> Self {
        encoder.classes
    }
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from(classes.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    /// Code of `label`, or `None` when the label is outside the vocabulary.
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.index.get(&label.to_lowercase()).copied()
    }

    /// Label for `code`, exactly as it was stored at training time.
    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(AdvisorError::UnknownClass {
                index: code,
                classes: self.classes.len(),
            })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Encoders for one model, keyed by the feature name used at training time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderSet {
    fields: HashMap<String, LabelEncoder>,
}

impl EncoderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: impl Into<String>, encoder: LabelEncoder) -> Self {
        self.fields.insert(field.into(), encoder);
        self
    }

    pub fn field(&self, field: &str) -> Option<&LabelEncoder> {
        self.fields.get(field)
    }

    /// Integer code for `raw` under `field`, or [`UNSEEN_CODE`] on any lookup miss.
    pub fn encode(&self, field: &str, raw: &str) -> i64 {
        match self.field(field).and_then(|enc| enc.transform(raw)) {
            Some(code) => code as i64,
            None => {
                log::debug!("'{}' unseen for {}; encoding as {}", raw, field, UNSEEN_CODE);
                UNSEEN_CODE
            }
        }
    }

    /// Fails with [`AdvisorError::MissingEncoder`] unless every named field is present.
    pub fn require(&self, fields: &[&str]) -> Result<()> {
        match fields.iter().find(|f| !self.fields.contains_key(**f)) {
            Some(missing) => Err(AdvisorError::MissingEncoder(missing.to_string())),
            None => Ok(()),
        }
    }

    pub fn field_sizes(&self) -> Vec<(&str, usize)> {
        let mut sizes: Vec<_> = self
            .fields
            .iter()
            .map(|(name, enc)| (name.as_str(), enc.len()))
            .collect();
        sizes.sort_unstable();
        sizes
    }
}
