//! Crop yield advisor.
//!
//! Combines three independently trained tabular models:
//! - a yield regressor over farm metadata and crop,
//! - a fertilizer classifier over soil readings and crop,
//! - a crop classifier over raw soil/weather readings,
//!
//! and reports the farmer's selected crop side by side with the crop the
//! recommendation model suggests, each with its recommended fertilizer and
//! fertilizer-adjusted yield.

pub mod advisor;
pub mod artifact;
pub mod batch;
pub mod config;
pub mod encoding;
pub mod error;
pub mod features;
pub mod gain;
pub mod model;
pub mod prompt;
pub mod report;

pub use advisor::{Advisor, FarmMetadata, FieldRequest, ModelSet, PredictionReport, SoilWeatherReading};
pub use config::{AdvisorConfig, ForestAdvisor};
pub use encoding::{EncoderSet, LabelEncoder, UNSEEN_CODE};
pub use error::AdvisorError;
pub use gain::{FertGainTable, DEFAULT_FERT_GAIN};
pub use model::{Classifier, ForestClassifier, ForestRegressor, Regressor, Tree};
