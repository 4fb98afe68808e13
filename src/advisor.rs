//! Chains the yield, fertilizer and crop models into one comparative report.

use serde::{Deserialize, Serialize};

use crate::encoding::{EncoderSet, LabelEncoder};
use crate::error::{AdvisorError, Result};
use crate::features::{CropFeatures, FertilizerFeatures, YieldFeatures};
use crate::gain::FertGainTable;
use crate::model::{Classifier, Regressor};

/// Raw yield-model output is multiplied by this to give kg/ha.
pub const YIELD_SCALE_FACTOR: f64 = 100.0;

pub const STATE_FIELD: &str = "state_name";
pub const DISTRICT_FIELD: &str = "district_name";
pub const SEASON_FIELD: &str = "season";
pub const CROP_FIELD: &str = "crop";

pub const SOIL_TYPE_FIELD: &str = "Soil Type";
pub const CROP_TYPE_FIELD: &str = "Crop Type";
pub const FERTILIZER_FIELD: &str = "Fertilizer Name";

pub const YIELD_FIELDS: [&str; 4] = [STATE_FIELD, DISTRICT_FIELD, SEASON_FIELD, CROP_FIELD];
pub const FERTILIZER_FIELDS: [&str; 3] = [SOIL_TYPE_FIELD, CROP_TYPE_FIELD, FERTILIZER_FIELD];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmMetadata {
    pub state: String,
    pub district: String,
    pub crop_year: i32,
    pub season: String,
    /// Hectares.
    pub area: f64,
}

impl FarmMetadata {
    fn normalized(&self) -> Self {
        Self {
            state: self.state.to_lowercase(),
            district: self.district.to_lowercase(),
            crop_year: self.crop_year,
            season: self.season.to_lowercase(),
            area: self.area,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilWeatherReading {
    pub n: i32,
    pub p: i32,
    pub k: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
    pub soil_moisture: f64,
    pub soil_type: String,
}

impl SoilWeatherReading {
    fn crop_features(&self) -> CropFeatures {
        CropFeatures {
            nitrogen: self.n,
            phosphorus: self.p,
            potassium: self.k,
            temperature: self.temperature,
            humidity: self.humidity,
            ph: self.ph,
            rainfall: self.rainfall,
        }
    }

    fn fertilizer_features(&self, soil_type: i64, crop_type: i64) -> FertilizerFeatures {
        FertilizerFeatures {
            temperature: self.temperature,
            humidity: self.humidity,
            soil_moisture: self.soil_moisture,
            soil_type,
            crop_type,
            nitrogen: self.n,
            potassium: self.k,
            phosphorus: self.p,
        }
    }
}

/// Everything one prediction needs, as gathered by a front end.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub farm: FarmMetadata,
    pub soil: SoilWeatherReading,
    pub crop: String,
}

/// Selected crop versus the suggested alternative. Yields are kg/ha, gains are
/// percentages, every number is rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub selected_crop: String,
    pub sel_yield: f64,
    pub fert_name_sel: String,
    pub fert_gain_sel: f64,
    pub final_yield_sel: f64,
    pub alt_crop: String,
    pub alt_yield: f64,
    pub fert_name_alt: String,
    pub fert_gain_alt: f64,
    pub final_yield_alt: f64,
    pub diff_pct_alt: f64,
}

/// Unrounded outcome for one crop on one farm.
#[derive(Debug, Clone, PartialEq)]
struct CropAssessment {
    crop: String,
    base_yield: f64,
    fertilizer: String,
    gain: f64,
    final_yield: f64,
}

/// Percentage by which `alternative` beats `selected`; 0 unless `selected` is positive.
pub fn comparison_pct(selected: f64, alternative: f64) -> f64 {
    if selected > 0.0 {
        (alternative - selected) / selected * 100.0
    } else {
        0.0
    }
}

/// Two-decimal rounding of the exact binary value, exact ties going to the even digit.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// First character uppercased, the rest lowercased.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// The three trained models and the encoders each was trained with.
pub struct ModelSet<Y, F, C> {
    pub yield_model: Y,
    pub yield_encoders: EncoderSet,
    pub fertilizer_model: F,
    pub fertilizer_encoders: EncoderSet,
    pub crop_model: C,
    pub crop_labels: LabelEncoder,
}

/// Read-only after construction; `predict` keeps no state between calls.
pub struct Advisor<Y, F, C> {
    models: ModelSet<Y, F, C>,
    gains: FertGainTable,
    yield_scale: f64,
}

impl<Y, F, C> Advisor<Y, F, C>
where
    Y: Regressor,
    F: Classifier,
    C: Classifier,
{
    pub fn new(models: ModelSet<Y, F, C>, gains: FertGainTable) -> Self {
        Self {
            models,
            gains,
            yield_scale: YIELD_SCALE_FACTOR,
        }
    }

    pub fn with_yield_scale(mut self, yield_scale: f64) -> Self {
        self.yield_scale = yield_scale;
        self
    }

    pub fn models(&self) -> &ModelSet<Y, F, C> {
        &self.models
    }

    pub fn gains(&self) -> &FertGainTable {
        &self.gains
    }

    pub fn predict(
        &self,
        farm: &FarmMetadata,
        soil: &SoilWeatherReading,
        selected_crop: &str,
    ) -> Result<PredictionReport> {
        let farm = farm.normalized();
        let selected_crop = selected_crop.to_lowercase();
        let soil_type = self
            .models
            .fertilizer_encoders
            .encode(SOIL_TYPE_FIELD, &soil.soil_type.to_lowercase());

        let selected = self.assess(&farm, soil, soil_type, &selected_crop)?;
        let alt_crop = self.suggest_crop(soil)?;
        let alternative = self.assess(&farm, soil, soil_type, &alt_crop)?;
        let diff_pct = comparison_pct(selected.final_yield, alternative.final_yield);

        log::debug!(
            "{} -> {:.2} kg/ha, alternative {} -> {:.2} kg/ha ({:+.2}%)",
            selected.crop,
            selected.final_yield,
            alternative.crop,
            alternative.final_yield,
            diff_pct
        );

        Ok(PredictionReport {
            selected_crop: capitalize(&selected.crop),
            sel_yield: round2(selected.base_yield),
            fert_name_sel: selected.fertilizer,
            fert_gain_sel: round2(selected.gain * 100.0),
            final_yield_sel: round2(selected.final_yield),
            alt_crop: capitalize(&alternative.crop),
            alt_yield: round2(alternative.base_yield),
            fert_name_alt: alternative.fertilizer,
            fert_gain_alt: round2(alternative.gain * 100.0),
            final_yield_alt: round2(alternative.final_yield),
            diff_pct_alt: round2(diff_pct),
        })
    }

    /// Base yield, fertilizer and adjusted yield of `crop`; expects lowercase inputs.
    fn assess(
        &self,
        farm: &FarmMetadata,
        soil: &SoilWeatherReading,
        soil_type: i64,
        crop: &str,
    ) -> Result<CropAssessment> {
        let base_yield = self.base_yield(farm, crop)?;

        let crop_type = self.models.fertilizer_encoders.encode(CROP_TYPE_FIELD, crop);
        let features = soil.fertilizer_features(soil_type, crop_type);
        let fert_code = self.models.fertilizer_model.classify(&features.to_row())?;
        let fertilizer = self
            .models
            .fertilizer_encoders
            .field(FERTILIZER_FIELD)
            .ok_or_else(|| AdvisorError::MissingEncoder(FERTILIZER_FIELD.to_string()))?
            .inverse_transform(fert_code)?
            .to_string();

        let gain = self.gains.gain_for(crop, &fertilizer);
        log::debug!(
            "{}: base {:.3} kg/ha, fertilizer {} (code {}), gain {:.3}",
            crop,
            base_yield,
            fertilizer,
            fert_code,
            gain
        );
        Ok(CropAssessment {
            crop: crop.to_string(),
            base_yield,
            fertilizer,
            gain,
            final_yield: base_yield * (1.0 + gain),
        })
    }

    fn base_yield(&self, farm: &FarmMetadata, crop: &str) -> Result<f64> {
        let enc = &self.models.yield_encoders;
        let features = YieldFeatures {
            state: enc.encode(STATE_FIELD, &farm.state),
            district: enc.encode(DISTRICT_FIELD, &farm.district),
            crop_year: farm.crop_year,
            season: enc.encode(SEASON_FIELD, &farm.season),
            crop: enc.encode(CROP_FIELD, crop),
            area: farm.area,
        };
        let raw = self.models.yield_model.regress(&features.to_row())?;
        Ok(raw * self.yield_scale)
    }

    /// Crop the recommendation model favours for these readings, lowercased.
    fn suggest_crop(&self, soil: &SoilWeatherReading) -> Result<String> {
        let code = self
            .models
            .crop_model
            .classify(&soil.crop_features().to_row())?;
        Ok(self.models.crop_labels.inverse_transform(code)?.to_lowercase())
    }
}
