//! Feature rows for the three models.
//!
//! Each model was trained on its own column order, so each gets its own builder.

/// Yield regressor input: state, district, crop_year, season, crop, area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldFeatures {
    pub state: i64,
    pub district: i64,
    pub crop_year: i32,
    pub season: i64,
    pub crop: i64,
    pub area: f64,
}

impl YieldFeatures {
    pub const WIDTH: usize = 6;

    pub fn to_row(&self) -> [f64; Self::WIDTH] {
        [
            self.state as f64,
            self.district as f64,
            self.crop_year as f64,
            self.season as f64,
            self.crop as f64,
            self.area,
        ]
    }
}

/// Fertilizer classifier input: temperature, humidity, soil moisture, soil type,
/// crop type, N, K, P.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FertilizerFeatures {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub soil_type: i64,
    pub crop_type: i64,
    pub nitrogen: i32,
    pub potassium: i32,
    pub phosphorus: i32,
}

impl FertilizerFeatures {
    pub const WIDTH: usize = 8;

    pub fn to_row(&self) -> [f64; Self::WIDTH] {
        [
            self.temperature,
            self.humidity,
            self.soil_moisture,
            self.soil_type as f64,
            self.crop_type as f64,
            self.nitrogen as f64,
            self.potassium as f64,
            self.phosphorus as f64,
        ]
    }
}

/// Crop classifier input, raw readings only: N, P, K, temperature, humidity, ph, rainfall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropFeatures {
    pub nitrogen: i32,
    pub phosphorus: i32,
    pub potassium: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl CropFeatures {
    pub const WIDTH: usize = 7;

    pub fn to_row(&self) -> [f64; Self::WIDTH] {
        [
            self.nitrogen as f64,
            self.phosphorus as f64,
            self.potassium as f64,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}
