//! CSV batch scoring: one input row per farm, one report row out.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::advisor::{Advisor, FarmMetadata, FieldRequest, SoilWeatherReading};
use crate::model::{Classifier, Regressor};

#[derive(Debug, Deserialize)]
struct BatchRow {
    state: String,
    district: String,
    crop_year: i32,
    season: String,
    area: f64,
    n: i32,
    p: i32,
    k: i32,
    temperature: f64,
    humidity: f64,
    ph: f64,
    rainfall: f64,
    soil_type: String,
    soil_moisture: f64,
    crop: String,
}

impl From<BatchRow> for FieldRequest {
    fn from(row: BatchRow) -> Self {
        FieldRequest {
            farm: FarmMetadata {
                state: row.state,
                district: row.district,
                crop_year: row.crop_year,
                season: row.season,
                area: row.area,
            },
            soil: SoilWeatherReading {
                n: row.n,
                p: row.p,
                k: row.k,
                temperature: row.temperature,
                humidity: row.humidity,
                ph: row.ph,
                rainfall: row.rainfall,
                soil_moisture: row.soil_moisture,
                soil_type: row.soil_type,
            },
            crop: row.crop,
        }
    }
}

/// Line on which the record starting at `pos` really begins. The reader reports
/// where it started looking, which precedes any blank lines it skipped.
fn record_line(text: &str, pos: &csv::Position) -> u64 {
    let start = (pos.byte() as usize).min(text.len());
    let skipped = text.as_bytes()[start..]
        .iter()
        .take_while(|&&b| b == b'\n' || b == b'\r')
        .filter(|&&b| b == b'\n')
        .count();
    pos.line() + skipped as u64
}

/// Scores every row of `input` and writes the reports to `output`. Returns the
/// number of rows scored.
pub fn score<Y, F, C, R, W>(advisor: &Advisor<Y, F, C>, mut input: R, output: W) -> Result<usize>
where
    Y: Regressor,
    F: Classifier,
    C: Classifier,
    R: Read,
    W: Write,
{
    let mut text = String::new();
    input.read_to_string(&mut text).context("reading batch input")?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut writer = csv::Writer::from_writer(output);
    let headers = reader.headers().context("reading header row")?.clone();
    let mut record = csv::StringRecord::new();
    let mut scored = 0;
    while reader.read_record(&mut record).context("reading input row")? {
        let line = record.position().map_or(0, |pos| record_line(&text, pos));
        let row: BatchRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("parsing row at line {}", line))?;
        let req = FieldRequest::from(row);
        let report = advisor
            .predict(&req.farm, &req.soil, &req.crop)
            .with_context(|| format!("scoring row at line {}", line))?;
        writer.serialize(&report)?;
        scored += 1;
    }
    writer.flush()?;
    log::info!("Scored {} rows", scored);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{ModelSet, CROP_TYPE_FIELD, FERTILIZER_FIELD, SOIL_TYPE_FIELD};
    use crate::encoding::{EncoderSet, LabelEncoder};
    use crate::error;
    use crate::gain::FertGainTable;

    struct Constant(f64);

    impl Regressor for Constant {
        fn regress(&self, _: &[f64]) -> error::Result<f64> {
            Ok(self.0)
        }
    }

    struct Always(usize);

    impl Classifier for Always {
        fn classify(&self, _: &[f64]) -> error::Result<usize> {
            Ok(self.0)
        }
    }

    fn advisor() -> Advisor<Constant, Always, Always> {
        Advisor::new(
            ModelSet {
                yield_model: Constant(12.5),
                yield_encoders: EncoderSet::new(),
                fertilizer_model: Always(0),
                fertilizer_encoders: EncoderSet::new()
                    .with_field(SOIL_TYPE_FIELD, LabelEncoder::new(["Loamy"]))
                    .with_field(CROP_TYPE_FIELD, LabelEncoder::new(["Wheat"]))
                    .with_field(FERTILIZER_FIELD, LabelEncoder::new(["Urea"])),
                crop_model: Always(0),
                crop_labels: LabelEncoder::new(["chickpea"]),
            },
            FertGainTable::default(),
        )
    }

    const HEADER: &str = "state,district,crop_year,season,area,n,p,k,temperature,humidity,ph,rainfall,soil_type,soil_moisture,crop\n";

    #[test]
    fn writes_one_report_per_row() {
        let input = format!(
            "{}Punjab,Ludhiana,2024,Rabi,2.0,80,40,40,22.0,60.0,6.5,100.0,Loamy,30.0,Wheat\n\
             Bihar, Patna ,2023,Kharif,1.5,60,30,20,30.0,80.0,6.8,900.0,Clayey,45.0,Rice\n",
            HEADER
        );
        let mut out = Vec::new();
        let scored = score(&advisor(), input.as_bytes(), &mut out).unwrap();
        assert_eq!(scored, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "selected_crop,sel_yield,fert_name_sel,fert_gain_sel,final_yield_sel,alt_crop,\
             alt_yield,fert_name_alt,fert_gain_alt,final_yield_alt,diff_pct_alt"
        );
        assert_eq!(lines[1], "Wheat,1250.0,Urea,10.0,1375.0,Chickpea,1250.0,Urea,10.0,1375.0,0.0");
        assert!(lines[2].starts_with("Rice,"));
    }

    #[test]
    fn malformed_row_names_its_line() {
        let input = format!(
            "{}Punjab,Ludhiana,2024,Rabi,2.0,80,40,40,22.0,60.0,6.5,100.0,Loamy,30.0,Wheat\n\
             Punjab,Ludhiana,soon,Rabi,2.0,80,40,40,22.0,60.0,6.5,100.0,Loamy,30.0,Wheat\n",
            HEADER
        );
        let err = score(&advisor(), input.as_bytes(), Vec::new()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn blank_lines_count_toward_reported_line() {
        let input = format!(
            "{}Punjab,Ludhiana,2024,Rabi,2.0,80,40,40,22.0,60.0,6.5,100.0,Loamy,30.0,Wheat\n\
             \n\
             Punjab,Ludhiana,soon,Rabi,2.0,80,40,40,22.0,60.0,6.5,100.0,Loamy,30.0,Wheat\n",
            HEADER
        );
        let err = score(&advisor(), input.as_bytes(), Vec::new()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 4"), "{}", msg);
    }

    #[test]
    fn multiline_quoted_field_counts_toward_reported_line() {
        let input = format!(
            "{}Punjab,\"Ludhiana\nEast\",2024,Rabi,2.0,80,40,40,22.0,60.0,6.5,100.0,Loamy,30.0,Wheat\n\
             Punjab,Ludhiana,soon,Rabi,2.0,80,40,40,22.0,60.0,6.5,100.0,Loamy,30.0,Wheat\n",
            HEADER
        );
        let err = score(&advisor(), input.as_bytes(), Vec::new()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 4"), "{}", msg);
    }
}
