//! Interactive console questionnaire producing a [`FieldRequest`].

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use crate::advisor::{FarmMetadata, FieldRequest, SoilWeatherReading};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn text(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line).context("reading answer")? == 0 {
            bail!("input ended before '{}' was answered", label);
        }
        Ok(line.trim().to_string())
    }

    pub fn number<T>(&mut self, label: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let answer = self.text(label)?;
        answer
            .parse()
            .map_err(|e| anyhow!("{}: '{}' is not a valid number ({})", label, answer, e))
    }

    pub fn field_request(&mut self) -> Result<FieldRequest> {
        writeln!(self.output, "Enter Farmer Details")?;
        let farm = FarmMetadata {
            state: self.text("Enter State")?,
            district: self.text("Enter District")?,
            crop_year: self.number("Enter Crop Year (e.g. 2024)")?,
            season: self.text("Enter Season (e.g. Kharif, Rabi)")?,
            area: self.number("Enter Area (ha)")?,
        };

        writeln!(self.output)?;
        writeln!(self.output, "Enter Soil & Weather Details")?;
        let n = self.number("Enter Nitrogen (N)")?;
        let p = self.number("Enter Phosphorus (P)")?;
        let k = self.number("Enter Potassium (K)")?;
        let temperature = self.number("Enter Temperature (°C)")?;
        let humidity = self.number("Enter Humidity (%)")?;
        let ph = self.number("Enter Soil pH")?;
        let rainfall = self.number("Enter Rainfall (mm)")?;
        let soil_type = self.text("Enter Soil Type (e.g. Sandy, Clay)")?;
        let soil_moisture = self.number("Enter Soil Moisture (%)")?;
        let soil = SoilWeatherReading {
            n,
            p,
            k,
            temperature,
            humidity,
            ph,
            rainfall,
            soil_moisture,
            soil_type,
        };

        writeln!(self.output)?;
        let crop = self.text("Enter the crop you want to grow")?;
        Ok(FieldRequest { farm, soil, crop })
    }
}
