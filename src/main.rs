//! Crop advisor CLI
//! - `predict`: one farm described by flags
//! - `ask`: the same questions answered interactively
//! - `batch`: a CSV of farms scored row by row
//! - `check`: validate every configured artifact and exit

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;
use crop_advisor::prompt::Prompter;
use crop_advisor::report::ConsoleReport;
use crop_advisor::{batch, AdvisorConfig, FarmMetadata, FieldRequest, PredictionReport, SoilWeatherReading};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "crop_advisor")]
struct Cli {
    /// Path to config file
    #[structopt(short, long, default_value = "advisor.toml")]
    config: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Compare a selected crop with the suggested alternative for one farm
    Predict(PredictArgs),
    /// Prompt for every field on the console
    Ask {
        /// Print the report as JSON
        #[structopt(long)]
        json: bool,
    },
    /// Score every row of a CSV file
    Batch {
        #[structopt(long, parse(from_os_str))]
        input: PathBuf,
        #[structopt(long, parse(from_os_str))]
        output: PathBuf,
    },
    /// Load and validate all configured artifacts
    Check,
}

#[derive(StructOpt, Debug)]
struct PredictArgs {
    #[structopt(long)]
    state: String,
    #[structopt(long)]
    district: String,
    /// Defaults to the current year
    #[structopt(long)]
    crop_year: Option<i32>,
    #[structopt(long)]
    season: String,
    /// Cultivated area in hectares
    #[structopt(long)]
    area: f64,
    /// Nitrogen
    #[structopt(long)]
    n: i32,
    /// Phosphorus
    #[structopt(long)]
    p: i32,
    /// Potassium
    #[structopt(long)]
    k: i32,
    /// Degrees Celsius
    #[structopt(long, allow_hyphen_values = true)]
    temperature: f64,
    /// Relative humidity (%)
    #[structopt(long)]
    humidity: f64,
    #[structopt(long)]
    ph: f64,
    /// Millimetres
    #[structopt(long)]
    rainfall: f64,
    #[structopt(long)]
    soil_type: String,
    /// Soil moisture (%)
    #[structopt(long)]
    soil_moisture: f64,
    /// Crop the farmer wants to grow
    #[structopt(long)]
    crop: String,
    /// Print the report as JSON
    #[structopt(long)]
    json: bool,
}

impl PredictArgs {
    fn into_request(self) -> FieldRequest {
        let crop_year = self
            .crop_year
            .unwrap_or_else(|| chrono::Local::now().year());
        FieldRequest {
            farm: FarmMetadata {
                state: self.state,
                district: self.district,
                crop_year,
                season: self.season,
                area: self.area,
            },
            soil: SoilWeatherReading {
                n: self.n,
                p: self.p,
                k: self.k,
                temperature: self.temperature,
                humidity: self.humidity,
                ph: self.ph,
                rainfall: self.rainfall,
                soil_moisture: self.soil_moisture,
                soil_type: self.soil_type,
            },
            crop: self.crop,
        }
    }
}

fn emit(report: &PredictionReport, season: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", ConsoleReport::new(report, season));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::from_args();
    let cfg = AdvisorConfig::from_file(&args.config)?;
    let advisor = cfg.load_advisor()?;

    match args.cmd {
        Command::Predict(predict) => {
            let json = predict.json;
            let req = predict.into_request();
            let report = advisor.predict(&req.farm, &req.soil, &req.crop)?;
            emit(&report, &req.farm.season, json)?;
        }
        Command::Ask { json } => {
            let stdin = io::stdin();
            let req = Prompter::new(stdin.lock(), io::stdout()).field_request()?;
            let report = advisor.predict(&req.farm, &req.soil, &req.crop)?;
            println!();
            emit(&report, &req.farm.season, json)?;
        }
        Command::Batch { input, output } => {
            let reader = File::open(&input)
                .with_context(|| format!("opening {}", input.display()))?;
            let writer = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            let scored = batch::score(&advisor, BufReader::new(reader), BufWriter::new(writer))?;
            log::info!("Wrote {} reports to {}", scored, output.display());
        }
        Command::Check => {
            let models = advisor.models();
            log::info!(
                "yield model: {} trees; fertilizer model: {} trees, {} classes; crop model: {} trees, {} classes",
                models.yield_model.n_trees(),
                models.fertilizer_model.n_trees(),
                models.fertilizer_model.classes().len(),
                models.crop_model.n_trees(),
                models.crop_model.classes().len()
            );
            log::info!(
                "gain table: {} crops, default gain {}",
                advisor.gains().crop_count(),
                advisor.gains().default_gain()
            );
            println!("All artifacts in {} loaded", args.config);
        }
    }
    Ok(())
}
