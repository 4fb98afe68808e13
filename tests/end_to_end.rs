// End-to-end: artifacts on disk -> config -> advisor -> report.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use crop_advisor::report::ConsoleReport;
use crop_advisor::{
    AdvisorConfig, FarmMetadata, ForestAdvisor, ForestClassifier, ForestRegressor,
    SoilWeatherReading, Tree,
};
use tempfile::TempDir;

const LEAF: i64 = -1;

fn split(feature: i64, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> Tree {
    let root = vec![0.0; left.len()];
    Tree::new(
        vec![1, LEAF, LEAF],
        vec![2, LEAF, LEAF],
        vec![feature, -2, -2],
        vec![threshold, -2.0, -2.0],
        vec![root, left, right],
    )
}

/// Unseen state (code -1) yields 5; otherwise crops coded <= 1 yield 20, wheat 30.
/// A second tree always answers 10, so the forest mean is half the sum.
fn yield_model() -> ForestRegressor {
    let by_state_then_crop = Tree::new(
        vec![1, LEAF, 3, LEAF, LEAF],
        vec![2, LEAF, 4, LEAF, LEAF],
        vec![0, -2, 4, -2, -2],
        vec![-0.5, -2.0, 1.5, -2.0, -2.0],
        vec![vec![0.0], vec![5.0], vec![0.0], vec![20.0], vec![30.0]],
    );
    ForestRegressor::new(6, vec![by_state_then_crop, Tree::leaf(vec![10.0])]).unwrap()
}

/// Wheat gets Urea, everything else DAP.
fn fertilizer_model() -> ForestClassifier {
    ForestClassifier::new(
        8,
        vec![0, 1, 2],
        vec![split(4, 1.5, vec![0.0, 5.0, 1.0], vec![0.0, 0.0, 4.0])],
    )
    .unwrap()
}

/// Up to 150 mm of rain suggests chickpea, more suggests rice.
fn crop_model() -> ForestClassifier {
    ForestClassifier::new(
        7,
        vec![0, 1, 2],
        vec![split(6, 150.0, vec![9.0, 1.0, 0.0], vec![0.0, 1.0, 9.0])],
    )
    .unwrap()
}

fn write_artifacts(dir: &Path, gain_table: bool) {
    fs::create_dir_all(dir.join("models")).unwrap();
    fs::create_dir_all(dir.join("encoders")).unwrap();

    fs::write(
        dir.join("models/yield_model.bin"),
        bincode::serialize(&yield_model()).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join("models/fertilizer_model.json"),
        serde_json::to_vec(&fertilizer_model()).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join("models/crop_model.json"),
        serde_json::to_vec(&crop_model()).unwrap(),
    )
    .unwrap();

    fs::write(
        dir.join("encoders/yield_encoders.json"),
        r#"{
            "state_name": ["haryana", "punjab"],
            "district_name": ["amritsar", "ludhiana"],
            "season": ["kharif", "rabi"],
            "crop": ["maize", "rice", "wheat"]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("encoders/fertilizer_encoders.json"),
        r#"{
            "Soil Type": ["Black", "Clayey", "Loamy", "Red", "Sandy"],
            "Crop Type": ["Maize", "Rice", "Wheat"],
            "Fertilizer Name": ["10-26-26", "DAP", "Urea"]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("encoders/crop_label_encoder.json"),
        r#"["chickpea", "maize", "rice"]"#,
    )
    .unwrap();

    if gain_table {
        fs::write(
            dir.join("encoders/fert_gain_table.json"),
            r#"{"Wheat": {"Urea": 0.25}, "rice": {"dap": 0.3}}"#,
        )
        .unwrap();
    }

    fs::write(
        dir.join("advisor.toml"),
        r#"
yield_model = "models/yield_model.bin"
yield_encoders = "encoders/yield_encoders.json"
fertilizer_model = "models/fertilizer_model.json"
fertilizer_encoders = "encoders/fertilizer_encoders.json"
crop_model = "models/crop_model.json"
crop_labels = "encoders/crop_label_encoder.json"
fert_gain_table = "encoders/fert_gain_table.json"
"#,
    )
    .unwrap();
}

fn load(gain_table: bool) -> (TempDir, ForestAdvisor) {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), gain_table);
    let cfg = AdvisorConfig::from_file(dir.path().join("advisor.toml").to_str().unwrap()).unwrap();
    let advisor = cfg.load_advisor().unwrap();
    (dir, advisor)
}

fn farm(state: &str) -> FarmMetadata {
    FarmMetadata {
        state: state.to_string(),
        district: "ludhiana".to_string(),
        crop_year: 2024,
        season: "rabi".to_string(),
        area: 2.0,
    }
}

fn soil(rainfall: f64) -> SoilWeatherReading {
    SoilWeatherReading {
        n: 80,
        p: 40,
        k: 40,
        temperature: 22.0,
        humidity: 60.0,
        ph: 6.5,
        rainfall,
        soil_moisture: 30.0,
        soil_type: "loamy".to_string(),
    }
}

#[test]
fn wheat_in_ludhiana() {
    let (_dir, advisor) = load(true);
    let report = advisor.predict(&farm("punjab"), &soil(100.0), "wheat").unwrap();

    assert_eq!(report.selected_crop, "Wheat");
    assert_relative_eq!(report.sel_yield, 2000.0);
    assert_eq!(report.fert_name_sel, "Urea");
    assert_relative_eq!(report.fert_gain_sel, 25.0);
    assert_relative_eq!(report.final_yield_sel, 2500.0);
    assert!(report.final_yield_sel >= report.sel_yield);

    assert_eq!(report.alt_crop, "Chickpea");
    assert_relative_eq!(report.alt_yield, 1500.0);
    assert_eq!(report.fert_name_alt, "DAP");
    assert_relative_eq!(report.fert_gain_alt, 10.0);
    assert_relative_eq!(report.final_yield_alt, 1650.0);
    assert_relative_eq!(report.diff_pct_alt, -34.0);
}

#[test]
fn wetter_field_suggests_rice_with_its_own_gain() {
    let (_dir, advisor) = load(true);
    let report = advisor.predict(&farm("Punjab"), &soil(400.0), "Wheat").unwrap();

    assert_eq!(report.alt_crop, "Rice");
    assert_eq!(report.fert_name_alt, "DAP");
    assert_relative_eq!(report.fert_gain_alt, 30.0);
    // (20 + 10) / 2 * 100 * 1.3
    assert_relative_eq!(report.final_yield_alt, 1950.0);
}

#[test]
fn unseen_state_still_produces_a_report() {
    let (_dir, advisor) = load(true);
    let report = advisor.predict(&farm("atlantis"), &soil(100.0), "wheat").unwrap();
    // State coded -1 takes the 5.0 branch in the first tree.
    assert_relative_eq!(report.sel_yield, 750.0);
    assert_relative_eq!(report.alt_yield, 750.0);
}

#[test]
fn repeated_predictions_match() {
    let (_dir, advisor) = load(true);
    let first = advisor.predict(&farm("punjab"), &soil(100.0), "wheat").unwrap();
    let second = advisor.predict(&farm("punjab"), &soil(100.0), "wheat").unwrap();
    assert_eq!(first, second);
}

#[test]
fn absent_gain_table_uses_default_gain() {
    let (_dir, advisor) = load(false);
    let report = advisor.predict(&farm("punjab"), &soil(100.0), "wheat").unwrap();
    assert_relative_eq!(report.fert_gain_sel, 10.0);
    assert_relative_eq!(report.final_yield_sel, 2200.0);
}

#[test]
fn missing_encoder_field_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), true);
    fs::write(
        dir.path().join("encoders/fertilizer_encoders.json"),
        r#"{"Soil Type": ["Loamy"], "Crop Type": ["Wheat"]}"#,
    )
    .unwrap();
    let cfg = AdvisorConfig::from_file(dir.path().join("advisor.toml").to_str().unwrap()).unwrap();
    let err = cfg.load_advisor().err().unwrap();
    assert!(format!("{:#}", err).contains("Fertilizer Name"));
}

#[test]
fn console_report_reads_naturally() {
    let (_dir, advisor) = load(true);
    let report = advisor.predict(&farm("punjab"), &soil(100.0), "wheat").unwrap();
    let text = ConsoleReport::new(&report, "rabi").to_string();
    assert!(text.contains("Recommended Fertilizer: Urea (+25.0%)"));
    assert!(text.contains("(-34.0% vs Selected)"));
    assert!(text.contains("Final Adjusted Yield: 2500.0 kg/ha\n"));
    assert!(text.contains("- Continue with Wheat + Urea for stable productivity"));
}
