//! Console rendering of a [`PredictionReport`].

use std::fmt;

use crate::advisor::PredictionReport;

/// Report plus the season it was requested for, rendered as console text.
pub struct ConsoleReport<'a> {
    pub report: &'a PredictionReport,
    pub season: &'a str,
}

impl<'a> ConsoleReport<'a> {
    pub fn new(report: &'a PredictionReport, season: &'a str) -> Self {
        Self { report, season }
    }

    /// Advice lines: which crop/fertilizer pairing to go with, then field care.
    pub fn advice(&self) -> Vec<String> {
        let r = self.report;
        let pairing = if r.final_yield_alt > r.final_yield_sel {
            format!(
                "Consider switching to {} + {} for higher productivity",
                r.alt_crop, r.fert_name_alt
            )
        } else {
            format!(
                "Continue with {} + {} for stable productivity",
                r.selected_crop, r.fert_name_sel
            )
        };
        vec![
            pairing,
            "Irrigate twice per week (based on weather)".to_string(),
            format!("Watch out for pest alerts in {} season", self.season),
        ]
    }
}

/// A report number as a console reader expects it: whole values keep one
/// decimal (`2500.0`), others print their shortest exact form (`-38.89`).
struct Num(f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        writeln!(f, "Crop Yield Prediction Report")?;
        writeln!(f)?;
        writeln!(f, "Selected Crop: {}", r.selected_crop)?;
        writeln!(f, "Expected Yield: {} kg/ha", Num(r.sel_yield))?;
        writeln!(f, "Recommended Fertilizer: {} (+{}%)", r.fert_name_sel, Num(r.fert_gain_sel))?;
        writeln!(f, "Final Adjusted Yield: {} kg/ha", Num(r.final_yield_sel))?;
        writeln!(f)?;
        writeln!(f, "Alternative Crop Suggestion: {}", r.alt_crop)?;
        writeln!(f, "Expected Yield: {} kg/ha", Num(r.alt_yield))?;
        writeln!(f, "Recommended Fertilizer: {} (+{}%)", r.fert_name_alt, Num(r.fert_gain_alt))?;
        writeln!(
            f,
            "Final Adjusted Yield: {} kg/ha ({}% vs Selected)",
            Num(r.final_yield_alt),
            Num(r.diff_pct_alt)
        )?;
        writeln!(f)?;
        writeln!(f, "Advice:")?;
        for line in self.advice() {
            writeln!(f, "- {}", line)?;
        }
        Ok(())
    }
}
