use serde::{Deserialize, Serialize};

/// Column names of the accumulated all-occupations file.
pub const OCCUPATION_COLUMNS: [&str; 6] = [
    "Code",
    "Occupation",
    "Job Zone",
    "Interest1",
    "Interest2",
    "Interest3",
];

/// Key column shared by every table in the pipeline.
pub const CODE_COLUMN: &str = "Code";

/// Occupation-name column; collides between the STEM and all-occupations tables.
pub const OCCUPATION_COLUMN: &str = "Occupation";

/// Column appended to the STEM table by the title scraper.
pub const JOB_TITLES_COLUMN: &str = "Job Titles";

/// One row of an O*NET interests-table query.
///
/// Fields are kept as the verbatim strings the remote CSV delivered, so a
/// read/write cycle does not reformat anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationRow {
    /// O*NET-SOC code (e.g., "15-1252.00").
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Occupation")]
    pub occupation: String,
    /// Preparation level, 1 (little) to 5 (extensive).
    #[serde(rename = "Job Zone", default)]
    pub job_zone: String,
    #[serde(rename = "Interest1", default)]
    pub interest1: String,
    #[serde(rename = "Interest2", default)]
    pub interest2: String,
    #[serde(rename = "Interest3", default)]
    pub interest3: String,
}

impl OccupationRow {
    /// Parsed job zone, if the field holds a number.
    pub fn job_zone_level(&self) -> Option<u8> {
        let zone = self.job_zone.trim();
        if let Ok(level) = zone.parse::<u8>() {
            return Some(level);
        }
        // Some exports render integers as floats ("4.0")
        zone.parse::<f64>()
            .ok()
            .filter(|z| z.fract() == 0.0 && (0.0..=255.0).contains(z))
            .map(|z| z as u8)
    }
}
