//! Clinical guideline catalog backing the rules evaluator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineRef {
    pub id: String,
    pub name: String,
    pub version: String,
    pub url: String,
    pub gap_types: Vec<String>,
}

/// Guideline sources the evaluator draws thresholds from.
pub fn catalog() -> Vec<GuidelineRef> {
    let guideline = |id: &str, name: &str, version: &str, url: &str, gap_types: &[&str]| {
        GuidelineRef {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            url: url.to_string(),
            gap_types: gap_types.iter().map(|t| t.to_string()).collect(),
        }
    };

    vec![
        guideline(
            "uspstf-2024",
            "USPSTF Preventive Services",
            "2024",
            "https://www.uspreventiveservicestaskforce.org/",
            &["screening", "vaccination"],
        ),
        guideline(
            "acip-2024",
            "ACIP Immunization Schedule",
            "2024",
            "https://www.cdc.gov/vaccines/schedules/",
            &["vaccination"],
        ),
        guideline(
            "hedis-2024",
            "HEDIS Quality Measures",
            "2024",
            "https://www.ncqa.org/hedis/",
            &["screening", "lab_test", "medication"],
        ),
        guideline(
            "ada-2024",
            "ADA Diabetes Standards of Care",
            "2024",
            "https://diabetesjournals.org/care",
            &["lab_test", "screening", "medication"],
        ),
    ]
}

// Screening intervals used by the rules evaluator.
pub const COLORECTAL_AGE_RANGE: (u32, u32) = (45, 75);
pub const COLORECTAL_INTERVAL_DAYS: i64 = 365 * 10;
pub const COLORECTAL_DUE_WINDOW_DAYS: i64 = 90;

pub const MAMMOGRAPHY_AGE_RANGE: (u32, u32) = (40, 74);
pub const MAMMOGRAPHY_INTERVAL_DAYS: i64 = 365 * 2;
pub const MAMMOGRAPHY_DUE_WINDOW_DAYS: i64 = 90;

pub const HBA1C_INTERVAL_DAYS: i64 = 180;
pub const HBA1C_DUE_WINDOW_DAYS: i64 = 30;

pub const FLU_INTERVAL_DAYS: i64 = 365;
pub const PNEUMOCOCCAL_MIN_AGE: u32 = 65;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_the_four_sources() {
        let sources = catalog();
        assert_eq!(sources.len(), 4);
        for id in ["uspstf-2024", "acip-2024", "hedis-2024", "ada-2024"] {
            assert!(sources.iter().any(|g| g.id == id), "{id}");
        }
        for source in &sources {
            assert!(!source.gap_types.is_empty());
        }
    }
}
