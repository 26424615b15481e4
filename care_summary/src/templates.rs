//! Canned summary templates.
//!
//! One pre-written narrative per summary type stands in for LLM generation.

use serde_json::{json, Value as JsonValue};

use crate::types::{RecentLab, SummaryType};

const COMPREHENSIVE: &str = "This 62-year-old patient has a medical history significant for Type 2 diabetes mellitus \
and essential hypertension, both of which are currently well-controlled on medication therapy.\n\n\
**Diabetes Management**: Recent HbA1c of 7.2% represents improvement from prior value of 7.8%. \
The patient continues on Metformin 1000mg twice daily with good tolerance. Glucose levels \
remain mildly elevated at 142 mg/dL but trending in the correct direction.\n\n\
**Cardiovascular**: Blood pressure control is adequate at 128-134/82-84 mmHg on Lisinopril 10mg daily. \
Lipid panel shows total cholesterol 185, LDL 98, HDL 52. The patient is on Atorvastatin 20mg for \
lipid management with good results.\n\n\
**Renal Function**: eGFR 72 mL/min indicates mild CKD Stage 2, likely related to diabetes and hypertension. \
Creatinine stable at 1.1 mg/dL.\n\n\
**Recent Imaging**: Chest X-ray unremarkable with no acute findings.";

const MEDICATION: &str = "**Current Medication Regimen**:\n\n\
1. **Metformin 1000mg** - Take twice daily with meals (Diabetes)\n\
2. **Lisinopril 10mg** - Take once daily (Hypertension/Renal protection)\n\
3. **Atorvastatin 20mg** - Take once daily at bedtime (Hyperlipidemia)\n\n\
All medications have been well-tolerated with good compliance reported. \
No significant drug interactions identified. Continue current regimen.";

const LAB_TREND: &str = "**Laboratory Trends**:\n\n\
- **HbA1c**: 7.2% (down from 7.8%) - Improving glycemic control\n\
- **Glucose**: 142 mg/dL (H) - Mildly elevated but improving\n\
- **Creatinine**: 1.1 mg/dL - Stable\n\
- **eGFR**: 72 mL/min - Mild CKD Stage 2, stable\n\
- **Total Cholesterol**: 185 mg/dL - At goal\n\
- **LDL**: 98 mg/dL - At goal (<100)\n\
- **HDL**: 52 mg/dL - Borderline\n\
- **Triglycerides**: 175 mg/dL - Mildly elevated";

const BRIEF: &str = "Patient with Type 2 diabetes and hypertension, both well-controlled. \
HbA1c improving at 7.2%. Blood pressure at goal. Continue current management.";

/// Render the template for a summary type, truncated to roughly
/// `max_length` words (four characters per word).
pub fn render(summary_type: SummaryType, max_length: usize) -> String {
    let text = match summary_type {
        SummaryType::Comprehensive => COMPREHENSIVE,
        SummaryType::Medication => MEDICATION,
        SummaryType::LabTrend => LAB_TREND,
        SummaryType::ProblemFocused | SummaryType::CareTransition => BRIEF,
    };

    let limit = max_length * 4;
    if text.len() <= limit {
        text.to_string()
    } else {
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text[..cut].to_string()
    }
}

pub fn active_problems() -> Vec<String> {
    [
        "Type 2 Diabetes Mellitus",
        "Essential Hypertension",
        "Hyperlipidemia",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

pub fn current_medications() -> Vec<String> {
    [
        "Metformin 1000mg BID",
        "Lisinopril 10mg daily",
        "Atorvastatin 20mg daily",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

pub fn recent_labs() -> Vec<RecentLab> {
    let lab = |name: &str, value: &str, date: &str, status: &str| RecentLab {
        name: name.to_string(),
        value: value.to_string(),
        date: date.to_string(),
        status: status.to_string(),
    };
    vec![
        lab("HbA1c", "7.2%", "2024-01-10", "improved"),
        lab("Glucose", "142 mg/dL", "2024-01-05", "elevated"),
        lab("eGFR", "72 mL/min", "2024-01-05", "stable"),
    ]
}

/// Generation settings reported alongside every summary.
pub fn model_info() -> JsonValue {
    json!({
        "model": "gpt-4-turbo",
        "temperature": 0.3,
        "max_tokens": 4096,
        "system_prompt_tokens": 1250,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_renders_text() {
        for summary_type in [
            SummaryType::Comprehensive,
            SummaryType::ProblemFocused,
            SummaryType::Medication,
            SummaryType::LabTrend,
            SummaryType::CareTransition,
        ] {
            assert!(!render(summary_type, 500).is_empty());
        }
    }

    #[test]
    fn comprehensive_covers_major_sections() {
        let text = render(SummaryType::Comprehensive, 500);
        assert!(text.contains("Diabetes Management"));
        assert!(text.contains("Cardiovascular"));
        assert!(text.contains("Renal Function"));
    }

    #[test]
    fn short_limit_truncates() {
        let text = render(SummaryType::Comprehensive, 25);
        assert!(text.len() <= 100);
        assert!(!text.is_empty());
    }

    #[test]
    fn statics_are_populated() {
        assert_eq!(active_problems().len(), 3);
        assert_eq!(current_medications().len(), 3);
        assert_eq!(recent_labs().len(), 3);
        assert_eq!(model_info()["model"], "gpt-4-turbo");
    }
}
