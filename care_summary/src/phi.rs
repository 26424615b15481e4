//! PHI detection over generated text.
//!
//! Keyword matching plus two digit-pattern scans (SSN, date of birth),
//! written without a regex dependency.

use serde::{Deserialize, Serialize};

const PHI_KEYWORDS: &[&str] = &[
    "ssn",
    "social security",
    "date of birth",
    "dob",
    "address",
    "phone number",
    "email",
    "mrn",
    "medical record number",
    "insurance id",
    "policy number",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhiScan {
    pub detected: bool,
    pub types_found: Vec<String>,
}

/// True if `text` contains an XXX-XX-XXXX digit group.
fn contains_ssn_pattern(text: &str) -> bool {
    let bytes = text.as_bytes();
    let digits_then_dash = |start: usize, count: usize| -> bool {
        bytes[start..start + count].iter().all(u8::is_ascii_digit)
            && bytes.get(start + count) == Some(&b'-')
    };

    let mut i = 0;
    while i + 11 <= bytes.len() {
        if digits_then_dash(i, 3)
            && digits_then_dash(i + 4, 2)
            && bytes[i + 7..i + 11].iter().all(u8::is_ascii_digit)
        {
            // Reject longer digit runs like 1234-56-7890.
            let run_start = i == 0 || !bytes[i - 1].is_ascii_digit();
            let run_end = bytes.get(i + 11).map_or(true, |b| !b.is_ascii_digit());
            if run_start && run_end {
                return true;
            }
        }
        i += 1;
    }
    false
}

/// True if a birth-date marker is followed by a digit, e.g. "DOB: 1/2/1960".
fn contains_dob_marker(lower: &str) -> bool {
    for marker in ["dob", "born", "birth date", "date of birth"] {
        let mut from = 0;
        while let Some(pos) = lower[from..].find(marker) {
            let after = &lower[from + pos + marker.len()..];
            let trimmed = after.trim_start_matches([':', ' ']);
            if trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return true;
            }
            from += pos + marker.len();
        }
    }
    false
}

/// Scan text for PHI markers.
pub fn scan(text: &str) -> PhiScan {
    let lower = text.to_lowercase();
    let mut types_found: Vec<String> = PHI_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .map(|k| k.to_string())
        .collect();

    if contains_ssn_pattern(text) {
        types_found.push("ssn_pattern".to_string());
    }
    if contains_dob_marker(&lower) {
        types_found.push("date_of_birth".to_string());
    }

    PhiScan {
        detected: !types_found.is_empty(),
        types_found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_clinical_text_passes() {
        let result = scan(
            "HbA1c improved to 7.2%. Blood pressure 128/82 on Lisinopril 10mg daily. \
             Continue current management.",
        );
        assert!(!result.detected);
        assert!(result.types_found.is_empty());
    }

    #[test]
    fn keyword_hits_are_reported() {
        let result = scan("Patient SSN on file; verify insurance id before billing.");
        assert!(result.detected);
        assert!(result.types_found.contains(&"ssn".to_string()));
        assert!(result.types_found.contains(&"insurance id".to_string()));
    }

    #[test]
    fn ssn_digit_pattern_is_caught() {
        let result = scan("Recorded identifier 123-45-6789 in intake form.");
        assert!(result.types_found.contains(&"ssn_pattern".to_string()));
    }

    #[test]
    fn longer_digit_runs_are_not_ssns() {
        assert!(!contains_ssn_pattern("Order 1234-56-7890 shipped"));
        assert!(!contains_ssn_pattern("123-45-67890"));
        assert!(contains_ssn_pattern("id 123-45-6789."));
    }

    #[test]
    fn dob_marker_requires_following_digit() {
        let flagged = scan("DOB: 4/12/1961 per registration.");
        assert!(flagged.types_found.contains(&"date_of_birth".to_string()));

        // "dob" keyword alone still matches the keyword list, but the digit
        // pattern should not fire without a number.
        let keyword_only = scan("Confirm demographics at next visit including dob");
        assert!(!keyword_only.types_found.contains(&"date_of_birth".to_string()));
    }
}
