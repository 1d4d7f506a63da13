//! What-if adjustments: grade overrides and manually added subjects.

use std::collections::BTreeMap;

use super::accum::CreditAccumulator;
use super::ledger::AttemptLedger;
use super::scheme::GradingScheme;

/// Pairs subject codes with grades index by index, skipping pairs where
/// either side is empty. Extra entries in the longer list are ignored.
pub fn overrides_from_pairs(subjects: &[String], grades: &[String]) -> BTreeMap<String, String> {
    subjects
        .iter()
        .zip(grades.iter())
        .filter(|(code, grade)| !code.is_empty() && !grade.is_empty())
        .map(|(code, grade)| (code.clone(), grade.clone()))
        .collect()
}

/// Applies grade overrides to subjects already present in the ledger.
///
/// Overrides never create entries, and an unrecognised grade symbol leaves
/// the existing grade untouched.
pub fn apply_grade_overrides(
    ledger: &mut AttemptLedger,
    scheme: &GradingScheme,
    overrides: &BTreeMap<String, String>,
) {
    for (code, grade) in overrides {
        if scheme.is_known_grade(grade) {
            ledger.replace_latest_grade(code, grade);
        }
    }
}

/// Folds manually entered subjects on top of an already-built accumulator.
///
/// Pairs are taken index by index up to the shorter list, skipping pairs
/// with an empty code or grade. Only the fixed non-credit list applies;
/// manual entries are assumed degree-relevant.
pub fn add_manual_subjects(
    accum: &mut CreditAccumulator,
    scheme: &GradingScheme,
    subjects: &[String],
    grades: &[String],
) {
    for (code, grade) in subjects.iter().zip(grades.iter()) {
        if code.is_empty() || grade.is_empty() {
            continue;
        }
        accum.accumulate(scheme, code, grade, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ledger::ResultRow;
    use crate::results::stats::GpaSummary;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ledger_with(code: &str, grade: &str) -> AttemptLedger {
        let scheme = GradingScheme::fosmis();
        let mut ledger = AttemptLedger::new();
        ledger.record(
            &scheme,
            &ResultRow::Ordinary {
                code_cell: code.to_string(),
                subject_name: code.to_string(),
                grade: grade.to_string(),
                year_cell: "2020".to_string(),
            },
        );
        ledger
    }

    #[test]
    fn test_overrides_from_pairs_skips_empty_and_extra() {
        let overrides = overrides_from_pairs(
            &strings(&["CHE1013", "", "PHY1013", "ZOO1012"]),
            &strings(&["A", "B", ""]),
        );
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["CHE1013"], "A");
    }

    #[test]
    fn test_override_replaces_existing_grade() {
        let scheme = GradingScheme::fosmis();
        let mut ledger = ledger_with("CHE1013", "B+");
        let overrides = overrides_from_pairs(&strings(&["CHE1013"]), &strings(&["A"]));
        apply_grade_overrides(&mut ledger, &scheme, &overrides);

        assert_eq!(ledger.latest_attempts()["CHE1013"].grade, "A");
    }

    #[test]
    fn test_override_ignores_unknown_grade_and_absent_subject() {
        let scheme = GradingScheme::fosmis();
        let mut ledger = ledger_with("CHE1013", "B+");
        let overrides = overrides_from_pairs(
            &strings(&["CHE1013", "PHY9999"]),
            &strings(&["Z", "A"]),
        );
        apply_grade_overrides(&mut ledger, &scheme, &overrides);

        assert_eq!(ledger.latest_attempts()["CHE1013"].grade, "B+");
        assert!(!ledger.latest_attempts().contains_key("PHY9999"));
    }

    #[test]
    fn test_manual_subjects_extend_totals() {
        let scheme = GradingScheme::fosmis();
        let mut accum = CreditAccumulator::new();
        accum.accumulate(&scheme, "AMT1232", "A", None);

        // Latin 'a' suffix carries 1.5 credits
        add_manual_subjects(
            &mut accum,
            &scheme,
            &strings(&["CHE401a", ""]),
            &strings(&["A+", "B"]),
        );

        let total = accum.total();
        assert_eq!(total.credits, 3.5);
        assert_eq!(total.grade_points, 14.0);
        let summary = GpaSummary::from_accumulator(&accum);
        assert_eq!(summary.gpa, "4.00");
        assert_eq!(summary.che_gpa, "4.00");
    }

    #[test]
    fn test_manual_subjects_respect_non_credit_list() {
        let scheme = GradingScheme::fosmis();
        let mut accum = CreditAccumulator::new();
        add_manual_subjects(&mut accum, &scheme, &strings(&["ENG1201"]), &strings(&["A"]));
        assert_eq!(accum.total().credits, 0.0);
    }
}
