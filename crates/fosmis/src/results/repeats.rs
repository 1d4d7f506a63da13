//! Detection of subjects that still need a repeat sitting.

use serde::Serialize;

use super::ledger::{AttemptLedger, LatestAttempt};
use super::scheme::GradingScheme;

/// One historical attempt, annotated for highlighting in the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub grade: String,
    pub year: i32,
    pub is_low_grade: bool,
}

/// A subject whose best recorded grade is still below a C.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedSubject {
    pub subject_code: String,
    pub subject_name: String,
    pub attempts: Vec<AttemptRecord>,
    pub latest_attempt: LatestAttempt,
}

/// Collects subjects still needing a repeat: those whose selected latest
/// attempt sits below a C. Attempts are listed newest first; anything at
/// or below a C- is flagged as a low grade.
pub fn repeated_subjects(ledger: &AttemptLedger, scheme: &GradingScheme) -> Vec<RepeatedSubject> {
    let pass_points = scheme.grade_points("C").unwrap_or(2.0);
    let low_points = scheme.grade_points("C-").unwrap_or(1.7);

    let mut subjects = Vec::new();
    for (code, history) in ledger.histories() {
        let Some(latest) = ledger.latest_attempts().get(code) else {
            continue;
        };
        if scheme.grade_points(&latest.grade).unwrap_or(0.0) >= pass_points {
            continue;
        }

        let mut attempts = history.attempts.clone();
        attempts.sort_by(|a, b| b.year.cmp(&a.year));
        subjects.push(RepeatedSubject {
            subject_code: code.clone(),
            subject_name: history.subject_name.clone(),
            attempts: attempts
                .into_iter()
                .map(|attempt| AttemptRecord {
                    is_low_grade: scheme.grade_points(&attempt.grade).unwrap_or(0.0)
                        <= low_points,
                    grade: attempt.grade,
                    year: attempt.year,
                })
                .collect(),
            latest_attempt: latest.clone(),
        });
    }
    subjects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ledger::ResultRow;

    fn ledger_of(rows: &[ResultRow]) -> AttemptLedger {
        let scheme = GradingScheme::fosmis();
        let mut ledger = AttemptLedger::new();
        for row in rows {
            ledger.record(&scheme, row);
        }
        ledger
    }

    fn ordinary(code: &str, name: &str, grade: &str, year: &str) -> ResultRow {
        ResultRow::Ordinary {
            code_cell: code.to_string(),
            subject_name: name.to_string(),
            grade: grade.to_string(),
            year_cell: year.to_string(),
        }
    }

    fn repeat(code: &str, name: &str, grade: &str, year: &str) -> ResultRow {
        ResultRow::Repeat {
            header_cell: format!("Repeat Attempt [ {code} - {name} ]"),
            grade: grade.to_string(),
            year_cell: year.to_string(),
        }
    }

    #[test]
    fn test_passing_subject_is_not_listed() {
        let ledger = ledger_of(&[ordinary("AMT1232", "Applied Maths", "C", "2020")]);
        let scheme = GradingScheme::fosmis();
        assert!(repeated_subjects(&ledger, &scheme).is_empty());
    }

    #[test]
    fn test_recovered_subject_is_not_listed() {
        let ledger = ledger_of(&[
            ordinary("PHY1013", "Physics", "C-", "2020"),
            repeat("PHY1013", "Physics", "B+", "2021"),
        ]);
        let scheme = GradingScheme::fosmis();
        assert!(repeated_subjects(&ledger, &scheme).is_empty());
    }

    #[test]
    fn test_still_failing_subject_is_flagged() {
        let ledger = ledger_of(&[
            ordinary("CHE1013", "Chemistry", "D", "2020"),
            repeat("CHE1013", "Chemistry", "D+", "2021"),
        ]);
        let scheme = GradingScheme::fosmis();
        let subjects = repeated_subjects(&ledger, &scheme);

        assert_eq!(subjects.len(), 1);
        let subject = &subjects[0];
        assert_eq!(subject.subject_code, "CHE1013");
        assert_eq!(subject.latest_attempt.grade, "D+");
        // Newest attempt first
        assert_eq!(subject.attempts[0].year, 2021);
        assert_eq!(subject.attempts[1].year, 2020);
    }

    #[test]
    fn test_low_grade_annotation_uses_c_minus_threshold() {
        let ledger = ledger_of(&[
            ordinary("ZOO1012", "Zoology", "C-", "2020"),
            repeat("ZOO1012", "Zoology", "MC", "2021"),
        ]);
        let scheme = GradingScheme::fosmis();
        let subjects = repeated_subjects(&ledger, &scheme);

        assert_eq!(subjects.len(), 1);
        for attempt in &subjects[0].attempts {
            assert!(attempt.is_low_grade, "{} should be low", attempt.grade);
        }
    }

    #[test]
    fn test_c_plus_attempt_is_not_low() {
        let ledger = ledger_of(&[
            ordinary("BOT1012", "Botany", "E", "2020"),
            repeat("BOT1012", "Botany", "C+", "2021"),
        ]);
        let scheme = GradingScheme::fosmis();
        // C+ recovers the subject entirely
        assert!(repeated_subjects(&ledger, &scheme).is_empty());
    }
}
