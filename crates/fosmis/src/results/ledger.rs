//! Per-subject attempt ledger with best-grade/newest-year selection.

use serde::Serialize;
use std::collections::BTreeMap;

use super::lexer;
use super::scheme::GradingScheme;

/// One recorded sitting of a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub grade: String,
    pub year: i32,
}

/// The attempt currently selected as authoritative for a subject, together
/// with the subject name from the row that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestAttempt {
    pub subject_name: String,
    pub grade: String,
    pub year: i32,
}

/// Full attempt history of one subject, filed under the first name seen.
#[derive(Debug, Clone)]
pub struct SubjectHistory {
    pub subject_name: String,
    pub attempts: Vec<Attempt>,
}

/// A results-table row, tagged by shape.
///
/// The page renders first sittings as `tr.trbgc` rows with four cells and
/// repeat sittings as `tr.selectbg` rows with three, so the two carry
/// different column layouts.
#[derive(Debug, Clone)]
pub enum ResultRow {
    Ordinary {
        code_cell: String,
        subject_name: String,
        grade: String,
        year_cell: String,
    },
    Repeat {
        header_cell: String,
        grade: String,
        year_cell: String,
    },
}

/// Ledger of every attempt per subject code plus the selected latest one.
///
/// Ordinary rows are fed before repeat rows, mirroring document order. The
/// selected attempt always carries the highest grade-point value seen, ties
/// going to the most recent year, so replaying the repeat rows in any order
/// lands on the same selection.
#[derive(Debug, Default)]
pub struct AttemptLedger {
    latest: BTreeMap<String, LatestAttempt>,
    history: BTreeMap<String, SubjectHistory>,
}

impl AttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one parsed row.
    ///
    /// Rows with an unrecognised grade symbol, a year cell without leading
    /// digits, or an unparseable code/header are dropped without effect.
    pub fn record(&mut self, scheme: &GradingScheme, row: &ResultRow) {
        match row {
            ResultRow::Ordinary {
                code_cell,
                subject_name,
                grade,
                year_cell,
            } => {
                let Some(code) = lexer::parse_subject_code(code_cell) else {
                    return;
                };
                let Some(year) = lexer::parse_year(year_cell) else {
                    return;
                };
                if !scheme.is_known_grade(grade) {
                    return;
                }
                self.push_history(code, subject_name, grade, year);
                // The first ordinary sitting stands until a repeat beats it
                self.latest
                    .entry(code.to_string())
                    .or_insert_with(|| LatestAttempt {
                        subject_name: subject_name.clone(),
                        grade: grade.clone(),
                        year,
                    });
            }
            ResultRow::Repeat {
                header_cell,
                grade,
                year_cell,
            } => {
                let Some((code, name)) = lexer::parse_repeat_header(header_cell) else {
                    return;
                };
                let Some(year) = lexer::parse_year(year_cell) else {
                    return;
                };
                if !scheme.is_known_grade(grade) {
                    return;
                }
                self.push_history(code, name, grade, year);
                let points = scheme.grade_points(grade).unwrap_or(0.0);
                match self.latest.get_mut(code) {
                    None => {
                        self.latest.insert(
                            code.to_string(),
                            LatestAttempt {
                                subject_name: name.to_string(),
                                grade: grade.clone(),
                                year,
                            },
                        );
                    }
                    Some(current) => {
                        let current_points =
                            scheme.grade_points(&current.grade).unwrap_or(0.0);
                        if points > current_points
                            || (points == current_points && year > current.year)
                        {
                            *current = LatestAttempt {
                                subject_name: name.to_string(),
                                grade: grade.clone(),
                                year,
                            };
                        }
                    }
                }
            }
        }
    }

    fn push_history(&mut self, code: &str, name: &str, grade: &str, year: i32) {
        let entry = self
            .history
            .entry(code.to_string())
            .or_insert_with(|| SubjectHistory {
                subject_name: name.to_string(),
                attempts: Vec::new(),
            });
        entry.attempts.push(Attempt {
            grade: grade.to_string(),
            year,
        });
    }

    /// Replaces the stored grade of an existing latest attempt. Returns
    /// `false` when the subject has no ledger entry.
    pub fn replace_latest_grade(&mut self, code: &str, grade: &str) -> bool {
        match self.latest.get_mut(code) {
            Some(latest) => {
                latest.grade = grade.to_string();
                true
            }
            None => false,
        }
    }

    pub fn latest_attempts(&self) -> &BTreeMap<String, LatestAttempt> {
        &self.latest
    }

    pub fn histories(&self) -> &BTreeMap<String, SubjectHistory> {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty() && self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn replay(rows: &[ResultRow]) -> AttemptLedger {
        let scheme = GradingScheme::fosmis();
        let mut ledger = AttemptLedger::new();
        for row in rows {
            ledger.record(&scheme, row);
        }
        ledger
    }

    #[test]
    fn test_first_ordinary_attempt_wins() {
        let ledger = replay(&[
            ordinary("AMT1232", "Applied Maths", "C+", "2020"),
            ordinary("AMT1232", "Applied Maths", "A", "2021"),
        ]);
        let latest = &ledger.latest_attempts()["AMT1232"];
        assert_eq!(latest.grade, "C+");
        assert_eq!(latest.year, 2020);
        assert_eq!(ledger.histories()["AMT1232"].attempts.len(), 2);
    }

    #[test]
    fn test_repeat_with_better_grade_replaces() {
        let ledger = replay(&[
            ordinary("PHY1013", "Physics", "D", "2020"),
            repeat("PHY1013", "Physics", "C", "2021"),
        ]);
        let latest = &ledger.latest_attempts()["PHY1013"];
        assert_eq!(latest.grade, "C");
        assert_eq!(latest.year, 2021);
    }

    #[test]
    fn test_repeat_with_worse_grade_is_kept_in_history_only() {
        let ledger = replay(&[
            ordinary("PHY1013", "Physics", "B", "2020"),
            repeat("PHY1013", "Physics", "C-", "2021"),
        ]);
        assert_eq!(ledger.latest_attempts()["PHY1013"].grade, "B");
        assert_eq!(ledger.histories()["PHY1013"].attempts.len(), 2);
    }

    #[test]
    fn test_equal_grade_newer_year_replaces() {
        let ledger = replay(&[
            ordinary("CHE1013", "Chemistry", "C", "2020"),
            repeat("CHE1013", "Chemistry", "C", "2022"),
        ]);
        assert_eq!(ledger.latest_attempts()["CHE1013"].year, 2022);
    }

    #[test]
    fn test_equal_grade_older_year_does_not_replace() {
        let ledger = replay(&[
            ordinary("CHE1013", "Chemistry", "C", "2021"),
            repeat("CHE1013", "Chemistry", "C", "2020"),
        ]);
        assert_eq!(ledger.latest_attempts()["CHE1013"].year, 2021);
    }

    #[test]
    fn test_repeat_for_unseen_subject_creates_entry() {
        let ledger = replay(&[repeat("ZOO2012", "Zoology II", "C+", "2021")]);
        let latest = &ledger.latest_attempts()["ZOO2012"];
        assert_eq!(latest.subject_name, "Zoology II");
        assert_eq!(latest.grade, "C+");
    }

    #[test]
    fn test_unknown_grade_row_is_dropped_entirely() {
        let ledger = replay(&[
            ordinary("BOT1012", "Botany", "X", "2020"),
            repeat("BOT1012", "Botany", "??", "2021"),
        ]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_year_without_digits_drops_row() {
        let ledger = replay(&[ordinary("BOT1012", "Botany", "A", "pending")]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_repeat_selection_is_order_independent() {
        let base = ordinary("AMT1232", "Applied Maths", "D", "2019");
        let repeats = [
            repeat("AMT1232", "Applied Maths", "C-", "2020"),
            repeat("AMT1232", "Applied Maths", "C+", "2021"),
            repeat("AMT1232", "Applied Maths", "C", "2022"),
        ];
        let orderings: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orderings {
            let mut rows = vec![base.clone()];
            for i in order {
                rows.push(repeats[i].clone());
            }
            let ledger = replay(&rows);
            let latest = &ledger.latest_attempts()["AMT1232"];
            assert_eq!(latest.grade, "C+", "ordering {order:?}");
            assert_eq!(latest.year, 2021, "ordering {order:?}");
        }
    }

    #[test]
    fn test_code_extracted_from_multi_token_cell() {
        let ledger = replay(&[ordinary("1 SC 2020 MAT1142", "Maths for Bio", "A", "2020")]);
        assert!(ledger.latest_attempts().contains_key("MAT1142"));
    }
}
