//! Weighted grade-point and credit-hour accumulation.

use std::collections::BTreeSet;

use super::scheme::{Department, GradingScheme};

/// Grade-point / credit-hour pair for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub grade_points: f64,
    pub credits: f64,
}

/// Running credit totals, overall and per department.
#[derive(Debug, Clone, Default)]
pub struct CreditAccumulator {
    total: Bucket,
    departments: [Bucket; Department::ALL.len()],
}

impl CreditAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one subject into the totals.
    ///
    /// Non-credit subjects and members of the optional non-degree set are
    /// skipped entirely. Exclusion checks see the upper-cased code; the
    /// credit suffix lookup sees the code as written, since the Greek and
    /// Latin suffixes are case-sensitive.
    pub fn accumulate(
        &mut self,
        scheme: &GradingScheme,
        subject_code: &str,
        grade: &str,
        non_degree: Option<&BTreeSet<String>>,
    ) {
        if scheme.is_non_credit(subject_code) {
            return;
        }
        if let Some(set) = non_degree {
            if set.contains(&subject_code.to_uppercase()) {
                return;
            }
        }

        let credits = scheme.credit_for(subject_code);
        let grade_points = scheme.grade_points(grade).unwrap_or(0.0) * credits;

        self.total.credits += credits;
        self.total.grade_points += grade_points;

        if let Some(dept) = scheme.department_of(subject_code) {
            let bucket = &mut self.departments[dept as usize];
            bucket.credits += credits;
            bucket.grade_points += grade_points;
        }
    }

    pub fn total(&self) -> Bucket {
        self.total
    }

    pub fn department(&self, dept: Department) -> Bucket {
        self.departments[dept as usize]
    }
}
