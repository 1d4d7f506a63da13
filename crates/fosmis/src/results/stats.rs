//! Derived statistics over a parsed attempt ledger.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::accum::{Bucket, CreditAccumulator};
use super::ledger::AttemptLedger;
use super::scheme::{Department, GradingScheme};

/// Formats a bucket's GPA with two decimals, rounding half away from zero.
///
/// An empty bucket yields the literal string `"NaN"`, which the frontend
/// renders as "no data" rather than 0.00.
pub fn format_gpa(bucket: Bucket) -> String {
    if bucket.credits > 0.0 {
        let ratio = bucket.grade_points / bucket.credits;
        format!("{:.2}", (ratio * 100.0).round() / 100.0)
    } else {
        "NaN".to_string()
    }
}

/// Overall GPA plus the six departmental GPAs, all pre-formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaSummary {
    pub gpa: String,
    pub math_gpa: String,
    pub che_gpa: String,
    pub phy_gpa: String,
    pub zoo_gpa: String,
    pub bot_gpa: String,
    pub cs_gpa: String,
}

impl GpaSummary {
    pub fn from_accumulator(accum: &CreditAccumulator) -> Self {
        Self {
            gpa: format_gpa(accum.total()),
            math_gpa: format_gpa(accum.department(Department::Math)),
            che_gpa: format_gpa(accum.department(Department::Chem)),
            phy_gpa: format_gpa(accum.department(Department::Phy)),
            zoo_gpa: format_gpa(accum.department(Department::Zoo)),
            bot_gpa: format_gpa(accum.department(Department::Bot)),
            cs_gpa: format_gpa(accum.department(Department::Cs)),
        }
    }
}

/// Flat projection of the accumulator for the credit-totals endpoint.
///
/// The chemistry fields are spelled `chem*` here while the GPA summary
/// uses `cheGpa`; both spellings are load-bearing for the frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTotals {
    pub total_grade_points: f64,
    pub total_credits: f64,
    pub math_grade_points: f64,
    pub math_credits: f64,
    pub chem_grade_points: f64,
    pub chem_credits: f64,
    pub phy_grade_points: f64,
    pub phy_credits: f64,
    pub zoo_grade_points: f64,
    pub zoo_credits: f64,
    pub bot_grade_points: f64,
    pub bot_credits: f64,
    pub cs_grade_points: f64,
    pub cs_credits: f64,
}

impl CreditTotals {
    pub fn from_accumulator(accum: &CreditAccumulator) -> Self {
        let total = accum.total();
        let math = accum.department(Department::Math);
        let chem = accum.department(Department::Chem);
        let phy = accum.department(Department::Phy);
        let zoo = accum.department(Department::Zoo);
        let bot = accum.department(Department::Bot);
        let cs = accum.department(Department::Cs);
        Self {
            total_grade_points: total.grade_points,
            total_credits: total.credits,
            math_grade_points: math.grade_points,
            math_credits: math.credits,
            chem_grade_points: chem.grade_points,
            chem_credits: chem.credits,
            phy_grade_points: phy.grade_points,
            phy_credits: phy.credits,
            zoo_grade_points: zoo.grade_points,
            zoo_credits: zoo.credits,
            bot_grade_points: bot.grade_points,
            bot_credits: bot.credits,
            cs_grade_points: cs.grade_points,
            cs_credits: cs.credits,
        }
    }
}

/// Counts latest-attempt grades, keyed by grade symbol.
///
/// Non-degree subjects are excluded; non-credit subjects are not, since
/// their grades still appear on the transcript.
pub fn grade_distribution(
    ledger: &AttemptLedger,
    non_degree: Option<&BTreeSet<String>>,
) -> BTreeMap<String, u32> {
    let mut distribution = BTreeMap::new();
    for (code, latest) in ledger.latest_attempts() {
        if let Some(set) = non_degree {
            if set.contains(&code.to_uppercase()) {
                continue;
            }
        }
        *distribution.entry(latest.grade.clone()).or_insert(0) += 1;
    }
    distribution
}

/// Per-level GPAs keyed `level1`..`level3`.
///
/// The level is the digit at index 3 of the subject code (`AMT`**`1`**`232`).
/// Levels with no credited subjects are omitted rather than reported as NaN.
pub fn level_gpas(
    ledger: &AttemptLedger,
    scheme: &GradingScheme,
    non_degree: Option<&BTreeSet<String>>,
) -> BTreeMap<String, String> {
    let mut accums = [
        CreditAccumulator::new(),
        CreditAccumulator::new(),
        CreditAccumulator::new(),
    ];
    for (code, latest) in ledger.latest_attempts() {
        let Some(level) = code.chars().nth(3).and_then(|c| c.to_digit(10)) else {
            continue;
        };
        if (1..=3).contains(&level) {
            accums[(level - 1) as usize].accumulate(scheme, code, &latest.grade, non_degree);
        }
    }

    let mut gpas = BTreeMap::new();
    for (i, accum) in accums.iter().enumerate() {
        let total = accum.total();
        if total.credits > 0.0 {
            gpas.insert(format!("level{}", i + 1), format_gpa(total));
        }
    }
    gpas
}

/// One latest-attempt row of the per-subject breakdown table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub subject_code: String,
    pub subject_name: String,
    pub grade: String,
    pub credit: f64,
    pub grade_point_value: f64,
    pub weighted_points: f64,
    pub year: u32,
    pub semester: String,
}

/// Builds the per-subject breakdown from latest attempts, ordered by year,
/// semester, then code. Non-credit and non-degree subjects are left out.
pub fn subject_breakdown(
    ledger: &AttemptLedger,
    scheme: &GradingScheme,
    non_degree: Option<&BTreeSet<String>>,
) -> Vec<SubjectRow> {
    let mut rows = Vec::new();
    for (code, latest) in ledger.latest_attempts() {
        if scheme.is_non_credit(code) {
            continue;
        }
        if let Some(set) = non_degree {
            if set.contains(&code.to_uppercase()) {
                continue;
            }
        }

        let credit = scheme.credit_for(code);
        let grade_point_value = scheme.grade_points(&latest.grade).unwrap_or(0.0);
        let (year, semester) = year_semester(code);
        rows.push(SubjectRow {
            subject_code: code.clone(),
            subject_name: latest.subject_name.clone(),
            grade: latest.grade.clone(),
            credit,
            grade_point_value,
            weighted_points: credit * grade_point_value,
            year,
            semester,
        });
    }
    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| a.semester.cmp(&b.semester))
            .then_with(|| a.subject_code.cmp(&b.subject_code))
    });
    rows
}

/// Splits the digits after a code's letter prefix into (year, semester).
///
/// `ICT1B13` has year 1 and semester "B"; the semester stays a string so
/// such bridge markers survive. A missing year digit reads as 0.
fn year_semester(code: &str) -> (u32, String) {
    let rest = code.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let mut chars = rest.chars();
    let year = chars.next().and_then(|c| c.to_digit(10)).unwrap_or(0);
    let semester = chars
        .next()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "0".to_string());
    (year, semester)
}
