//! Results-page parsing and GPA aggregation.
//!
//! The portal renders marks as one big table: first sittings on `tr.trbgc`
//! rows, repeat sittings on `tr.selectbg` rows. Everything here is lenient;
//! a malformed row is dropped, never an error, so a half-broken page still
//! produces usable totals.

mod accum;
mod adjust;
mod ledger;
mod lexer;
mod repeats;
mod scheme;
mod stats;

pub use accum::{Bucket, CreditAccumulator};
pub use adjust::{add_manual_subjects, apply_grade_overrides, overrides_from_pairs};
pub use ledger::{Attempt, AttemptLedger, LatestAttempt, ResultRow, SubjectHistory};
pub use repeats::{repeated_subjects, AttemptRecord, RepeatedSubject};
pub use scheme::{Department, GradingScheme};
pub use stats::{
    format_gpa, grade_distribution, level_gpas, subject_breakdown, CreditTotals, GpaSummary,
    SubjectRow,
};

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static ORDINARY_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr.trbgc").unwrap());
static REPEAT_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr.selectbg").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Extracts tagged rows from a results page: every ordinary row in document
/// order, then every repeat row. Rows missing cells are skipped.
pub fn extract_result_rows(html: &str) -> Vec<ResultRow> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();

    for row in document.select(&ORDINARY_ROW) {
        let cells: Vec<String> = row.select(&CELL).map(cell_text).collect();
        if cells.len() < 4 {
            continue;
        }
        rows.push(ResultRow::Ordinary {
            code_cell: cells[0].clone(),
            subject_name: cells[1].clone(),
            grade: cells[2].clone(),
            year_cell: cells[3].clone(),
        });
    }

    for row in document.select(&REPEAT_ROW) {
        let cells: Vec<String> = row.select(&CELL).map(cell_text).collect();
        if cells.len() < 3 {
            continue;
        }
        rows.push(ResultRow::Repeat {
            header_cell: cells[0].clone(),
            grade: cells[1].clone(),
            year_cell: cells[2].clone(),
        });
    }

    rows
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Parses a results page into an attempt ledger.
pub fn parse_results_html(html: &str, scheme: &GradingScheme) -> AttemptLedger {
    let mut ledger = AttemptLedger::new();
    for row in extract_result_rows(html) {
        ledger.record(scheme, &row);
    }
    ledger
}

/// Parses a results page straight into credit totals, optionally applying
/// grade overrides to the ledger first.
pub fn credit_totals_from_html(
    html: &str,
    scheme: &GradingScheme,
    overrides: Option<&BTreeMap<String, String>>,
    non_degree: Option<&BTreeSet<String>>,
) -> CreditAccumulator {
    let mut ledger = parse_results_html(html, scheme);
    if let Some(overrides) = overrides {
        adjust::apply_grade_overrides(&mut ledger, scheme, overrides);
    }

    let mut accum = CreditAccumulator::new();
    for (code, latest) in ledger.latest_attempts() {
        accum.accumulate(scheme, code, &latest.grade, non_degree);
    }
    accum
}

/// Everything the results page renders, in one payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPayload {
    /// Raw results HTML, echoed for clients that render the original table.
    pub data: String,
    pub repeated_subjects: Vec<RepeatedSubject>,
    pub subject_breakdown: Vec<SubjectRow>,
    #[serde(flatten)]
    pub gpa: GpaSummary,
    pub grade_distribution: BTreeMap<String, u32>,
    pub level_gpas: BTreeMap<String, String>,
    pub total_credits: f64,
    pub total_grade_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_credits: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_degree_subjects: Option<Vec<String>>,
}

/// Builds the full results payload from a results page.
///
/// The non-degree set and confirmed credits come from the course
/// registration page; both are optional so results still render when that
/// page is unavailable.
pub fn build_results_payload(
    html: &str,
    scheme: &GradingScheme,
    non_degree: Option<&BTreeSet<String>>,
    confirmed_credits: Option<f64>,
) -> ResultsPayload {
    let ledger = parse_results_html(html, scheme);

    let mut accum = CreditAccumulator::new();
    for (code, latest) in ledger.latest_attempts() {
        accum.accumulate(scheme, code, &latest.grade, non_degree);
    }
    let total = accum.total();

    ResultsPayload {
        data: html.to_string(),
        repeated_subjects: repeats::repeated_subjects(&ledger, scheme),
        subject_breakdown: stats::subject_breakdown(&ledger, scheme, non_degree),
        gpa: GpaSummary::from_accumulator(&accum),
        grade_distribution: stats::grade_distribution(&ledger, non_degree),
        level_gpas: stats::level_gpas(&ledger, scheme, non_degree),
        total_credits: total.credits,
        total_grade_points: total.grade_points,
        confirmed_credits,
        non_degree_subjects: non_degree.map(|set| set.iter().cloned().collect()),
    }
}
