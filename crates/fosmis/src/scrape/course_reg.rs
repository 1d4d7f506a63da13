//! Course-registration page parsing.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

// "You have registered 90.00(Confirmed) Credits"
static TOTAL_CONFIRMED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)have registered\s+([\d.]+)\s*\(Confirmed\)\s*Credits").unwrap());
// "Registered Subjects for 2023/2024 Academic year and Semester 1"
static SEMESTER_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Registered Subjects for\s+(\S+)\s+Academic year and Semester\s+(\d)").unwrap()
});
// "You Have registered for 7.50(Confirm) Credits"
static SEMESTER_CREDITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)registered for\s+([\d.]+)\s*\(Confirm\)\s*Credits").unwrap());
// The department list is read from the raw markup; the parsed DOM drops the
// portal's malformed <li> items.
static DEPARTMENT_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li>\s*([^<]+?)\s*</li>").unwrap());

/// Subject-code prefixes mapped to department names, used when the page
/// does not render its department list (outside registration periods).
const PREFIX_DEPARTMENTS: &[(&str, &str)] = &[
    ("CSC", "Computer Science"),
    ("COM", "Computer Science"),
    ("MAT", "Mathematics"),
    ("AMT", "Applied Mathematics"),
    ("IMT", "Industrial Mathematics"),
    ("PHY", "Physics"),
    ("CHE", "Chemistry"),
    ("ZOO", "Zoology"),
    ("BOT", "Botany"),
    ("ENG", "English"),
    ("FSC", "Faculty Common"),
];

/// One row of a registration table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredCourse {
    pub code: String,
    pub name: String,
    pub degree_status: String,
    pub confirmation: String,
}

/// The semester currently open for registration.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSemester {
    pub academic_year: String,
    pub semester: String,
    pub credits: f64,
    pub courses: Vec<RegisteredCourse>,
}

/// Everything scraped off the course-registration page.
#[derive(Debug, Clone, Default)]
pub struct CourseRegistration {
    pub current_semester: CurrentSemester,
    pub all_courses: Vec<RegisteredCourse>,
    pub total_confirmed_credits: f64,
    pub departments: Vec<String>,
    /// Upper-cased codes of subjects registered as "Non Degree".
    pub non_degree_set: BTreeSet<String>,
}

/// Parses the course-registration page.
///
/// The page carries two course tables told apart by header text: the
/// current-semester table says "Courses Code", the all-courses table says
/// "Course Code". Non-degree registrations are collected from both.
pub fn parse_course_registration_html(html: &str) -> CourseRegistration {
    let document = Html::parse_document(html);
    let body_text = document
        .select(&BODY)
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default();

    let total_confirmed_credits = capture_f64(&TOTAL_CONFIRMED, &body_text);

    let mut current_semester = CurrentSemester {
        credits: capture_f64(&SEMESTER_CREDITS, &body_text),
        ..CurrentSemester::default()
    };
    if let Some(caps) = SEMESTER_HEADER.captures(&body_text) {
        current_semester.academic_year = caps[1].to_string();
        current_semester.semester = caps[2].to_string();
    }

    let mut departments: Vec<String> = DEPARTMENT_ITEM
        .captures_iter(html)
        .filter_map(|caps| {
            let text = caps.get(1)?.as_str().trim();
            (!text.is_empty() && text.len() < 60).then(|| text.to_string())
        })
        .collect();

    let mut all_courses = Vec::new();
    let mut non_degree_set = BTreeSet::new();

    for table in document.select(&TABLE) {
        let header_text = table
            .select(&ROW)
            .next()
            .map(row_text)
            .unwrap_or_default();
        let is_semester_table = header_text.contains("Courses Code");
        let is_all_courses_table = header_text.contains("Course Code") && !is_semester_table;
        if !is_semester_table && !is_all_courses_table {
            continue;
        }

        for row in table.select(&ROW) {
            let cells: Vec<String> = row
                .select(&CELL)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() < 4 || cells[0].is_empty() {
                continue;
            }
            let course = RegisteredCourse {
                code: cells[0].clone(),
                name: cells[1].clone(),
                degree_status: cells[2].clone(),
                confirmation: cells[3].clone(),
            };
            if course.degree_status.to_lowercase().contains("non degree") {
                non_degree_set.insert(course.code.to_uppercase());
            }
            if is_semester_table {
                current_semester.courses.push(course);
            } else {
                all_courses.push(course);
            }
        }
    }

    // Outside registration periods the <li> list is gone; fall back to
    // naming departments after the course-code prefixes.
    if departments.is_empty() && !all_courses.is_empty() {
        for course in &all_courses {
            let prefix: String = course
                .code
                .chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect::<String>()
                .to_uppercase();
            let Some((_, dept)) = PREFIX_DEPARTMENTS.iter().find(|(p, _)| *p == prefix) else {
                continue;
            };
            if !departments.iter().any(|d| d == dept) {
                departments.push(dept.to_string());
            }
        }
    }

    CourseRegistration {
        current_semester,
        all_courses,
        total_confirmed_credits,
        departments,
        non_degree_set,
    }
}

fn capture_f64(regex: &Regex, text: &str) -> f64 {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

fn row_text(row: ElementRef) -> String {
    row.text().collect::<String>().trim().to_string()
}
