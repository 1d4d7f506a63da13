//! Grading-scheme reference tables consulted throughout the results pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// The six department buckets tracked for per-subject-area GPAs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Department {
    Math,
    Chem,
    Phy,
    Zoo,
    Bot,
    Cs,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Math,
        Department::Chem,
        Department::Phy,
        Department::Zoo,
        Department::Bot,
        Department::Cs,
    ];

    /// Short lowercase key, used in logs.
    pub fn key(self) -> &'static str {
        match self {
            Department::Math => "math",
            Department::Chem => "chem",
            Department::Phy => "phy",
            Department::Zoo => "zoo",
            Department::Bot => "bot",
            Department::Cs => "cs",
        }
    }
}

/// Immutable grading scheme: grade scale, credit suffixes, department
/// prefixes and the fixed non-credit subject list.
///
/// Built once at startup (see [`GradingScheme::shared`]) and passed by
/// reference into the ledger/accumulator functions so tests can inject
/// variants.
#[derive(Debug, Clone)]
pub struct GradingScheme {
    grade_scale: HashMap<String, f64>,
    credit_map: HashMap<char, f64>,
    /// Ordered prefix table; a code belongs to the first matching entry.
    department_prefixes: Vec<(Department, Vec<String>)>,
    non_credit_subjects: HashSet<String>,
}

static STANDARD: LazyLock<GradingScheme> = LazyLock::new(GradingScheme::fosmis);

impl GradingScheme {
    /// The grading scheme used by the Faculty of Science results pages.
    pub fn fosmis() -> Self {
        let grade_scale = [
            ("A+", 4.0),
            ("A", 4.0),
            ("A-", 3.7),
            ("B+", 3.3),
            ("B", 3.0),
            ("B-", 2.7),
            ("C+", 2.3),
            ("C", 2.0),
            ("C-", 1.7),
            ("D+", 1.3),
            ("D", 1.0),
            ("E", 0.0),
            ("E*", 0.0),
            ("E+", 0.0),
            ("E-", 0.0),
            ("F", 0.0),
            ("MC", 0.0),
        ]
        .into_iter()
        .map(|(grade, points)| (grade.to_string(), points))
        .collect();

        // The portal prints fractional credits as Greek letters; manually
        // entered subjects use Latin substitutes for the same weights.
        let credit_map = [
            ('0', 0.0),
            ('1', 1.0),
            ('2', 2.0),
            ('3', 3.0),
            ('4', 4.0),
            ('5', 5.0),
            ('6', 6.0),
            ('\u{03B1}', 1.5),  // α
            ('\u{03B2}', 2.5),  // β
            ('\u{03B4}', 1.25), // δ
            ('a', 1.5),
            ('b', 2.5),
            ('d', 1.25),
        ]
        .into_iter()
        .collect();

        let department_prefixes = vec![
            (Department::Math, vec!["AMT", "IMT", "MAT"]),
            (Department::Chem, vec!["CHE"]),
            (Department::Phy, vec!["PHY"]),
            (Department::Zoo, vec!["ZOO"]),
            (Department::Bot, vec!["BOT"]),
            (Department::Cs, vec!["COM", "CSC"]),
        ]
        .into_iter()
        .map(|(dept, prefixes)| {
            (
                dept,
                prefixes.into_iter().map(str::to_string).collect::<Vec<_>>(),
            )
        })
        .collect();

        let non_credit_subjects = [
            "MAT1142", "ICT1B13", "ENG1201", "ICT2B13", "ENG2201", "ENG3B10",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            grade_scale,
            credit_map,
            department_prefixes,
            non_credit_subjects,
        }
    }

    /// Process-wide shared instance.
    pub fn shared() -> &'static GradingScheme {
        &STANDARD
    }

    /// Grade-point value for a grade symbol, or `None` for symbols the
    /// scheme does not recognize.
    pub fn grade_points(&self, grade: &str) -> Option<f64> {
        self.grade_scale.get(grade).copied()
    }

    pub fn is_known_grade(&self, grade: &str) -> bool {
        self.grade_scale.contains_key(grade)
    }

    /// Credit weight derived from the last character of a subject code.
    ///
    /// Unrecognized trailing characters carry zero credit; the lookup is
    /// case-sensitive on purpose (lowercase `a`/`b`/`d` are fractional
    /// credit substitutes, their uppercase forms are nothing).
    pub fn credit_for(&self, subject_code: &str) -> f64 {
        subject_code
            .chars()
            .last()
            .and_then(|c| self.credit_map.get(&c).copied())
            .unwrap_or(0.0)
    }

    /// Department bucket for a subject code, matched case-insensitively
    /// against the ordered prefix table. First match wins.
    pub fn department_of(&self, subject_code: &str) -> Option<Department> {
        let upper = subject_code.to_uppercase();
        self.department_prefixes
            .iter()
            .find(|(_, prefixes)| prefixes.iter().any(|p| upper.starts_with(p.as_str())))
            .map(|(dept, _)| *dept)
    }

    /// Whether the code is in the fixed non-credit list (any case).
    pub fn is_non_credit(&self, subject_code: &str) -> bool {
        self.non_credit_subjects
            .contains(&subject_code.to_uppercase())
    }
}

impl Default for GradingScheme {
    fn default() -> Self {
        Self::fosmis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_points_lookup() {
        let scheme = GradingScheme::fosmis();
        assert_eq!(scheme.grade_points("A+"), Some(4.0));
        assert_eq!(scheme.grade_points("C-"), Some(1.7));
        assert_eq!(scheme.grade_points("E*"), Some(0.0));
        assert_eq!(scheme.grade_points("MC"), Some(0.0));
        assert_eq!(scheme.grade_points("X"), None);
        assert_eq!(scheme.grade_points("a+"), None);
    }

    #[test]
    fn test_credit_suffixes() {
        let scheme = GradingScheme::fosmis();
        assert_eq!(scheme.credit_for("AMT1232"), 2.0);
        assert_eq!(scheme.credit_for("MAT3160"), 0.0);
        assert_eq!(scheme.credit_for("MAT112\u{03B4}"), 1.25);
        assert_eq!(scheme.credit_for("CSC211\u{03B2}"), 2.5);
        assert_eq!(scheme.credit_for("PHY311a"), 1.5);
        assert_eq!(scheme.credit_for(""), 0.0);
    }

    #[test]
    fn test_credit_suffix_case_is_deliberate() {
        // Uppercase A/B/D are not credit symbols, only their lowercase
        // (and Greek) forms are.
        let scheme = GradingScheme::fosmis();
        assert_eq!(scheme.credit_for("PHY311A"), 0.0);
        assert_eq!(scheme.credit_for("PHY311B"), 0.0);
        assert_eq!(scheme.credit_for("PHY311D"), 0.0);
    }

    #[test]
    fn test_department_prefix_match() {
        let scheme = GradingScheme::fosmis();
        assert_eq!(scheme.department_of("AMT1232"), Some(Department::Math));
        assert_eq!(scheme.department_of("imt2213"), Some(Department::Math));
        assert_eq!(scheme.department_of("CHE1013"), Some(Department::Chem));
        assert_eq!(scheme.department_of("CSC1112"), Some(Department::Cs));
        assert_eq!(scheme.department_of("COM1112"), Some(Department::Cs));
        assert_eq!(scheme.department_of("ENG1201"), None);
        assert_eq!(scheme.department_of(""), None);
    }

    #[test]
    fn test_non_credit_list_is_case_insensitive() {
        let scheme = GradingScheme::fosmis();
        assert!(scheme.is_non_credit("MAT1142"));
        assert!(scheme.is_non_credit("mat1142"));
        assert!(scheme.is_non_credit("Ict1b13"));
        assert!(!scheme.is_non_credit("MAT1132"));
    }
}
