//! Authenticated homepage parsing: student name, mentor card, news ticker
//! and profile photo.

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use url::Url;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static MARQUEE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("marquee").unwrap());
static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

// "Welcome! SHANAKA M.W.I.      [ Change My Password ]"
static WELCOME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Welcome!\s*([A-Z][A-Z\s.]+)").unwrap());
// The ticker joins items with ":::News:::" or runs of spaces
static TICKER_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":::News:::|\s{3,}").unwrap());

/// Contact card of the student's assigned mentor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    pub name: String,
    pub designation: String,
    pub department: String,
    pub email: String,
    pub internal_tp: String,
    pub residence: String,
    pub mobile: String,
}

/// Everything scraped off the authenticated homepage.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeData {
    pub student_name: String,
    pub mentor: Mentor,
    pub notices: Vec<String>,
    pub photo_url: String,
}

/// Parses the authenticated homepage (`index.php`).
pub fn parse_home_html(html: &str, base_url: &Url) -> HomeData {
    let document = Html::parse_document(html);
    let body_text = document
        .select(&BODY)
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default();

    let student_name = WELCOME
        .captures(&body_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let mut mentor = Mentor::default();
    for table in document.select(&TABLE) {
        let header = table
            .select(&HEADER_CELL)
            .next()
            .map(|th| th.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if !header.contains("Mentor") {
            continue;
        }
        for row in table.select(&ROW) {
            let cells: Vec<_> = row.select(&CELL).collect();
            if cells.len() < 2 {
                continue;
            }
            let label = cells[0]
                .text()
                .collect::<String>()
                .trim()
                .to_lowercase();
            let raw: String = cells[1].text().collect();
            let value = raw
                .trim()
                .strip_prefix(':')
                .unwrap_or(raw.trim())
                .trim()
                .to_string();
            if label.contains("name") {
                mentor.name = value;
            } else if label.contains("designation") {
                mentor.designation = value;
            } else if label.contains("department") {
                mentor.department = value;
            } else if label.contains("e-mail") || label.contains("email") {
                mentor.email = value;
            } else if label.contains("internal") {
                mentor.internal_tp = value;
            } else if label.contains("residence") {
                mentor.residence = value;
            } else if label.contains("mobile") {
                mentor.mobile = value;
            }
        }
    }

    let ticker: String = document
        .select(&MARQUEE)
        .next()
        .map(|m| m.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let notices = if ticker.is_empty() {
        Vec::new()
    } else {
        TICKER_SEPARATOR
            .split(&ticker)
            .map(str::trim)
            .filter(|item| item.len() > 5)
            .map(str::to_string)
            .collect()
    };

    let mut photo_url = String::new();
    for img in document.select(&IMAGE) {
        let src = img.value().attr("src").unwrap_or_default();
        if src.contains("user_pictures") || src.contains("student_std_pics") {
            photo_url = resolve_photo_url(src, base_url);
        }
    }

    HomeData {
        student_name,
        mentor,
        notices,
        photo_url,
    }
}

/// Resolves a profile-photo `src` against the portal.
///
/// `../`-relative sources climb out of the portal directory to the host
/// root; plain relative ones live next to `index.php`.
fn resolve_photo_url(src: &str, base_url: &Url) -> String {
    let origin = base_url.origin().ascii_serialization();
    if src.starts_with("http") {
        src.to_string()
    } else if let Some(rest) = src.strip_prefix("../") {
        format!("{origin}/{rest}")
    } else if src.starts_with('/') {
        format!("{origin}{src}")
    } else {
        format!("{}/{src}", base_url.as_str().trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://paravi.ruh.ac.lk/fosmis2019").unwrap()
    }

    const SAMPLE_HTML: &str = r#"
        <html><body>
            <div>Welcome! SHANAKA M.W.I.      [ Change My Password ]</div>
            <table>
                <tr><th>Your Mentor's Details</th></tr>
                <tr><td>Name</td><td>: Dr. A. Perera</td></tr>
                <tr><td>Designation</td><td>: Senior Lecturer</td></tr>
                <tr><td>Department</td><td>: Mathematics</td></tr>
                <tr><td>E-Mail</td><td>: perera@maths.ruh.ac.lk</td></tr>
                <tr><td>Internal TP</td><td>: 4501</td></tr>
                <tr><td>Residence</td><td>: 091-1234567</td></tr>
                <tr><td>Mobile</td><td>: 071-1234567</td></tr>
            </table>
            <marquee>Exam applications close Friday:::News:::Library open till 8pm</marquee>
            <img src="banner.png">
            <img src="../user_pictures/sc12345.jpg">
        </body></html>
    "#;

    #[test]
    fn test_student_name_from_welcome_banner() {
        let data = parse_home_html(SAMPLE_HTML, &base());
        assert_eq!(data.student_name, "SHANAKA M.W.I.");
    }

    #[test]
    fn test_mentor_card_labels() {
        let data = parse_home_html(SAMPLE_HTML, &base());
        assert_eq!(data.mentor.name, "Dr. A. Perera");
        assert_eq!(data.mentor.designation, "Senior Lecturer");
        assert_eq!(data.mentor.department, "Mathematics");
        assert_eq!(data.mentor.email, "perera@maths.ruh.ac.lk");
        assert_eq!(data.mentor.internal_tp, "4501");
        assert_eq!(data.mentor.residence, "091-1234567");
        assert_eq!(data.mentor.mobile, "071-1234567");
    }

    #[test]
    fn test_ticker_split_on_news_marker() {
        let data = parse_home_html(SAMPLE_HTML, &base());
        assert_eq!(
            data.notices,
            ["Exam applications close Friday", "Library open till 8pm"]
        );
    }

    #[test]
    fn test_ticker_split_on_space_runs() {
        let html = r#"<marquee>First announcement here     Second announcement there</marquee>"#;
        let data = parse_home_html(html, &base());
        assert_eq!(
            data.notices,
            ["First announcement here", "Second announcement there"]
        );
    }

    #[test]
    fn test_photo_url_resolved_to_host_root() {
        let data = parse_home_html(SAMPLE_HTML, &base());
        assert_eq!(
            data.photo_url,
            "https://paravi.ruh.ac.lk/user_pictures/sc12345.jpg"
        );
    }

    #[test]
    fn test_photo_url_variants() {
        let base = base();
        assert_eq!(
            resolve_photo_url("https://cdn.example.com/p.jpg", &base),
            "https://cdn.example.com/p.jpg"
        );
        assert_eq!(
            resolve_photo_url("/student_std_pics/p.jpg", &base),
            "https://paravi.ruh.ac.lk/student_std_pics/p.jpg"
        );
        assert_eq!(
            resolve_photo_url("student_std_pics/p.jpg", &base),
            "https://paravi.ruh.ac.lk/fosmis2019/student_std_pics/p.jpg"
        );
    }

    #[test]
    fn test_empty_page() {
        let data = parse_home_html("", &base());
        assert_eq!(data.student_name, "");
        assert_eq!(data.mentor, Mentor::default());
        assert!(data.notices.is_empty());
        assert_eq!(data.photo_url, "");
    }
}
