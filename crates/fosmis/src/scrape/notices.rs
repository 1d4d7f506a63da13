//! Notice-board page parsing.

use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// The previous-notices table goes back years (6000+ rows); only the
/// newest slice is worth shipping to the client.
const PREVIOUS_NOTICES_LIMIT: usize = 50;

/// One notice-board entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: u32,
    pub date: String,
    pub time: String,
    pub title: String,
    pub file_url: String,
    pub file_type: String,
}

/// The notice board, split the way the page renders it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeBoard {
    pub recent_notices: Vec<Notice>,
    pub previous_notices: Vec<Notice>,
}

/// Parses the notices page (`form_53_a.php`).
///
/// The page holds three tables: a layout wrapper, "Most Recent Notices"
/// and "Previous Notices". Download links are relative to `/forms/`, so
/// they are resolved against the configured portal base URL.
pub fn parse_notices_html(html: &str, base_url: &str) -> NoticeBoard {
    let document = Html::parse_document(html);
    let tables: Vec<_> = document.select(&TABLE).collect();

    let recent_notices = tables
        .get(1)
        .map(|table| parse_notice_table(table, None, base_url))
        .unwrap_or_default();
    let previous_notices = tables
        .get(2)
        .map(|table| parse_notice_table(table, Some(PREVIOUS_NOTICES_LIMIT), base_url))
        .unwrap_or_default();

    NoticeBoard {
        recent_notices,
        previous_notices,
    }
}

fn parse_notice_table(
    table: &scraper::ElementRef,
    limit: Option<usize>,
    base_url: &str,
) -> Vec<Notice> {
    let mut notices = Vec::new();
    for row in table.select(&ROW).skip(1) {
        if limit.is_some_and(|limit| notices.len() >= limit) {
            break;
        }
        let cells: Vec<_> = row.select(&CELL).collect();
        if cells.len() < 4 {
            continue;
        }

        let date_time: String = cells[1].text().collect::<String>().trim().to_string();
        let title: String = cells[2].text().collect::<String>().trim().to_string();
        let href = cells[3]
            .select(&LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();
        if title.is_empty() || href.is_empty() {
            continue;
        }

        // "2026-02-13/21:29"
        let (date, time) = date_time.split_once('/').unwrap_or((date_time.as_str(), ""));

        notices.push(Notice {
            id: notices.len() as u32 + 1,
            date: date.to_string(),
            time: time.to_string(),
            title,
            file_url: resolve_file_url(href, base_url),
            file_type: file_type_for(href).to_string(),
        });
    }
    notices
}

/// Resolves a notice link to an absolute URL. Links usually look like
/// `../downloads/Notices/file.pdf`, relative to the portal's forms page.
fn resolve_file_url(href: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if let Some(filename) = href.strip_prefix("../downloads/Notices/") {
        format!("{base}/downloads/Notices/{filename}")
    } else if !href.starts_with("http") {
        format!("{base}/{}", href.strip_prefix("../").unwrap_or(href))
    } else {
        href.to_string()
    }
}

/// Maps a link's extension to the file-type tag the frontend switches on.
fn file_type_for(href: &str) -> &'static str {
    let ext = href
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let ext = ext.split(['?', '#']).next().unwrap_or_default();
    match ext {
        "pdf" => "pdf",
        "docx" | "doc" => "docx",
        "html" | "htm" => "html",
        "jpeg" | "jfif" | "jpg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://paravi.ruh.ac.lk/fosmis2019";

    fn page(recent_rows: &str, previous_rows: &str) -> String {
        format!(
            r#"<html><body>
                <table><tr><td>layout wrapper</td></tr></table>
                <table>
                    <tr><th>#</th><th>Date</th><th>Title</th><th>File</th></tr>
                    {recent_rows}
                </table>
                <table>
                    <tr><th>#</th><th>Date</th><th>Title</th><th>File</th></tr>
                    {previous_rows}
                </table>
            </body></html>"#
        )
    }

    #[test]
    fn test_parses_both_tables() {
        let html = page(
            r#"<tr><td>1</td><td>2026-02-13/21:29</td><td>Exam Timetable</td>
                <td><a href="../downloads/Notices/tt.pdf">view</a></td></tr>"#,
            r#"<tr><td>1</td><td>2025-11-01/09:00</td><td>Older Notice</td>
                <td><a href="https://paravi.ruh.ac.lk/fosmis2019/downloads/Notices/old.docx">view</a></td></tr>"#,
        );
        let board = parse_notices_html(&html, BASE);

        assert_eq!(board.recent_notices.len(), 1);
        let notice = &board.recent_notices[0];
        assert_eq!(notice.id, 1);
        assert_eq!(notice.date, "2026-02-13");
        assert_eq!(notice.time, "21:29");
        assert_eq!(notice.title, "Exam Timetable");
        assert_eq!(
            notice.file_url,
            "https://paravi.ruh.ac.lk/fosmis2019/downloads/Notices/tt.pdf"
        );
        assert_eq!(notice.file_type, "pdf");

        assert_eq!(board.previous_notices.len(), 1);
        assert_eq!(board.previous_notices[0].file_type, "docx");
    }

    #[test]
    fn test_skips_incomplete_rows_and_renumbers() {
        let html = page(
            r#"<tr><td>1</td><td>2026-01-01/08:00</td><td></td><td><a href="a.pdf">x</a></td></tr>
               <tr><td>2</td><td>2026-01-02/08:00</td><td>No link here</td><td>plain</td></tr>
               <tr><td>3</td><td>2026-01-03/08:00</td><td>Kept</td><td><a href="b.pdf">x</a></td></tr>"#,
            "",
        );
        let board = parse_notices_html(&html, BASE);
        assert_eq!(board.recent_notices.len(), 1);
        assert_eq!(board.recent_notices[0].id, 1);
        assert_eq!(board.recent_notices[0].title, "Kept");
    }

    #[test]
    fn test_previous_notices_capped() {
        let mut rows = String::new();
        for i in 0..60 {
            rows.push_str(&format!(
                r#"<tr><td>{i}</td><td>2025-01-01/08:00</td><td>Notice {i}</td>
                    <td><a href="n{i}.pdf">x</a></td></tr>"#
            ));
        }
        let board = parse_notices_html(&page("", &rows), BASE);
        assert!(board.recent_notices.is_empty());
        assert_eq!(board.previous_notices.len(), 50);
        assert_eq!(board.previous_notices[49].id, 50);
    }

    #[test]
    fn test_date_without_time_component() {
        let html = page(
            r#"<tr><td>1</td><td>2026-02-13</td><td>No Time</td>
                <td><a href="x.pdf">x</a></td></tr>"#,
            "",
        );
        let board = parse_notices_html(&html, BASE);
        assert_eq!(board.recent_notices[0].date, "2026-02-13");
        assert_eq!(board.recent_notices[0].time, "");
    }

    #[test]
    fn test_relative_link_outside_downloads() {
        let html = page(
            r#"<tr><td>1</td><td>2026-02-13/10:00</td><td>Photo</td>
                <td><a href="../gallery/pic.jfif">x</a></td></tr>"#,
            "",
        );
        let board = parse_notices_html(&html, BASE);
        let notice = &board.recent_notices[0];
        assert_eq!(
            notice.file_url,
            "https://paravi.ruh.ac.lk/fosmis2019/gallery/pic.jfif"
        );
        assert_eq!(notice.file_type, "jpg");
    }

    #[test]
    fn test_file_type_mapping() {
        assert_eq!(file_type_for("a.pdf"), "pdf");
        assert_eq!(file_type_for("a.DOC"), "docx");
        assert_eq!(file_type_for("a.htm"), "html");
        assert_eq!(file_type_for("a.webp"), "webp");
        assert_eq!(file_type_for("a.jpeg?v=2"), "jpg");
        assert_eq!(file_type_for("no-extension"), "other");
    }

    #[test]
    fn test_missing_tables() {
        let board = parse_notices_html("<table></table>", BASE);
        assert!(board.recent_notices.is_empty());
        assert!(board.previous_notices.is_empty());
    }
}
