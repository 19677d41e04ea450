// src/specs/badges.rs
//
// Stack Exchange `/help/badges/<id>?page=<n>` listing.
//
// Layout relied on:
// - last `<span class="page-numbers">N</span>` is the page count (absent → 1 page)
// - rows sit between `<div class="single-badge-table` and `<div class="pager`
// - each row starts with `<div class="single-badge-row-`, holds the user link
//   `<a href="/users/<id>/…`, `Awarded <span title="YYYY-MM-DD HH:MM:SSZ"` and
//   the reason in `<div class="single-badge-reason">…</div>`

use crate::core::html::{after_last_until, between, pieces_after, region};
use crate::error::{Error, Result};
use crate::event::{parse_utc_time, Award, Event};

use super::{PageParser, ParsedPage};

const PAGE_NUMBERS: &str = r#"<span class="page-numbers">"#;
const TABLE_START: &str = r#"<div class="single-badge-table"#;
const TABLE_END: &str = r#"<div class="pager"#;
const ROW_MARKER: &str = r#"<div class="single-badge-row-"#;
const USER_LINK: &str = r#"<a href="/users/"#;
const AWARDED: &str = r#"Awarded <span title=""#;
const REASON_OPEN: &str = r#"<div class="single-badge-reason">"#;
const REASON_CLOSE: &str = "</div>";

#[derive(Clone, Debug)]
pub struct BadgePageParser {
    row_marker: &'static str,
}

impl Default for BadgePageParser {
    fn default() -> Self {
        Self { row_marker: ROW_MARKER }
    }
}

impl BadgePageParser {
    /// Rows split on a different marker, for listings that wrap rows differently.
    pub fn with_row_marker(row_marker: &'static str) -> Self {
        Self { row_marker }
    }
}

impl PageParser for BadgePageParser {
    fn parse(&self, category_id: u64, page: u32, raw: &str) -> Result<ParsedPage> {
        let page_count = page_count(raw).map_err(|reason| Error::Parse { page, reason })?;

        let table = region(raw, TABLE_START, TABLE_END);
        let mut awards = Vec::new();
        for (i, row) in pieces_after(table, self.row_marker).enumerate() {
            let award = parse_row(category_id, row)
                .map_err(|reason| Error::Parse { page, reason: format!("row {}: {reason}", i + 1) })?;
            awards.push(award);
        }

        Ok(ParsedPage { page_count, awards })
    }
}

fn page_count(raw: &str) -> std::result::Result<u32, String> {
    match after_last_until(raw, PAGE_NUMBERS, "<").map(str::trim) {
        None | Some("") => Ok(1),
        Some(n) => n.parse().map_err(|_| format!("bad page count {n:?}")),
    }
}

fn parse_row(category_id: u64, row: &str) -> std::result::Result<Award, String> {
    let user = between(row, USER_LINK, "/").ok_or("no user link")?;
    let subject_id = user.parse::<u64>().map_err(|_| format!("bad user id {user:?}"))?;

    let when = between(row, AWARDED, "\"").ok_or("no award time")?;
    let timestamp = parse_utc_time(when).ok_or_else(|| format!("bad award time {when:?}"))?;

    let reason = between(row, REASON_OPEN, REASON_CLOSE)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from);

    Ok(Award::new(Event::new(category_id, subject_id, timestamp), reason))
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Render a listing page the way the site lays it out.
    /// `rows`: (user id, award time text, reason html).
    pub fn listing_page(rows: &[(u64, &str, &str)], page_count: Option<u32>) -> String {
        let mut html = s!("<html><body><div id=\"mainbar\"><div class=\"single-badge-table\">");
        for (user, when, reason) in rows {
            html.push_str(&format!(
                "<div class=\"single-badge-row-user\">\
                   <a href=\"/users/{user}/someone\">someone</a>\
                   <div class=\"single-badge-reason\">\n  {reason}\n</div>\
                   <div class=\"single-badge-awarded\">Awarded <span title=\"{when}\" class=\"relativetime\">Apr 20</span></div>\
                 </div>"
            ));
        }
        html.push_str("</div><div class=\"pager fl\">");
        if let Some(n) = page_count {
            for p in 1..=n {
                html.push_str(&format!("<a href=\"?page={p}\"><span class=\"page-numbers\">{p}</span></a>"));
            }
            html.push_str("<span class=\"page-numbers next\"> next</span>");
        }
        html.push_str("</div></div></body></html>");
        html
    }
}
