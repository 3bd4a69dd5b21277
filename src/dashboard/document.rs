use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, Result};

use super::table::KeyedTable;

pub const CONTAINER_CLASS: &str = "days-grid";
pub const PASSWORDS_TABLE: &str = "passwords";
pub const PDF_FILES_TABLE: &str = "pdfFiles";

fn div_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<div\b[^>]*?\bclass\s*=\s*["']([^"']*)["'][^>]*>"#).expect("valid regex")
    })
}

fn div_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(/?)div\b[^>]*>").expect("valid regex"))
}

fn card_unlock() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"showPasswordModal\(\s*'day(\d+)'").expect("valid regex"))
}

fn day_mention() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Day (\d+)").expect("valid regex"))
}

/// Next unused day: one past the highest `Day N` mentioned anywhere in the
/// dashboard, or `fallback` when there is none. Numbers with no successor
/// in range are ignored.
pub fn next_day_number(html: &str, fallback: u32) -> u32 {
    day_mention()
        .captures_iter(html)
        .filter_map(|c| c[1].parse::<u32>().ok()?.checked_add(1))
        .max()
        .unwrap_or(fallback)
}

/// The dashboard page, split into the parts a merge touches: the card
/// container and the two keyed tables. A merge only inserts text; every
/// byte already in the page is carried through.
#[derive(Debug, Clone)]
pub struct DashboardDocument {
    source: String,
    /// Where new cards go: start of the container's closing-tag line.
    insert_at: usize,
    /// Days of the cards already in the container, in document order.
    card_days: Vec<u32>,
    new_cards: Vec<String>,
    pub passwords: Option<KeyedTable>,
    pub pdf_files: Option<KeyedTable>,
    series_day: Option<u32>,
}

impl DashboardDocument {
    pub fn parse(source: String) -> Result<Self> {
        let container = locate_container(&source).ok_or_else(|| {
            AppError::Dashboard(format!("could not find .{} element", CONTAINER_CLASS))
        })?;

        let card_days = card_unlock()
            .captures_iter(&source[container.clone()])
            .filter_map(|c| c[1].parse().ok())
            .collect();

        let insert_at = line_start_if_blank(&source, container.end);
        let passwords = KeyedTable::locate(&source, PASSWORDS_TABLE);
        let pdf_files = KeyedTable::locate(&source, PDF_FILES_TABLE);

        Ok(Self {
            source,
            insert_at,
            card_days,
            new_cards: Vec::new(),
            passwords,
            pdf_files,
            series_day: None,
        })
    }

    pub fn card_days(&self) -> &[u32] {
        &self.card_days
    }

    /// Every day that already has a card or a table entry.
    pub fn existing_days(&self) -> BTreeSet<u32> {
        let mut days: BTreeSet<u32> = self.card_days.iter().copied().collect();
        for table in [&self.passwords, &self.pdf_files].into_iter().flatten() {
            days.extend(table.days());
        }
        days
    }

    pub fn push_card(&mut self, day: u32, html: String) {
        self.card_days.push(day);
        self.new_cards.push(html);
    }

    pub fn set_series_day(&mut self, day: u32) {
        self.series_day = Some(day);
    }

    /// Serialize the document with the pending cards and table changes.
    pub fn render(&self) -> String {
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();

        if !self.new_cards.is_empty() {
            let mut cards = String::new();
            if self.insert_at > 0 && !self.source[..self.insert_at].ends_with('\n') {
                cards.push('\n');
            }
            for card in &self.new_cards {
                cards.push_str(card);
            }
            edits.push((self.insert_at..self.insert_at, cards));
        }

        for table in [&self.passwords, &self.pdf_files].into_iter().flatten() {
            edits.extend(table.edits(&self.source));
        }

        if let Some(day) = self.series_day {
            edits.extend(series_title_edits(&self.source, day));
        }

        edits.sort_by_key(|(range, _)| range.start);

        let mut out = String::with_capacity(self.source.len() + 4096);
        let mut cursor = 0;
        for (range, text) in edits {
            if range.start < cursor {
                continue;
            }
            out.push_str(&self.source[cursor..range.start]);
            out.push_str(&text);
            cursor = range.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

/// Inner range of the first `div` carrying the container class, from the
/// end of its opening tag to the start of its matching `</div>`.
fn locate_container(source: &str) -> Option<Range<usize>> {
    let open = div_open().captures_iter(source).find(|c| {
        c.get(1)
            .is_some_and(|class| class.as_str().split_whitespace().any(|n| n == CONTAINER_CLASS))
    })?;
    let body_start = open.get(0)?.end();

    let mut depth = 1usize;
    for tag in div_tag().captures_iter(&source[body_start..]) {
        let whole = tag.get(0)?;
        if &tag[1] == "/" {
            depth -= 1;
            if depth == 0 {
                return Some(body_start..body_start + whole.start());
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

fn line_start_if_blank(source: &str, pos: usize) -> usize {
    let line_start = source[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if source[line_start..pos].chars().all(char::is_whitespace) {
        line_start
    } else {
        pos
    }
}

fn series_title_edits(source: &str, day: u32) -> Vec<(Range<usize>, String)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(\d+)-Day Career Acceleration Series").expect("valid regex")
    });
    re.captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| (m.range(), day.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fixtures::PAGE;

    #[test]
    fn test_parse_locates_container_cards_and_tables() {
        let doc = DashboardDocument::parse(PAGE.to_string()).unwrap();

        assert_eq!(doc.card_days(), &[9, 10]);

        let passwords = doc.passwords.as_ref().unwrap();
        let keys: Vec<&str> = passwords.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["day9", "day10"]);
        assert_eq!(passwords.get("day10").unwrap().raw, "FOCUS");

        let pdfs = doc.pdf_files.as_ref().unwrap();
        assert_eq!(pdfs.get("day9").unwrap().quote, Some('"'));
        assert_eq!(
            doc.existing_days().into_iter().collect::<Vec<_>>(),
            vec![9, 10]
        );
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let err = DashboardDocument::parse("<div class=\"grid\"></div>".to_string()).unwrap_err();
        assert!(matches!(err, AppError::Dashboard(_)));
    }

    #[test]
    fn test_unclosed_container_is_an_error() {
        let err = DashboardDocument::parse("<div class=\"days-grid\"><div>".to_string()).unwrap_err();
        assert!(matches!(err, AppError::Dashboard(_)));
    }

    #[test]
    fn test_render_without_changes_is_identity() {
        let doc = DashboardDocument::parse(PAGE.to_string()).unwrap();
        assert_eq!(doc.render(), PAGE);
    }

    #[test]
    fn test_unreadable_table_is_treated_as_missing() {
        let page = PAGE.replace("day9: 'ANCHOR',", "...defaults,");
        let doc = DashboardDocument::parse(page).unwrap();

        assert!(doc.passwords.is_none());
        assert!(doc.pdf_files.is_some());
    }

    #[test]
    fn test_cards_land_before_container_close() {
        let mut doc = DashboardDocument::parse(PAGE.to_string()).unwrap();
        doc.push_card(11, "                <!-- Day 11 -->\n".to_string());
        let out = doc.render();

        let new_card = out.find("<!-- Day 11 -->").unwrap();
        let old_card = out.find("<!-- Day 10 -->").unwrap();
        let footer = out.find("<div class=\"footer\">").unwrap();
        assert!(old_card < new_card && new_card < footer);
        assert!(out.contains("<!-- Day 11 -->\n        </div>\n        <div class=\"footer\">"));
    }

    #[test]
    fn test_next_day_number() {
        assert_eq!(next_day_number(PAGE, 11), 100);
        assert_eq!(next_day_number("<p>Day 3</p><p>Day 12</p>", 11), 13);
        assert_eq!(next_day_number("no days", 11), 11);
    }

    #[test]
    fn test_next_day_number_ignores_days_at_the_top_of_the_range() {
        assert_eq!(next_day_number("Day 4294967295", 11), 11);
        assert_eq!(next_day_number("Day 4294967295 and Day 12", 11), 13);
        assert_eq!(next_day_number("Day 4294967294", 11), u32::MAX);
        assert_eq!(next_day_number("Day 99999999999", 11), 11);
    }

    #[test]
    fn test_series_title_is_rewritten_when_requested() {
        let mut doc = DashboardDocument::parse(PAGE.to_string()).unwrap();
        doc.set_series_day(12);
        assert!(doc.render().contains("<h2>12-Day Career Acceleration Series</h2>"));
    }
}
