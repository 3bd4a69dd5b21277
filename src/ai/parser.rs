//! Turns the model's field-tagged reply into [`Resource`] records.
//!
//! The reply is split into sections on `---` lines. Each section is read
//! through [`FIELD_RULES`]: one entry per label, how its value is captured
//! and what it defaults to. Adding a field means adding a row there.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Resource, DEFAULT_PASSWORD};

/// Value used when a section has no `FULL_CONTENT`. Sections carrying it
/// are never published.
pub const MISSING_CONTENT: &str = "Content not found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Day,
    Category,
    Title,
    Hook,
    Description,
    KeyPoint(u8),
    Password,
    FullContent,
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    /// Rest of the label's line.
    Line,
    /// First alphanumeric run on the label's line, upper-cased.
    Token,
    /// Everything after the label to the end of the section.
    Rest,
}

struct FieldRule {
    field: Field,
    label: &'static str,
    capture: Capture,
    default: Option<&'static str>,
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule { field: Field::Day, label: "DAY", capture: Capture::Line, default: None },
    FieldRule { field: Field::Category, label: "CATEGORY", capture: Capture::Line, default: Some("Career") },
    FieldRule { field: Field::Title, label: "TITLE", capture: Capture::Line, default: Some("Untitled") },
    FieldRule { field: Field::Hook, label: "HOOK", capture: Capture::Line, default: Some("") },
    FieldRule { field: Field::Description, label: "DESCRIPTION", capture: Capture::Line, default: Some("") },
    FieldRule { field: Field::KeyPoint(1), label: "KEY_POINT_1", capture: Capture::Line, default: None },
    FieldRule { field: Field::KeyPoint(2), label: "KEY_POINT_2", capture: Capture::Line, default: None },
    FieldRule { field: Field::KeyPoint(3), label: "KEY_POINT_3", capture: Capture::Line, default: None },
    FieldRule { field: Field::Password, label: "PASSWORD", capture: Capture::Token, default: Some(DEFAULT_PASSWORD) },
    FieldRule { field: Field::FullContent, label: "FULL_CONTENT", capture: Capture::Rest, default: Some(MISSING_CONTENT) },
];

/// Leading decoration tolerated before a label (`**TITLE:**`, `- TITLE:`).
const LABEL_PREFIX: &str = r"^[ \t>#*_-]*";
const LABEL_SUFFIX: &str = r"[ \t]*[*_]*[ \t]*:[*_]*[ \t]*";

struct CompiledRule {
    field: Field,
    capture: Capture,
    pattern: Regex,
}

fn compiled_rules() -> &'static [CompiledRule] {
    static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        FIELD_RULES
            .iter()
            .map(|rule| {
                let label = regex::escape(rule.label);
                let source = match rule.capture {
                    Capture::Line | Capture::Token => {
                        format!(r"(?im){LABEL_PREFIX}{label}{LABEL_SUFFIX}(.*)$")
                    }
                    Capture::Rest => format!(r"(?ims){LABEL_PREFIX}{label}{LABEL_SUFFIX}(.*)\z"),
                };
                CompiledRule {
                    field: rule.field,
                    capture: rule.capture,
                    pattern: Regex::new(&source).expect("field pattern is valid"),
                }
            })
            .collect()
    })
}

fn delimiter() -> &'static Regex {
    static DELIMITER: OnceLock<Regex> = OnceLock::new();
    DELIMITER.get_or_init(|| Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*\r?$").expect("delimiter pattern is valid"))
}

fn default_for(field: Field) -> &'static str {
    FIELD_RULES
        .iter()
        .find(|rule| rule.field == field)
        .and_then(|rule| rule.default)
        .unwrap_or("")
}

/// Result of parsing one model reply.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub resources: Vec<Resource>,
    /// Non-empty sections rejected for missing title or content.
    pub dropped: usize,
}

/// Fields read from one section, before day assignment.
struct Section {
    fields: HashMap<Field, String>,
    explicit_day: Option<u32>,
}

impl Section {
    fn read(text: &str) -> Self {
        let mut fields = HashMap::new();
        for rule in compiled_rules() {
            // A label with an empty value does not shadow a later one.
            let value = rule
                .pattern
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|raw| match rule.capture {
                    Capture::Line => clean_line(raw.as_str()),
                    Capture::Token => first_token(raw.as_str()),
                    Capture::Rest => raw.as_str().trim().to_string(),
                })
                .find(|value| !value.is_empty());
            if let Some(value) = value {
                fields.insert(rule.field, value);
            }
        }

        let explicit_day = fields.get(&Field::Day).and_then(|v| parse_day(v));
        Self {
            fields,
            explicit_day,
        }
    }

    fn take(&mut self, field: Field) -> String {
        self.fields
            .remove(&field)
            .unwrap_or_else(|| default_for(field).to_string())
    }

    fn is_publishable(&self) -> bool {
        let has_title = self
            .fields
            .get(&Field::Title)
            .map(|t| !t.is_empty())
            .unwrap_or(!default_for(Field::Title).is_empty());
        let has_content = self
            .fields
            .get(&Field::FullContent)
            .is_some_and(|c| c != MISSING_CONTENT);
        has_title && has_content
    }

    fn into_resource(mut self, day: u32) -> Resource {
        let key_points = (1..=3)
            .filter_map(|n| self.fields.remove(&Field::KeyPoint(n)))
            .collect();
        Resource {
            day,
            category: self.take(Field::Category),
            title: self.take(Field::Title),
            hook: self.take(Field::Hook),
            description: self.take(Field::Description),
            key_points,
            password: self.take(Field::Password),
            full_content: self.take(Field::FullContent),
        }
    }
}

/// Parse a generation reply. Sections without a usable `DAY` get days from
/// a counter starting at `next_day` that skips every day claimed elsewhere
/// in the same reply.
pub fn parse_resources(text: &str, next_day: u32) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    let mut accepted = Vec::new();
    for chunk in delimiter().split(text) {
        if chunk.trim().is_empty() {
            continue;
        }
        let section = Section::read(chunk);
        if section.is_publishable() {
            accepted.push(section);
        } else {
            outcome.dropped += 1;
        }
    }

    let mut claimed: HashSet<u32> = accepted.iter().filter_map(|s| s.explicit_day).collect();
    let mut counter = next_day.max(1);

    for section in accepted {
        let day = match section.explicit_day {
            Some(day) => day,
            None => {
                let Some(day) = (counter..=u32::MAX).find(|day| !claimed.contains(day)) else {
                    outcome.dropped += 1;
                    continue;
                };
                claimed.insert(day);
                counter = day.saturating_add(1);
                day
            }
        };
        outcome.resources.push(section.into_resource(day));
    }

    outcome
}

fn clean_line(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '*' || c == '"')
        .trim()
        .to_string()
}

fn first_token(raw: &str) -> String {
    raw.split(|c: char| !c.is_alphanumeric())
        .find(|part| !part.is_empty())
        .map(|part| part.to_uppercase())
        .unwrap_or_default()
}

fn parse_day(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u32>().ok().filter(|day| *day > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_section(resource: &Resource) -> String {
        let mut out = format!(
            "DAY: {}\nCATEGORY: {}\nTITLE: {}\nHOOK: {}\nDESCRIPTION: {}\n",
            resource.day, resource.category, resource.title, resource.hook, resource.description
        );
        for (i, point) in resource.key_points.iter().enumerate() {
            out.push_str(&format!("KEY_POINT_{}: {}\n", i + 1, point));
        }
        out.push_str(&format!(
            "PASSWORD: {}\nFULL_CONTENT:\n{}\n",
            resource.password, resource.full_content
        ));
        out
    }

    const REPLY: &str = "Here are your three resources.

---
DAY: 11
CATEGORY: Negotiation
TITLE: Ask For More
HOOK: The first offer is never the best offer
DESCRIPTION: A counter-offer script that works.
KEY_POINT_1: Pause for five seconds
KEY_POINT_2: Anchor 15% above target
KEY_POINT_3: Trade, never concede
PASSWORD: anchor
FULL_CONTENT:
Most people accept the first number.

Here is the framework.
---
DAY: 12
CATEGORY: Communication
TITLE: Mirror Tactic
HOOK: Repeat their last three words
DESCRIPTION: Get people to keep talking.
KEY_POINT_1: Listen for the last words
PASSWORD: Mirror!
FULL_CONTENT:
Mirroring builds rapport.
---

[Repeat for Day 13]
";

    #[test]
    fn test_parses_tagged_sections_in_order() {
        let outcome = parse_resources(REPLY, 11);

        assert_eq!(outcome.resources.len(), 2);
        assert_eq!(outcome.dropped, 2);

        let first = &outcome.resources[0];
        assert_eq!(first.day, 11);
        assert_eq!(first.category, "Negotiation");
        assert_eq!(first.title, "Ask For More");
        assert_eq!(first.key_points.len(), 3);
        assert_eq!(first.password, "ANCHOR");
        assert_eq!(
            first.full_content,
            "Most people accept the first number.\n\nHere is the framework."
        );

        let second = &outcome.resources[1];
        assert_eq!(second.day, 12);
        assert_eq!(second.key_points, vec!["Listen for the last words"]);
        assert_eq!(second.password, "MIRROR");
        assert_eq!(second.full_content, "Mirroring builds rapport.");
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let outcome = parse_resources("FULL_CONTENT: Just a body.", 4);

        assert_eq!(outcome.resources.len(), 1);
        let resource = &outcome.resources[0];
        assert_eq!(resource.day, 4);
        assert_eq!(resource.category, "Career");
        assert_eq!(resource.title, "Untitled");
        assert_eq!(resource.hook, "");
        assert_eq!(resource.description, "");
        assert!(resource.key_points.is_empty());
        assert_eq!(resource.password, "ACCESS");
        assert_eq!(resource.full_content, "Just a body.");
    }

    #[test]
    fn test_labels_are_case_insensitive_and_tolerate_markdown() {
        let text = "**Title:** Salary Math\ncategory: Money\n- password: raise\nFull_Content:\nBody";
        let outcome = parse_resources(text, 1);

        let resource = &outcome.resources[0];
        assert_eq!(resource.title, "Salary Math");
        assert_eq!(resource.category, "Money");
        assert_eq!(resource.password, "RAISE");
        assert_eq!(resource.full_content, "Body");
    }

    #[test]
    fn test_first_match_wins() {
        let text = "TITLE: First\nTITLE: Second\nFULL_CONTENT: body";
        let outcome = parse_resources(text, 1);
        assert_eq!(outcome.resources[0].title, "First");
    }

    #[test]
    fn test_empty_label_falls_through_to_next_match() {
        let text = "TITLE:\n\nTITLE: Second Try\nPASSWORD: !!\nPASSWORD: key\nFULL_CONTENT: body";
        let outcome = parse_resources(text, 1);

        assert_eq!(outcome.resources[0].title, "Second Try");
        assert_eq!(outcome.resources[0].password, "KEY");
    }

    #[test]
    fn test_fallback_days_stop_at_the_last_day_number() {
        let text = "TITLE: A\nFULL_CONTENT: a\n---\nTITLE: B\nFULL_CONTENT: b";
        let outcome = parse_resources(text, u32::MAX);

        let days: Vec<u32> = outcome.resources.iter().map(|r| r.day).collect();
        assert_eq!(days, vec![u32::MAX]);
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_full_content_runs_to_section_end_only() {
        let text = "TITLE: A\nFULL_CONTENT:\nline one\nline two\n---\nTITLE: B\nFULL_CONTENT: other";
        let outcome = parse_resources(text, 1);

        assert_eq!(outcome.resources[0].full_content, "line one\nline two");
        assert_eq!(outcome.resources[1].full_content, "other");
    }

    #[test]
    fn test_fallback_days_skip_explicit_days() {
        let text = "TITLE: A\nFULL_CONTENT: a
---
DAY: 11
TITLE: B
FULL_CONTENT: b
---
DAY: not a number
TITLE: C
FULL_CONTENT: c
---
TITLE: D
FULL_CONTENT: d";
        let outcome = parse_resources(text, 10);
        let days: Vec<u32> = outcome.resources.iter().map(|r| r.day).collect();

        assert_eq!(days, vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_fallback_days_are_increasing_and_unique() {
        let mut text = String::new();
        for i in 0..8 {
            if i % 3 == 0 {
                text.push_str(&format!("DAY: {}\n", 20 + i));
            }
            text.push_str(&format!("TITLE: T{}\nFULL_CONTENT: body\n---\n", i));
        }

        let outcome = parse_resources(&text, 20);
        let days: Vec<u32> = outcome.resources.iter().map(|r| r.day).collect();

        let fallback: Vec<u32> = days
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 3 != 0)
            .map(|(_, d)| *d)
            .collect();
        assert!(fallback.windows(2).all(|w| w[0] < w[1]));
        assert!(fallback.iter().all(|d| *d >= 20));

        let unique: HashSet<u32> = days.iter().copied().collect();
        assert_eq!(unique.len(), days.len());
    }

    #[test]
    fn test_empty_and_invalid_input_yield_nothing() {
        let empty = parse_resources("", 11);
        assert!(empty.resources.is_empty());
        assert_eq!(empty.dropped, 0);

        let junk = parse_resources("   \n---\n\n---\nno fields here\n---\nTITLE: Only title", 11);
        assert!(junk.resources.is_empty());
        assert_eq!(junk.dropped, 2);
    }

    #[test]
    fn test_sentinel_content_is_rejected() {
        let outcome = parse_resources("TITLE: X\nFULL_CONTENT: Content not found.", 1);
        assert!(outcome.resources.is_empty());
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_reparse_of_rendered_section_is_stable() {
        let original = parse_resources(REPLY, 11).resources;
        let rendered: Vec<String> = original.iter().map(render_section).collect();
        let reparsed = parse_resources(&rendered.join("---\n"), 99).resources;

        assert_eq!(reparsed.len(), original.len());
        for (a, b) in original.iter().zip(&reparsed) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_windows_line_endings() {
        let text = "TITLE: Crlf Title\r\nPASSWORD: focus\r\nFULL_CONTENT:\r\nbody\r\n---\r\nTITLE: Next\r\nFULL_CONTENT: b";
        let outcome = parse_resources(text, 1);

        assert_eq!(outcome.resources.len(), 2);
        assert_eq!(outcome.resources[0].title, "Crlf Title");
        assert_eq!(outcome.resources[0].password, "FOCUS");
    }
}
