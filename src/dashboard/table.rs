//! The dashboard's keyed tables: `const name = { key: 'value', ... };`.
//!
//! Existing entries are never rewritten. A merge only inserts text after the
//! last entry, so comments, quoting and layout already in the page survive.

use std::ops::Range;

use regex::Regex;

use super::card::escape_js;

const CLOSE_INDENT: &str = "        ";
const INDENT_STEP: &str = "    ";

/// One value in a keyed table. `raw` is the text between the quotes (escapes
/// kept as written), or the whole expression for an unquoted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableValue {
    pub raw: String,
    pub quote: Option<char>,
}

impl TableValue {
    pub fn new(value: &str) -> Self {
        Self {
            raw: escape_js(value),
            quote: Some('\''),
        }
    }

    fn literal(&self) -> String {
        match self.quote {
            Some(q) => format!("{q}{}{q}", self.raw),
            None => self.raw.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyedTable {
    pub name: &'static str,
    entries: Vec<(String, TableValue)>,
    /// How many of `entries` were already in the page.
    existing: usize,
    close: usize,
    /// End of the last existing entry, past its comma when it has one.
    append_at: Option<usize>,
    trailing_comma: bool,
    indent: String,
    close_indent: String,
}

fn declaration(name: &str) -> Regex {
    Regex::new(&format!(r"\bconst\s+{}\s*=\s*\{{", regex::escape(name))).expect("valid regex")
}

impl KeyedTable {
    /// Find and read the table. `None` when the declaration is absent or its
    /// body is not a plain object literal.
    pub fn locate(source: &str, name: &'static str) -> Option<Self> {
        let found = declaration(name).find(source)?;
        let open = found.end() - 1;

        let Some(body) = read_object(source, open) else {
            tracing::warn!("Could not read the {} object; leaving it unchanged", name);
            return None;
        };

        let close_indent = indent_of(source, found.start())
            .map_or(CLOSE_INDENT, |(_, indent)| indent)
            .to_string();
        let indent = body
            .entries
            .last()
            .and_then(|entry| indent_of(source, entry.start))
            .map_or_else(|| format!("{close_indent}{INDENT_STEP}"), |(_, indent)| indent.to_string());

        let entries: Vec<_> = body.entries.into_iter().map(|e| (e.key, e.value)).collect();
        Some(Self {
            name,
            existing: entries.len(),
            entries,
            close: body.close,
            append_at: body.append_at,
            trailing_comma: body.trailing_comma,
            indent,
            close_indent,
        })
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[(String, TableValue)] {
        &self.entries
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&TableValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn push(&mut self, key: String, value: TableValue) {
        self.entries.push((key, value));
    }

    pub fn days(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .filter_map(|(key, _)| key.strip_prefix("day")?.parse().ok())
    }

    /// Insertions that add the pushed entries to `source`.
    pub fn edits(&self, source: &str) -> Vec<(Range<usize>, String)> {
        let added = &self.entries[self.existing..];
        if added.is_empty() {
            return Vec::new();
        }
        let lines: Vec<String> = added
            .iter()
            .map(|(key, value)| format!("{}{}: {}", self.indent, key, value.literal()))
            .collect();

        let Some(at) = self.append_at else {
            // Empty body: entries go on their own lines above the closing brace.
            return match indent_of(source, self.close) {
                Some((line_start, _)) => {
                    vec![(line_start..line_start, format!("{}\n", lines.join(",\n")))]
                }
                None => {
                    let text = format!("\n{}\n{}", lines.join(",\n"), self.close_indent);
                    vec![(self.close..self.close, text)]
                }
            };
        };

        // Keep a trailing line comment on the line it annotates.
        let eol = source[at..].find('\n').map_or(source.len(), |i| at + i);
        let tail = source[at..eol].trim_start();
        let insert_at = if tail.is_empty() || tail.starts_with("//") { eol } else { at };

        let mut edits = Vec::new();
        if !self.trailing_comma {
            edits.push((at..at, ",".to_string()));
        }
        let mut text = String::new();
        for (i, line) in lines.iter().enumerate() {
            text.push('\n');
            text.push_str(line);
            if self.trailing_comma || i + 1 < lines.len() {
                text.push(',');
            }
        }
        edits.push((insert_at..insert_at, text));
        edits
    }
}

/// Start and leading whitespace of the line holding `pos`, when nothing else
/// precedes `pos` on that line.
fn indent_of(source: &str, pos: usize) -> Option<(usize, &str)> {
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..pos];
    prefix
        .chars()
        .all(char::is_whitespace)
        .then_some((line_start, prefix))
}

struct Entry {
    key: String,
    value: TableValue,
    start: usize,
}

struct ObjectBody {
    entries: Vec<Entry>,
    close: usize,
    append_at: Option<usize>,
    trailing_comma: bool,
}

/// Read the object literal whose `{` is at `open`. Keys may be identifiers
/// or quoted; values may be quoted strings of any kind or plain expressions.
/// Spreads, computed keys and shorthand properties are not accepted.
fn read_object(source: &str, open: usize) -> Option<ObjectBody> {
    let mut s = Scanner { src: source, pos: open + 1 };
    let mut entries = Vec::new();
    let mut append_at = None;
    let mut trailing_comma = false;

    loop {
        s.skip_trivia()?;
        match s.peek()? {
            b'}' => break,
            b',' => {
                if append_at.is_none() || trailing_comma {
                    return None;
                }
                s.pos += 1;
                append_at = Some(s.pos);
                trailing_comma = true;
                continue;
            }
            _ if append_at.is_some() && !trailing_comma => return None,
            _ => {}
        }

        let start = s.pos;
        let key = match s.peek()? {
            b'\'' | b'"' => s.string()?.0.to_string(),
            _ => s.identifier()?.to_string(),
        };
        s.skip_trivia()?;
        if s.peek()? != b':' {
            return None;
        }
        s.pos += 1;
        s.skip_trivia()?;

        let value_start = s.pos;
        let (value, value_end) = match s.peek()? {
            b'\'' | b'"' | b'`' => {
                let (raw, quote) = s.string()?;
                let value = TableValue {
                    raw: raw.to_string(),
                    quote: Some(quote),
                };
                (value, s.pos)
            }
            _ => {
                let raw = s.expression()?;
                let value = TableValue {
                    raw: raw.to_string(),
                    quote: None,
                };
                (value, value_start + raw.len())
            }
        };

        entries.push(Entry { key, value, start });
        append_at = Some(value_end);
        trailing_comma = false;
    }

    Some(ObjectBody {
        entries,
        close: s.pos,
        append_at,
        trailing_comma,
    })
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_trivia(&mut self) -> Option<()> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if let Some(comment) = trimmed.strip_prefix("/*") {
                self.pos += comment.find("*/")? + 4;
            } else {
                return Some(());
            }
        }
    }

    /// Quoted string at the cursor: its body as written and the quote used.
    fn string(&mut self) -> Option<(&'a str, char)> {
        let quote = self.peek()?;
        let bytes = self.src.as_bytes();
        let start = self.pos + 1;
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b if b == quote => {
                    self.pos = i + 1;
                    return Some((&self.src[start..i], quote as char));
                }
                b'\n' if quote != b'`' => return None,
                _ => i += 1,
            }
        }
        None
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Unquoted value: everything up to the next top-level `,` or `}`.
    fn expression(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                b'\'' | b'"' | b'`' => {
                    self.string()?;
                }
                b'/' if self.rest().starts_with("//") || self.rest().starts_with("/*") => {
                    self.skip_trivia()?;
                }
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' | b']' | b'}' if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                b',' | b'}' if depth == 0 => break,
                b')' | b']' => return None,
                _ => self.pos += self.rest().chars().next().map_or(1, char::len_utf8),
            }
        }
        let raw = self.src[start..self.pos].trim_end();
        (!raw.is_empty()).then_some(raw)
    }
}
