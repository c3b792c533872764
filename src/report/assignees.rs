// src/report/assignees.rs

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Text written in place of an assignee list when a task has no relationships.
pub const UNLINKED_SENTINEL: &str = "No Linked Tasks";

const ITEM: &str = r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#;

static LIST_REGEX: OnceLock<Regex> = OnceLock::new();
static ITEM_REGEX: OnceLock<Regex> = OnceLock::new();

/// Assignees of a completed-task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignees {
    Known(Vec<String>),
    /// The task had no linked or dependent tasks.
    Unlinked,
}

impl Assignees {
    /// Names to explode into summary rows; empty for `Unlinked`.
    pub fn names(&self) -> &[String] {
        match self {
            Assignees::Known(names) => names,
            Assignees::Unlinked => &[],
        }
    }

    /// Parses a cell written by [`Assignees::to_cell`]. Returns `None` for
    /// anything that is neither the sentinel nor a quoted-string list.
    pub fn parse_cell(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        if cell == UNLINKED_SENTINEL {
            return Some(Assignees::Unlinked);
        }

        let list = LIST_REGEX.get_or_init(|| {
            Regex::new(&format!(
                r"(?s)^\[\s*(?:(?:{ITEM})\s*(?:,\s*(?:{ITEM})\s*)*,?\s*)?\]$"
            ))
            .expect("Invalid list regex")
        });
        if !list.is_match(cell) {
            return None;
        }

        let item = ITEM_REGEX
            .get_or_init(|| Regex::new(&format!("(?s){ITEM}")).expect("Invalid item regex"));
        let names = item
            .find_iter(cell)
            .map(|m| unquote(m.as_str()))
            .collect();
        Some(Assignees::Known(names))
    }

    pub fn to_cell(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Assignees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignees::Unlinked => f.write_str(UNLINKED_SENTINEL),
            Assignees::Known(names) => {
                let items: Vec<String> = names.iter().map(|n| quote(n)).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

// Single quotes unless the name holds a single quote and no double quote.
fn quote(name: &str) -> String {
    let delim = if name.contains('\'') && !name.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(name.len() + 2);
    out.push(delim);
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

fn unquote(item: &str) -> String {
    let inner = &item[1..item.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(c @ ('\\' | '\'' | '"')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
