//! Antibiogram filter over already-rendered summary text.
//!
//! Works on the output of [`crate::pipeline::culture::parse`], never on the
//! raw report. Every `(...)` group carrying `X:` class markers is rewritten
//! to list only active antibiotics; other groups are left untouched.
//! Names without a selectable control (absent from the known set) are
//! always kept.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static CLASS_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[SRID]:").unwrap());
static CLASS_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([SRID]):\s*(.*)$").unwrap());
static DOUBLE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Which antibiotics have a control, and which of those are switched on.
/// Names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntibioticSelection {
    known: BTreeSet<String>,
    active: BTreeSet<String>,
}

impl AntibioticSelection {
    /// Every known antibiotic starts active.
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known: BTreeSet<String> = known
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self {
            active: known.clone(),
            known,
        }
    }

    /// Build from explicit known and active sets.
    pub fn with_active<I, S, J, T>(known: I, active: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        J: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut selection = Self::new(known);
        selection.active = active
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .collect();
        selection
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(&name.trim().to_lowercase())
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(&name.trim().to_lowercase())
    }

    /// Whether a rendered antibiotic name survives filtering.
    pub fn keeps(&self, name: &str) -> bool {
        !self.is_known(name) || self.is_active(name)
    }

    pub fn set_active(&mut self, name: &str, on: bool) {
        let key = name.trim().to_lowercase();
        if on {
            self.active.insert(key);
        } else {
            self.active.remove(&key);
        }
    }

    /// Flip one antibiotic; returns its new state.
    pub fn toggle(&mut self, name: &str) -> bool {
        let on = !self.is_active(name);
        self.set_active(name, on);
        on
    }

    pub fn select_all(&mut self) {
        self.active = self.known.clone();
    }

    pub fn deselect_all(&mut self) {
        self.active.clear();
    }

    pub fn known(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }
}

/// Filter rendered summary text against lower-cased `active` and `known`
/// antibiotic names.
pub fn filter<I, S, J, T>(formatted: &str, active: J, known: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    J: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    apply_selection(formatted, &AntibioticSelection::with_active(known, active))
}

/// Filter every line of rendered summary text. Line breaks, including a
/// trailing one, are kept as they are.
pub fn apply_selection(formatted: &str, selection: &AntibioticSelection) -> String {
    formatted
        .split('\n')
        .map(|line| filter_line(line, selection))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte ranges of the top-level `(...)` groups of a line, parentheses
/// included. Nested parentheses stay inside their outer group; an
/// unclosed group is not reported.
pub fn top_level_groups(line: &str) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in line.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push((start, i + 1));
                }
            }
            _ => {}
        }
    }
    groups
}

/// Filter one rendered line. Lines without parentheses pass through.
pub fn filter_line(line: &str, selection: &AntibioticSelection) -> String {
    let groups = top_level_groups(line);
    if groups.is_empty() {
        return line.to_string();
    }

    let mut rewritten = String::with_capacity(line.len());
    let mut cursor = 0;
    for (start, end) in groups {
        rewritten.push_str(&line[cursor..start]);
        cursor = end;
        let whole = &line[start..end];
        let content = &line[start + 1..end - 1];
        if !CLASS_MARKER.is_match(content) {
            rewritten.push_str(whole);
            continue;
        }
        match filter_group(content, selection) {
            Some(kept) => {
                rewritten.push('(');
                rewritten.push_str(&kept);
                rewritten.push(')');
            }
            None => {
                tracing::trace!(group = content, "Dropped antibiogram group");
                let kept_len = rewritten.trim_end().len();
                rewritten.truncate(kept_len);
            }
        }
    }
    rewritten.push_str(&line[cursor..]);

    DOUBLE_SPACE
        .replace_all(&rewritten, " ")
        .trim_end()
        .to_string()
}

/// Split on `sep` outside of parentheses.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Rewrite the inside of one class group, `None` when nothing survives.
fn filter_group(content: &str, selection: &AntibioticSelection) -> Option<String> {
    let segments: Vec<String> = split_top_level(content, '|')
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| filter_segment(segment, selection))
        .collect();
    (!segments.is_empty()).then(|| segments.join(" | "))
}

fn filter_segment(segment: &str, selection: &AntibioticSelection) -> Option<String> {
    let Some(caps) = CLASS_SEGMENT.captures(segment) else {
        return Some(segment.to_string());
    };
    let names: Vec<&str> = split_top_level(&caps[2], ',')
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty() && selection.keeps(name))
        .collect();
    (!names.is_empty()).then(|| format!("{}: {}", &caps[1], names.join(", ")))
}
