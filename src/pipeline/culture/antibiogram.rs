//! Antibiogram row parsing.
//!
//! Rows come either tab-separated (pasted from the lab system table, empty
//! cells preserved) or aligned with runs of spaces. Column 0 is the
//! antibiotic, column `i` is the `i`-th declared organism.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{strip_mic, title_case};
use super::types::{SusceptibilityClass, MAX_ORGANISM_COLUMNS};

static SPACE_COLUMNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static CLASS_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b([SRID])\b").unwrap());

/// One antibiogram row, already classified per organism column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntibiogramRow {
    /// Display name, title-cased with MIC values removed.
    pub antibiotic: String,
    /// `(organism index, class)` for every column that carried a class.
    pub classes: Vec<(usize, SusceptibilityClass)>,
}

/// Split a raw line into trimmed columns.
///
/// Tabs win over spaces; a tab-separated line keeps its empty cells so
/// column positions stay aligned with organism positions. Leading
/// indentation is not stripped, so an indented space-aligned line yields
/// an empty name column.
pub fn split_columns(raw: &str) -> Vec<&str> {
    let raw = raw.trim_end_matches(['\r', '\n']);
    if raw.contains('\t') {
        raw.split('\t').map(str::trim).collect()
    } else {
        SPACE_COLUMNS.split(raw).map(str::trim).collect()
    }
}

/// Classify one organism cell. Colistin reports susceptibility with an
/// asterisk pointing to a footnote instead of a letter.
pub fn classify_cell(antibiotic: &str, cell: &str) -> Option<SusceptibilityClass> {
    if antibiotic.to_lowercase().contains("colistina") && cell.contains('*') {
        return Some(SusceptibilityClass::S);
    }
    CLASS_TOKEN
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
        .and_then(SusceptibilityClass::from_letter)
}

/// Parse one antibiogram line. Returns `None` for lines with fewer than
/// two columns or an empty antibiotic name.
pub fn parse_row(raw: &str) -> Option<AntibiogramRow> {
    let columns = split_columns(raw);
    if columns.len() < 2 {
        return None;
    }

    let antibiotic = title_case(&strip_mic(columns[0]));
    if antibiotic.is_empty() {
        return None;
    }

    let classes = columns
        .iter()
        .enumerate()
        .skip(1)
        .take(MAX_ORGANISM_COLUMNS)
        .filter_map(|(i, cell)| classify_cell(&antibiotic, cell).map(|class| (i - 1, class)))
        .collect();

    Some(AntibiogramRow { antibiotic, classes })
}
