//! Culture report parser.
//!
//! Turns text pasted from the lab system into one summary line per
//! culture block. Parsing is best effort: unrecognized lines are skipped
//! and missing fields fall back to defaults, so it never fails.

pub mod antibiogram;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod rules;
pub mod types;

pub use parser::{parse_cultures, CultureParser};
pub use types::*;

/// Parse raw report text into newline-joined summary lines.
pub fn parse(text: &str) -> String {
    parse_cultures(text)
        .into_iter()
        .map(|report| report.line)
        .collect::<Vec<_>>()
        .join("\n")
}
