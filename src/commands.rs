//! Command surface for a UI shell.
//!
//! Each command takes the session, performs one user action and returns
//! what the shell should display. The shell owns the session.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::session::ReportSession;

/// One antibiotic control and its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntibioticToggle {
    pub name: String,
    pub active: bool,
}

/// "Process" action: parse the pasted report and show the filtered result.
pub fn process_report(session: &mut ReportSession, raw: &str) -> String {
    session.process(raw)
}

pub fn toggle_antibiotic(session: &mut ReportSession, name: &str) -> String {
    session.toggle(name)
}

pub fn select_all(session: &mut ReportSession) -> String {
    session.select_all()
}

pub fn deselect_all(session: &mut ReportSession) -> String {
    session.deselect_all()
}

/// Every known antibiotic control with its current state.
pub fn list_antibiotics(session: &ReportSession) -> Vec<AntibioticToggle> {
    let selection = session.selection();
    selection
        .known()
        .map(|name| AntibioticToggle {
            name: name.to_string(),
            active: selection.is_active(name),
        })
        .collect()
}

/// Antibiotics named anywhere in the last processed report.
pub fn report_antibiotics(session: &ReportSession) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for report in session.reports() {
        for name in report.antibiotics() {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Structured records of the last processed report as pretty JSON.
pub fn report_json(session: &ReportSession) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(session.reports())?)
}
