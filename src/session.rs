//! In-memory report session.
//!
//! Holds the last formatted text and the antibiotic toggle state. Every
//! toggle re-filters the cached text; the raw report is parsed only once
//! per `process` call.

use crate::config::AppConfig;
use crate::pipeline::culture::{parse_cultures, CultureReport};
use crate::pipeline::filter::{apply_selection, AntibioticSelection};

#[derive(Debug, Clone, Default)]
pub struct ReportSession {
    /// Rendered summary of the last processed report. `None` before the
    /// first `process` call.
    cached: Option<String>,
    /// Structured records behind `cached`.
    reports: Vec<CultureReport>,
    selection: AntibioticSelection,
}

impl ReportSession {
    pub fn new(selection: AntibioticSelection) -> Self {
        Self {
            cached: None,
            reports: Vec::new(),
            selection,
        }
    }

    /// Session using the configured antibiotic controls.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut selection = AntibioticSelection::new(&config.known_antibiotics);
        for name in &config.inactive_antibiotics {
            selection.set_active(name, false);
        }
        Self::new(selection)
    }

    /// Parse a new report, replacing the cache, and return the displayed text.
    pub fn process(&mut self, raw: &str) -> String {
        let reports = parse_cultures(raw);
        let formatted = reports
            .iter()
            .map(|report| report.line.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        tracing::info!(cultures = reports.len(), "Processed report");
        self.reports = reports;
        self.cached = Some(formatted);
        self.display()
    }

    /// Filtered view of the cached text.
    pub fn display(&self) -> String {
        match &self.cached {
            Some(text) => apply_selection(text, &self.selection),
            None => String::new(),
        }
    }

    pub fn toggle(&mut self, name: &str) -> String {
        let on = self.selection.toggle(name);
        tracing::debug!(antibiotic = name, active = on, "Toggled antibiotic");
        self.display()
    }

    pub fn set_active(&mut self, name: &str, on: bool) -> String {
        self.selection.set_active(name, on);
        self.display()
    }

    pub fn select_all(&mut self) -> String {
        self.selection.select_all();
        self.display()
    }

    pub fn deselect_all(&mut self) -> String {
        self.selection.deselect_all();
        self.display()
    }

    /// Unfiltered text of the last processed report.
    pub fn formatted(&self) -> Option<&str> {
        self.cached.as_deref()
    }

    pub fn reports(&self) -> &[CultureReport] {
        &self.reports
    }

    pub fn selection(&self) -> &AntibioticSelection {
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Coletado em: 20/11/2025 20:35
CULTURA AERÓBIA - URINA DE JATO MEDIO - ,URINA
1 - Escherichia coli
ANTIBIOGRAMA
AMICACINA\tS
MEROPENEM\tS
AMPICILINA\tR
Legenda";

    fn session() -> ReportSession {
        ReportSession::new(AntibioticSelection::new(["Amicacina", "Meropenem", "Ampicilina"]))
    }

    #[test]
    fn empty_before_processing() {
        let s = session();
        assert_eq!(s.display(), "");
        assert!(s.formatted().is_none());
    }

    #[test]
    fn process_applies_current_selection() {
        let mut s = session();
        s.set_active("Meropenem", false);
        let shown = s.process(REPORT);
        assert_eq!(
            shown,
            "(20/11) Urina De Jato Medio - aeróbia: Escherichia coli (R: Ampicilina | S: Amicacina)"
        );
        assert!(s.formatted().unwrap().contains("Meropenem"));
    }

    #[test]
    fn toggles_refilter_cached_text() {
        let mut s = session();
        s.process(REPORT);
        let shown = s.toggle("ampicilina");
        assert!(!shown.contains("R:"));
        let shown = s.toggle("ampicilina");
        assert!(shown.contains("R: Ampicilina"));
        assert_eq!(s.deselect_all(), "(20/11) Urina De Jato Medio - aeróbia: Escherichia coli");
        assert_eq!(s.select_all(), s.formatted().unwrap());
    }

    #[test]
    fn new_process_replaces_cache() {
        let mut s = session();
        s.process(REPORT);
        s.process("CULTURA AERÓBIA - URINA\nCULTURA AERÓBIA   Negativa");
        assert_eq!(s.display(), "Urina - aeróbia: negativa");
        assert_eq!(s.reports().len(), 1);
    }

    #[test]
    fn config_inactive_list_applies() {
        let config = AppConfig {
            known_antibiotics: vec!["Amicacina".into(), "Meropenem".into()],
            inactive_antibiotics: vec!["Meropenem".into()],
            log_filter: None,
        };
        let s = ReportSession::from_config(&config);
        assert!(s.selection().is_active("amicacina"));
        assert!(!s.selection().is_active("meropenem"));
    }
}
