use tracing::debug;

use super::antibiogram::parse_row;
use super::render::finalize;
use super::rules::{classify, LineContext, LineKind};
use super::types::{Culture, CultureReport, Organism};

/// Line-oriented state machine over a pasted culture report.
///
/// Holds the ambient dates seen so far and at most one open culture.
/// Finalized cultures are collected as reports in discovery order.
#[derive(Debug, Default)]
pub struct CultureParser {
    result_date: Option<String>,
    collection_date: Option<String>,
    current: Option<Culture>,
    reports: Vec<CultureReport>,
}

impl CultureParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> LineContext {
        match &self.current {
            Some(culture) => LineContext {
                culture_open: true,
                has_organisms: !culture.orgs.is_empty(),
                parsing_antibiogram: culture.parsing_antibiogram,
            },
            None => LineContext::default(),
        }
    }

    /// Feed one physical line (without its line terminator).
    pub fn feed(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }

        match classify(raw, self.context()) {
            LineKind::ResultTimestamp(date) => {
                self.result_date = Some(date.to_string());
            }
            LineKind::CollectedAt(date) => {
                self.collection_date = Some(date.to_string());
                if let Some(culture) = self.current.as_mut() {
                    culture.collection_date = Some(date.to_string());
                }
            }
            LineKind::BlockTerminator => self.finalize_current(),
            LineKind::CultureHeader { exam_type, material } => {
                self.finalize_current();
                debug!(exam_type, material, "Opened culture block");
                self.current = Some(Culture {
                    exam_type: exam_type.to_string(),
                    material: material.to_string(),
                    result_date: self.result_date.clone(),
                    collection_date: self.collection_date.clone(),
                    ..Culture::default()
                });
            }
            LineKind::IgnoredHeader | LineKind::Unrecognized => {}
            LineKind::Status(summary) => {
                if let Some(culture) = self.current.as_mut() {
                    culture.result_summary = Some(summary.to_string());
                }
            }
            LineKind::OrganismDeclaration(name) => {
                if let Some(culture) = self.current.as_mut() {
                    culture.orgs.push(Organism::new(name));
                }
            }
            LineKind::ColonyCount(count) => {
                let last = self.current.as_mut().and_then(|c| c.orgs.last_mut());
                if let (Some(org), Some(count)) = (last, count) {
                    org.ufc = Some(count.to_string());
                }
            }
            LineKind::AntibiogramStart => self.set_parsing_antibiogram(true),
            LineKind::AntibiogramEnd => self.set_parsing_antibiogram(false),
            LineKind::DetectionTime(time) => {
                if let (Some(culture), Some(time)) = (self.current.as_mut(), time) {
                    culture.detection_time = Some(time);
                }
            }
            LineKind::AntibiogramRow => self.apply_row(raw),
        }
    }

    fn set_parsing_antibiogram(&mut self, parsing: bool) {
        if let Some(culture) = self.current.as_mut() {
            culture.parsing_antibiogram = parsing;
        }
    }

    fn apply_row(&mut self, raw: &str) {
        let Some(culture) = self.current.as_mut() else {
            return;
        };
        if !culture.parsing_antibiogram {
            return;
        }
        let Some(row) = parse_row(raw) else {
            debug!(line = raw, "Skipped antibiogram row");
            return;
        };
        for (index, class) in row.classes {
            culture
                .organism_at(index)
                .susceptibility
                .push(class, row.antibiotic.clone());
        }
    }

    fn finalize_current(&mut self) {
        let Some(culture) = self.current.take() else {
            return;
        };
        match finalize(&culture) {
            Some(report) => {
                debug!(line = %report.line, "Finalized culture block");
                self.reports.push(report);
            }
            None => debug!(exam_type = %culture.exam_type, "Culture block produced no result"),
        }
    }

    /// Close any open culture and return every report in discovery order.
    pub fn finish(mut self) -> Vec<CultureReport> {
        self.finalize_current();
        self.reports
    }
}

/// Parse a full report into finalized cultures.
pub fn parse_cultures(text: &str) -> Vec<CultureReport> {
    let mut parser = CultureParser::new();
    for line in text.lines() {
        parser.feed(line);
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::culture::types::SusceptibilityClass;

    const URINE_REPORT: &str = "\
21/11/2025 14:45:20
Coletado em: 20/11/2025 20:35
CULTURA AERÓBIA - URINA DE JATO MEDIO - ,URINA DE JATO MEDIO
1 - Klebsiella pneumoniae complex
(100.000 UFC/mL)
ANTIBIOGRAMA
Amicacina\tS
CIPROFLOXACINA\tR
Legenda: S - Sensível, R - Resistente";

    #[test]
    fn urine_culture_with_antibiogram() {
        let reports = parse_cultures(URINE_REPORT);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.date.as_deref(), Some("20/11"));
        assert_eq!(report.organisms.len(), 1);
        let org = &report.organisms[0];
        assert_eq!(org.name, "Klebsiella pneumoniae complex");
        assert_eq!(org.ufc.as_deref(), Some("100.000 UFC/mL"));
        assert_eq!(org.susceptibility.susceptible, ["Amicacina"]);
        assert_eq!(org.susceptibility.resistant, ["Ciprofloxacina"]);
    }

    #[test]
    fn result_date_used_without_collection_date() {
        let text = "\
05/03/2025 10:00:00
CULTURA AERÓBIA - SECRECAO TRAQUEAL
CULTURA AERÓBIA      Negativa    Negativa";
        let reports = parse_cultures(text);
        assert_eq!(reports[0].date.as_deref(), Some("05/03"));
        assert_eq!(reports[0].result_summary.as_deref(), Some("negativa"));
    }

    #[test]
    fn collection_date_stamps_open_culture() {
        let text = "\
CULTURA AERÓBIA - URINA
Coletado em: 07/08/2025 09:10
CULTURA AERÓBIA   Negativa";
        let reports = parse_cultures(text);
        assert_eq!(reports[0].date.as_deref(), Some("07/08"));
    }

    #[test]
    fn terminator_closes_block() {
        let text = "\
CULTURA AERÓBIA - URINA
CULTURA AERÓBIA   Negativa
Pedido: 998877
1 - Escherichia coli";
        let reports = parse_cultures(text);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].organisms.is_empty());
    }

    #[test]
    fn new_header_closes_previous_block() {
        let text = "\
CULTURA AERÓBIA - URINA
1 - Escherichia coli
CULTURA PARA FUNGOS - URINA
CULTURA PARA FUNGOS   Negativa";
        let reports = parse_cultures(text);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].organisms[0].name, "Escherichia coli");
        assert_eq!(reports[1].result_summary.as_deref(), Some("negativa"));
    }

    #[test]
    fn culture_without_result_emits_nothing() {
        assert!(parse_cultures("CULTURA AERÓBIA - URINA\nPedido: 1").is_empty());
    }

    #[test]
    fn columns_map_to_declared_organisms_in_order() {
        let text = "\
CULTURA AERÓBIA - URINA
1 - Escherichia coli
2 - Enterococcus faecalis
ANTIBIOGRAMA
AMPICILINA\tR\tS
Legenda";
        let reports = parse_cultures(text);
        let orgs = &reports[0].organisms;
        assert_eq!(orgs[0].susceptibility.resistant, ["Ampicilina"]);
        assert_eq!(orgs[1].susceptibility.susceptible, ["Ampicilina"]);
    }

    #[test]
    fn extra_columns_synthesize_placeholders() {
        let text = "\
CULTURA AERÓBIA - URINA
1 - Escherichia coli
ANTIBIOGRAMA
AMPICILINA\tR\tS\tI
Legenda";
        let reports = parse_cultures(text);
        let names: Vec<_> = reports[0].organisms.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["Escherichia coli", "Organismo 2", "Organismo 3"]);
        assert_eq!(reports[0].organisms[2].susceptibility.intermediate, ["Ampicilina"]);
    }

    #[test]
    fn rows_after_legenda_are_ignored() {
        let text = "\
CULTURA AERÓBIA - URINA
1 - Escherichia coli
ANTIBIOGRAMA
AMPICILINA\tR
Legenda
MEROPENEM\tS";
        let reports = parse_cultures(text);
        assert!(reports[0].organisms[0].susceptibility.susceptible.is_empty());
    }

    #[test]
    fn space_aligned_rows() {
        let text = "\
CULTURA AERÓBIA - URINA
1 - Escherichia coli
ANTIBIOGRAMA
PIPERACILINA/TAZOBACTAM    <=4 S
CEFEPIMA    2 D
Legenda";
        let reports = parse_cultures(text);
        let s = &reports[0].organisms[0].susceptibility;
        assert_eq!(s.bucket(SusceptibilityClass::S), ["Piperacilina/tazobactam"]);
        assert_eq!(s.bucket(SusceptibilityClass::D), ["Cefepima"]);
        assert!(s.intermediate.is_empty());
    }

    #[test]
    fn indented_space_aligned_row_is_skipped() {
        let text = "\
CULTURA AERÓBIA - URINA
1 - Escherichia coli
ANTIBIOGRAMA
   AMICACINA     S
MEROPENEM    S
Legenda";
        let reports = parse_cultures(text);
        let s = &reports[0].organisms[0].susceptibility;
        assert_eq!(s.bucket(SusceptibilityClass::S), ["Meropenem"]);
    }

    #[test]
    fn detection_time_on_blood_culture() {
        let text = "\
CULTURA AERÓBIA - SANGUE PERIFERICO
1 - Staphylococcus aureus
T. DETECÇÃO: 0 Dias 18 Horas 20 Minutos";
        let reports = parse_cultures(text);
        assert!(reports[0].is_blood_culture);
        assert_eq!(reports[0].detection_time.as_deref(), Some("18h 20min"));
    }

    #[test]
    fn crlf_input() {
        let text = "CULTURA AERÓBIA - URINA\r\n1 - Escherichia coli\r\n";
        let reports = parse_cultures(text);
        assert_eq!(reports[0].organisms[0].name, "Escherichia coli");
    }
}
