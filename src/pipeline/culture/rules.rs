//! Ordered line classification for culture reports.
//!
//! Rules run top to bottom and the first match wins. Several rules only
//! apply while a culture block is open, so classification takes a small
//! snapshot of the parser state. A header check has to run before the
//! generic "CULTURA " status check.

use std::sync::LazyLock;

use regex::Regex;

static RESULT_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}/\d{2}/\d{4})\s+\d{2}:\d{2}:\d{2}").unwrap());
static COLLECTED_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Coletado em:\s*(\d{2}/\d{2}/\d{4})\s+\d{2}:\d{2}").unwrap()
});
static REQUEST_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Pedido(?:\s*:|\s|$)").unwrap());
static DIVISION_BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^DIVISÃO DE LABORATÓRIO CENTRAL").unwrap());
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^CULTURA.*?-\s*(.+?)(?:\s*[,;-].*)?$").unwrap());
static STATUS_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^CULTURA\s+").unwrap());
static POSITIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Positiva").unwrap());
static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Negativa").unwrap());
static PARTIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Parcial").unwrap());
static ORGANISM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s*-\s*(.+)$").unwrap());
static UFC_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)UFC/mL").unwrap());
static UFC_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*([^)]*UFC/mL)[^)]*\)").unwrap());
static ANTIBIOGRAM_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ANTIBIOGRAMA").unwrap());
static ANTIBIOGRAM_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^Legenda").unwrap());
static DETECTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^T\.\s*DETEC").unwrap());
static DAYS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*dia").unwrap());
static HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*hora").unwrap());
static MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*min").unwrap());

/// Parser state visible to the classification rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext {
    pub culture_open: bool,
    pub has_organisms: bool,
    pub parsing_antibiogram: bool,
}

/// What a single report line means to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// "21/11/2025 14:45:20"
    ResultTimestamp(&'a str),
    /// "Coletado em: 21/11/2025 20:35"
    CollectedAt(&'a str),
    /// "Pedido: ..." or the lab-division banner.
    BlockTerminator,
    CultureHeader { exam_type: &'a str, material: &'a str },
    /// Looks like a header but has no " - " separator.
    IgnoredHeader,
    Status(&'static str),
    OrganismDeclaration(&'a str),
    /// The colony count, when the line carries a parenthesized one.
    ColonyCount(Option<&'a str>),
    AntibiogramStart,
    AntibiogramEnd,
    /// Compact detection time, when the line had recognizable numbers.
    DetectionTime(Option<String>),
    AntibiogramRow,
    Unrecognized,
}

/// Classify one line. `raw` is the untrimmed physical line.
pub fn classify<'a>(raw: &'a str, ctx: LineContext) -> LineKind<'a> {
    let line = raw.trim();

    if let Some(caps) = RESULT_TIMESTAMP.captures(line) {
        return LineKind::ResultTimestamp(caps.get(1).map_or("", |m| m.as_str()));
    }

    if let Some(caps) = COLLECTED_AT.captures(line) {
        return LineKind::CollectedAt(caps.get(1).map_or("", |m| m.as_str()));
    }

    if REQUEST_BLOCK.is_match(line) || DIVISION_BANNER.is_match(line) {
        return LineKind::BlockTerminator;
    }

    if let Some(caps) = HEADER.captures(line) {
        if !line.contains(" - ") {
            return LineKind::IgnoredHeader;
        }
        let exam_type = line.find('-').map_or(line, |pos| &line[..pos]).trim();
        let material = caps.get(1).map_or("", |m| m.as_str()).trim();
        return LineKind::CultureHeader { exam_type, material };
    }

    if ctx.culture_open && STATUS_PREFIX.is_match(line) {
        let positive = POSITIVE.is_match(line);
        let negative = NEGATIVE.is_match(line);
        if positive || negative {
            let summary = if negative && PARTIAL.is_match(line) {
                "parcial negativa"
            } else if positive {
                "positiva"
            } else {
                "negativa"
            };
            return LineKind::Status(summary);
        }
    }

    if ctx.culture_open {
        if let Some(caps) = ORGANISM.captures(line) {
            return LineKind::OrganismDeclaration(caps.get(1).map_or("", |m| m.as_str()).trim());
        }
    }

    if ctx.has_organisms && UFC_MARKER.is_match(line) {
        let count = UFC_GROUP
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim());
        return LineKind::ColonyCount(count);
    }

    if ctx.culture_open && ANTIBIOGRAM_START.is_match(line) {
        return LineKind::AntibiogramStart;
    }

    if ctx.culture_open && ctx.parsing_antibiogram && ANTIBIOGRAM_END.is_match(line) {
        return LineKind::AntibiogramEnd;
    }

    if DETECTION.is_match(line) {
        return LineKind::DetectionTime(compact_detection_time(line));
    }

    if ctx.parsing_antibiogram {
        return LineKind::AntibiogramRow;
    }

    LineKind::Unrecognized
}

/// "T. DETECÇÃO: 1 Dias 0 Horas 30 Minutos" -> "1d 30min".
/// Minutes are always printed; zero days and hours are omitted.
pub fn compact_detection_time(line: &str) -> Option<String> {
    let days = first_number(&DAYS, line);
    let hours = first_number(&HOURS, line);
    let minutes = first_number(&MINUTES, line);
    if days.is_none() && hours.is_none() && minutes.is_none() {
        return None;
    }

    let mut parts = Vec::with_capacity(3);
    if let Some(d) = days.filter(|d| *d > 0) {
        parts.push(format!("{d}d"));
    }
    if let Some(h) = hours.filter(|h| *h > 0) {
        parts.push(format!("{h}h"));
    }
    parts.push(format!("{}min", minutes.unwrap_or(0)));
    Some(parts.join(" "))
}

fn first_number(re: &Regex, line: &str) -> Option<u32> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
