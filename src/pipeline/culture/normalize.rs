//! Text normalization shared by the parser and the renderer.
//!
//! Title casing only splits on whitespace, so compound names like
//! "piperacilina/tazobactam" keep their second half lower-case.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::types::CultureType;

/// Lower-case everything, then upper-case the first letter of each
/// whitespace-delimited token. Diacritics and the original spacing are kept.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_token_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            out.push(ch);
            at_token_start = true;
        } else if at_token_start {
            out.extend(ch.to_uppercase());
            at_token_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// "URINA DE JATO MEDIO - ,URINA" -> "Urina De Jato Medio".
pub fn normalize_material(raw: &str) -> String {
    static DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+-\s+").unwrap());
    static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

    let head = raw.split(',').next().unwrap_or_default();
    let head = DASH.replace_all(head, " ");
    let head = SPACES.replace_all(&head, " ");
    title_case(head.trim())
}

/// Lower-case and strip combining marks: "AERÓBIA" -> "aerobia".
pub fn fold_diacritics(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Infer the culture family from the header exam type.
/// "anaerob" is checked before "aerob" since one contains the other.
pub fn infer_culture_type(exam_type: &str) -> Option<CultureType> {
    let folded = fold_diacritics(exam_type);
    if folded.contains("anaerob") {
        Some(CultureType::Anaerobic)
    } else if folded.contains("aerob") {
        Some(CultureType::Aerobic)
    } else if folded.contains("fung") {
        Some(CultureType::Fungal)
    } else if folded.contains("micobact") {
        Some(CultureType::Mycobacterial)
    } else {
        None
    }
}

/// "21/11/2025" -> "21/11".
pub fn day_month(date: &str) -> Option<String> {
    static DDMM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{2})/(\d{2})").unwrap());
    DDMM.captures(date)
        .map(|caps| format!("{}/{}", &caps[1], &caps[2]))
}

/// Remove MIC values glued to an antibiotic name, e.g. "Amicacina <=2".
pub fn strip_mic(name: &str) -> String {
    static MIC_VALUE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s*(?:[<>]=?|=)\s*\d[\d.,/]*").unwrap());
    static MIC_SYMBOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[<>]=").unwrap());

    let without_value = MIC_VALUE.replace_all(name, "");
    MIC_SYMBOL.replace_all(&without_value, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_upper_and_lower_inputs() {
        assert_eq!(title_case("AMICACINA"), "Amicacina");
        assert_eq!(title_case("SULFA + TRIMETHOPRIM"), "Sulfa + Trimethoprim");
        assert_eq!(title_case("ácido nalidíxico"), "Ácido Nalidíxico");
    }

    #[test]
    fn title_case_does_not_split_on_slash() {
        assert_eq!(title_case("PIPERACILINA/TAZOBACTAM"), "Piperacilina/tazobactam");
    }

    #[test]
    fn material_drops_text_after_comma() {
        assert_eq!(
            normalize_material("URINA DE JATO MEDIO - ,URINA DE JATO MEDIO"),
            "Urina De Jato Medio"
        );
    }

    #[test]
    fn material_collapses_dashes_and_spaces() {
        assert_eq!(normalize_material("SANGUE  -  PERIFERICO"), "Sangue Periferico");
        assert_eq!(normalize_material(""), "");
    }

    #[test]
    fn culture_type_inference() {
        assert_eq!(infer_culture_type("CULTURA AERÓBIA"), Some(CultureType::Aerobic));
        assert_eq!(infer_culture_type("CULTURA ANAERÓBIA"), Some(CultureType::Anaerobic));
        assert_eq!(infer_culture_type("CULTURA PARA FUNGOS"), Some(CultureType::Fungal));
        assert_eq!(
            infer_culture_type("CULTURA PARA MICOBACTÉRIAS"),
            Some(CultureType::Mycobacterial)
        );
        assert_eq!(infer_culture_type("CULTURA"), None);
    }

    #[test]
    fn fold_strips_accents() {
        assert_eq!(fold_diacritics("MICOBACTÉRIAS Aeróbia"), "micobacterias aerobia");
    }

    #[test]
    fn day_month_extraction() {
        assert_eq!(day_month("21/11/2025").as_deref(), Some("21/11"));
        assert_eq!(day_month("sem data"), None);
    }

    #[test]
    fn strip_mic_values() {
        assert_eq!(strip_mic("AMICACINA <=2"), "AMICACINA");
        assert_eq!(strip_mic("MEROPENEM >= 16"), "MEROPENEM");
        assert_eq!(strip_mic("CEFTAZIDIMA <="), "CEFTAZIDIMA");
        assert_eq!(strip_mic("SULFA + TRIMETHOPRIM"), "SULFA + TRIMETHOPRIM");
    }
}
