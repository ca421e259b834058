//! Result line formatting.
//!
//! Shape: `(DD/MM) Material - tipo: Org (ufc) (R: a, b | S: c) + Org2 ...`
//! The antibiogram filter re-parses the parenthesized class groups produced
//! here, so group syntax must stay `X: name, name` joined by ` | `.

use super::normalize::{day_month, infer_culture_type, normalize_material};
use super::types::{Culture, CultureReport, Organism, SusceptibilityClass};

/// Label used when neither material nor exam type is known.
pub const MISSING_MATERIAL: &str = "Material não informado";

/// `"R: a, b | S: c"`, or `None` when every bucket is empty.
pub fn class_groups(org: &Organism) -> Option<String> {
    let groups: Vec<String> = SusceptibilityClass::ORDER
        .iter()
        .filter_map(|class| {
            let names = org.susceptibility.bucket(*class);
            (!names.is_empty()).then(|| format!("{}: {}", class.letter(), names.join(", ")))
        })
        .collect();
    (!groups.is_empty()).then(|| groups.join(" | "))
}

/// Organism name, colony count and class groups.
pub fn organism_segment(org: &Organism) -> String {
    let mut segment = org.name.clone();
    if let Some(ufc) = &org.ufc {
        segment.push_str(&format!(" ({ufc})"));
    }
    if let Some(groups) = class_groups(org) {
        segment.push_str(&format!(" ({groups})"));
    }
    segment
}

fn material_label(culture: &Culture) -> String {
    let normalized = normalize_material(&culture.material);
    let mut label = [normalized.as_str(), culture.material.trim(), culture.exam_type.trim()]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(MISSING_MATERIAL)
        .to_string();
    if let Some(kind) = infer_culture_type(&culture.exam_type) {
        label.push_str(" - ");
        label.push_str(kind.label());
    }
    label
}

fn is_blood_culture(culture: &Culture) -> bool {
    culture.material.to_lowercase().contains("sangue")
        || culture.exam_type.to_lowercase().contains("sangue")
}

/// Turn a closed culture block into its report. Cultures with neither
/// organisms nor a result summary produce nothing.
pub fn finalize(culture: &Culture) -> Option<CultureReport> {
    let body = if !culture.orgs.is_empty() {
        culture
            .orgs
            .iter()
            .map(organism_segment)
            .collect::<Vec<_>>()
            .join(" + ")
    } else {
        culture.result_summary.clone()?
    };

    let date = culture
        .collection_date
        .as_deref()
        .or(culture.result_date.as_deref())
        .and_then(day_month);
    let material_label = material_label(culture);
    let is_blood_culture = is_blood_culture(culture);

    let mut line = String::new();
    if let Some(date) = &date {
        line.push_str(&format!("({date}) "));
    }
    line.push_str(&material_label);
    line.push_str(": ");
    line.push_str(&body);
    if is_blood_culture {
        if let Some(time) = &culture.detection_time {
            line.push_str(&format!(" (tempo de detecção: {time})"));
        }
    }

    Some(CultureReport {
        date,
        material_label,
        culture_type: infer_culture_type(&culture.exam_type),
        is_blood_culture,
        organisms: culture.orgs.clone(),
        result_summary: culture.result_summary.clone(),
        detection_time: culture.detection_time.clone(),
        line,
    })
}
