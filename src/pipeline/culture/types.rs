use serde::{Deserialize, Serialize};

/// Maximum number of organism columns read from one antibiogram row.
pub const MAX_ORGANISM_COLUMNS: usize = 5;

/// Susceptibility classification letter found in an antibiogram cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SusceptibilityClass {
    /// Resistant
    R,
    /// Susceptible
    S,
    /// Intermediate
    I,
    /// Dose-dependent
    D,
}

impl SusceptibilityClass {
    /// Render order of class groups in a result line.
    pub const ORDER: [SusceptibilityClass; 4] = [Self::R, Self::S, Self::I, Self::D];

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'R' => Some(Self::R),
            'S' => Some(Self::S),
            'I' => Some(Self::I),
            'D' => Some(Self::D),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::R => 'R',
            Self::S => 'S',
            Self::I => 'I',
            Self::D => 'D',
        }
    }
}

/// Culture family inferred from the exam type of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CultureType {
    Anaerobic,
    Aerobic,
    Fungal,
    Mycobacterial,
}

impl CultureType {
    /// Suffix appended to the material label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Anaerobic => "anaeróbia",
            Self::Aerobic => "aeróbia",
            Self::Fungal => "fungos",
            Self::Mycobacterial => "micobactérias",
        }
    }
}

/// Antibiotic names per classification, in antibiogram row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Susceptibility {
    #[serde(rename = "R")]
    pub resistant: Vec<String>,
    #[serde(rename = "S")]
    pub susceptible: Vec<String>,
    #[serde(rename = "I")]
    pub intermediate: Vec<String>,
    #[serde(rename = "D")]
    pub dose_dependent: Vec<String>,
}

impl Susceptibility {
    pub fn bucket(&self, class: SusceptibilityClass) -> &[String] {
        match class {
            SusceptibilityClass::R => &self.resistant,
            SusceptibilityClass::S => &self.susceptible,
            SusceptibilityClass::I => &self.intermediate,
            SusceptibilityClass::D => &self.dose_dependent,
        }
    }

    pub fn push(&mut self, class: SusceptibilityClass, antibiotic: String) {
        let bucket = match class {
            SusceptibilityClass::R => &mut self.resistant,
            SusceptibilityClass::S => &mut self.susceptible,
            SusceptibilityClass::I => &mut self.intermediate,
            SusceptibilityClass::D => &mut self.dose_dependent,
        };
        bucket.push(antibiotic);
    }
}

/// One organism identified inside a culture block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organism {
    pub name: String,
    /// Colony count, e.g. "100.000 UFC/mL".
    pub ufc: Option<String>,
    pub susceptibility: Susceptibility,
}

impl Organism {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ufc: None,
            susceptibility: Susceptibility::default(),
        }
    }

    /// Placeholder for an antibiogram column with no declared organism.
    /// `index` is zero-based.
    pub fn placeholder(index: usize) -> Self {
        Self::new(format!("Organismo {}", index + 1))
    }

    /// Every antibiotic named in any bucket, in R, S, I, D order.
    pub fn antibiotics(&self) -> Vec<&str> {
        SusceptibilityClass::ORDER
            .iter()
            .flat_map(|class| self.susceptibility.bucket(*class))
            .map(String::as_str)
            .collect()
    }
}

/// A culture block while it is being parsed.
#[derive(Debug, Clone, Default)]
pub struct Culture {
    /// Header text before the first dash, e.g. "CULTURA AERÓBIA".
    pub exam_type: String,
    /// Raw specimen description captured from the header.
    pub material: String,
    pub result_date: Option<String>,
    pub collection_date: Option<String>,
    pub orgs: Vec<Organism>,
    pub result_summary: Option<String>,
    /// Blood cultures only.
    pub detection_time: Option<String>,
    pub parsing_antibiogram: bool,
}

impl Culture {
    /// Organism at `index`, synthesizing placeholders for any gap.
    pub fn organism_at(&mut self, index: usize) -> &mut Organism {
        while self.orgs.len() <= index {
            let placeholder = Organism::placeholder(self.orgs.len());
            tracing::debug!(name = %placeholder.name, "Synthesized placeholder organism");
            self.orgs.push(placeholder);
        }
        &mut self.orgs[index]
    }
}

/// A finalized culture block, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CultureReport {
    /// "DD/MM" from the collection date, else the result date.
    pub date: Option<String>,
    pub material_label: String,
    pub culture_type: Option<CultureType>,
    pub is_blood_culture: bool,
    pub organisms: Vec<Organism>,
    pub result_summary: Option<String>,
    pub detection_time: Option<String>,
    /// The formatted summary line.
    pub line: String,
}

impl CultureReport {
    /// Distinct antibiotic names across all organisms, first-seen order.
    pub fn antibiotics(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in self.organisms.iter().flat_map(Organism::antibiotics) {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                seen.push(name);
            }
        }
        seen
    }
}
