//! GHS Label Encoder - ZPL II
//!
//! Two fixed layouts. Every variable field is capped to the width the layout
//! reserves for it, so output never overruns the printable area. Caps count
//! characters and may cut a statement mid-word.
//!
//! Field values are embedded as-is. Text containing ZPL control characters
//! (`^`, `~`) must be cleaned by the caller.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_NAME_CHARS: usize = 40;
pub const MAX_SIGNAL_CHARS: usize = 20;
pub const MAX_SUPPLIER_CHARS: usize = 60;
pub const MAX_CAS_CHARS: usize = 20;
pub const MAX_PICTOGRAM_CHARS: usize = 64;
pub const MAX_PRIMARY_HAZARD_CHARS: usize = 300;
pub const MAX_SECONDARY_HAZARD_CHARS: usize = 100;
pub const MAX_PRECAUTION_CHARS: usize = 400;
pub const MAX_PRECAUTIONS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Unsupported label type: {0}")]
    UnsupportedLabelType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelVariant {
    /// 4×6 GHS label
    #[serde(alias = "ghs_primary")]
    Primary,
    /// 2×1 secondary container label
    Secondary,
}

impl LabelVariant {
    pub fn hazard_limit(&self) -> usize {
        match self {
            Self::Primary => MAX_PRIMARY_HAZARD_CHARS,
            Self::Secondary => MAX_SECONDARY_HAZARD_CHARS,
        }
    }
}

impl FromStr for LabelVariant {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" | "ghs_primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            other => Err(LabelError::UnsupportedLabelType(other.to_string())),
        }
    }
}

impl fmt::Display for LabelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Hazard data extracted from the latest SDS of a chemical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdsExtract {
    #[serde(default)]
    pub signal_word: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub pictogram_codes: Vec<String>,
    #[serde(default)]
    pub hazard_statements: Vec<String>,
    #[serde(default)]
    pub precautionary_statements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub product_name: String,
    #[serde(default)]
    pub cas_number: Option<String>,
    #[serde(default)]
    pub signal_word: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub pictogram_codes: Vec<String>,
    #[serde(default)]
    pub hazard_statements: Vec<String>,
    #[serde(default)]
    pub precautionary_statements: Vec<String>,
    pub variant: LabelVariant,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub generated_at: DateTime<Utc>,
}

fn default_quantity() -> u32 { 1 }

/// Catalogue fields of a chemical row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub chemical_name: String,
    #[serde(default)]
    pub cas_number: Option<String>,
    #[serde(default)]
    pub signal_word: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
}

impl LabelSpec {
    /// Build a spec from the catalogue row and its SDS extract.
    ///
    /// Catalogue values win over SDS values; precautions are capped to
    /// [`MAX_PRECAUTIONS`] and quantity to at least 1.
    pub fn from_records(
        entry: &CatalogueEntry,
        sds: &SdsExtract,
        variant: LabelVariant,
        quantity: u32,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let prefer = |primary: &Option<String>, fallback: &Option<String>| {
            primary
                .as_deref()
                .filter(|v| !v.is_empty())
                .or(fallback.as_deref())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            product_name: entry.chemical_name.clone(),
            cas_number: entry.cas_number.clone().filter(|c| !c.is_empty()),
            signal_word: prefer(&entry.signal_word, &sds.signal_word),
            manufacturer: prefer(&entry.manufacturer, &sds.manufacturer),
            pictogram_codes: sds.pictogram_codes.clone(),
            hazard_statements: sds.hazard_statements.clone(),
            precautionary_statements: sds
                .precautionary_statements
                .iter()
                .take(MAX_PRECAUTIONS)
                .cloned()
                .collect(),
            variant,
            quantity: quantity.max(1),
            generated_at,
        }
    }

    /// Hazard statements joined by single spaces, capped for this variant.
    pub fn hazard_text(&self) -> String {
        truncate(&self.hazard_statements.join(" "), self.variant.hazard_limit())
    }

    pub fn precaution_text(&self) -> String {
        truncate(&self.precautionary_statements.join(" "), MAX_PRECAUTION_CHARS)
    }
}

/// First `max` characters of `text`.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Render the ZPL program for a label.
pub fn encode(spec: &LabelSpec) -> String {
    let name = truncate(&spec.product_name, MAX_NAME_CHARS);
    let signal = truncate(&spec.signal_word, MAX_SIGNAL_CHARS);
    let hazards = spec.hazard_text();
    let qty = spec.quantity;

    match spec.variant {
        LabelVariant::Secondary => format!(
            "^XA\n\
             ^CI28\n\
             ^FO10,10^A0N,28,28^FD{name}^FS\n\
             ^FO10,45^A0N,22,22^FD{signal}^FS\n\
             ^FO10,75^FB380,3,0,L^A0N,16,16^FD{hazards}^FS\n\
             ^PQ{qty}\n\
             ^XZ"
        ),
        LabelVariant::Primary => {
            let pictograms = truncate(&spec.pictogram_codes.join(", "), MAX_PICTOGRAM_CHARS);
            let precautions = spec.precaution_text();
            let supplier = truncate(&spec.manufacturer, MAX_SUPPLIER_CHARS);
            let cas = truncate(spec.cas_number.as_deref().unwrap_or_default(), MAX_CAS_CHARS);
            let date = spec.generated_at.format("%Y-%m-%d");

            format!(
                "^XA\n\
                 ^CI28\n\
                 ^CF0,30,30\n\
                 \n\
                 ~DGR:LABEL.GRF,0,0,\n\
                 ^FO40,40^A0N,50,50^FD{name}^FS\n\
                 \n\
                 ^FO40,110^GB730,55,55,B^FS\n\
                 ^FO50,115^FR^A0N,42,42^FD{signal}^FS\n\
                 \n\
                 ^FO40,185^A0N,20,20^FDPictograms: {pictograms}^FS\n\
                 \n\
                 ^FO40,220^A0N,18,18^FDHazard Statements:^FS\n\
                 ^FO40,245^FB730,6,0,L^A0N,18,18^FD{hazards}^FS\n\
                 \n\
                 ^FO40,400^A0N,18,18^FDPrecautionary Statements:^FS\n\
                 ^FO40,425^FB730,8,0,L^A0N,16,16^FD{precautions}^FS\n\
                 \n\
                 ^FO40,620^A0N,18,18^FDSupplier: {supplier}^FS\n\
                 ^FO40,650^A0N,16,16^FDCAS: {cas}^FS\n\
                 ^FO40,675^A0N,14,14^FDGenerated: {date}^FS\n\
                 \n\
                 ^PQ{qty}\n\
                 ^XZ"
            )
        }
    }
}
