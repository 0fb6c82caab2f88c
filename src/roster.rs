//! Tenant identity and chemical roster, as read from the data store.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_TENANT_NAME: &str = "Unknown";
pub const UNKNOWN_TENANT_SLUG: &str = "unknown";
pub const EMPTY_ROSTER: &str = "  No chemicals registered yet.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantIdentity {
    pub display_name: String,
    pub slug: String,
}

impl TenantIdentity {
    pub fn new(display_name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            slug: slug.into(),
        }
    }

    /// Identity used when the tenant row is missing.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_TENANT_NAME, UNKNOWN_TENANT_SLUG)
    }
}

impl Default for TenantIdentity {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemicalRecord {
    pub chemical_name: String,
    #[serde(default)]
    pub cas_number: Option<String>,
    pub storage_class: String,
    #[serde(default)]
    pub location: Option<String>,
    pub status: String,
    #[serde(default)]
    pub critical: bool,
}

impl ChemicalRecord {
    fn summary_line(&self) -> String {
        format!(
            "  {}: CAS={} | storage={} | loc={} | status={} | critical={}",
            self.chemical_name,
            non_empty(&self.cas_number).unwrap_or("N/A"),
            self.storage_class,
            non_empty(&self.location).unwrap_or("unassigned"),
            self.status,
            if self.critical { "True" } else { "False" },
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// One line per chemical, sorted by name.
pub fn roster_summary(chemicals: &[ChemicalRecord]) -> String {
    if chemicals.is_empty() {
        return EMPTY_ROSTER.to_string();
    }
    let mut sorted: Vec<&ChemicalRecord> = chemicals.iter().collect();
    sorted.sort_by(|a, b| a.chemical_name.cmp(&b.chemical_name));
    sorted
        .into_iter()
        .map(ChemicalRecord::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}
