//! Tenant Branding and Printer Settings
//!
//! Typed views over the two config blocks of a tenant document. Known keys
//! are picked, everything else is ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config_block::{extract, extract_pairs, ConfigMap, BRANDING_MARKER, PRINTER_MARKER};
use crate::roster::TenantIdentity;

pub const DEFAULT_PRIMARY_COLOR: &str = "#003366";
pub const DEFAULT_ACCENT_COLOR: &str = "#CC0000";
pub const DEFAULT_FONT: &str = "Helvetica";

/// Printer value meaning "deliberately not configured yet".
pub const UNCONFIGURED_SENTINEL: &str = "TBD";

/// Report branding handed to the PDF renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub company_name: String,
    pub slug: String,
    pub logo_path: Option<PathBuf>,
    pub primary_color: String,
    pub accent_color: String,
    pub font: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub web: String,
    pub report_footer: String,
}

impl Branding {
    pub fn defaults(tenant: &TenantIdentity) -> Self {
        Self {
            company_name: tenant.display_name.clone(),
            slug: tenant.slug.clone(),
            logo_path: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            font: DEFAULT_FONT.to_string(),
            address_lines: vec![],
            phone: String::new(),
            web: String::new(),
            report_footer: format!("Confidential — {}", tenant.display_name),
        }
    }

    /// Apply the branding block of `document` over the defaults.
    ///
    /// `asset_root` is the tenant-scoped upload directory; a logo that does
    /// not exist there is treated as no logo.
    pub fn from_document(tenant: &TenantIdentity, document: &str, asset_root: &Path) -> Self {
        let mut branding = Self::defaults(tenant);
        for (key, value) in extract_pairs(document, BRANDING_MARKER) {
            match key.as_str() {
                "logo_file" => branding.logo_path = resolve_asset(asset_root, &value),
                "primary_color" => branding.primary_color = value,
                "accent_color" => branding.accent_color = value,
                "font" => branding.font = value,
                "report_footer" => branding.report_footer = value,
                "phone" => branding.phone = value,
                "web" => branding.web = value,
                "line1" | "line2" | "line3" => branding.address_lines.push(value),
                _ => {}
            }
        }
        branding
    }
}

/// `<asset_root>/<file>` when it exists and stays inside `asset_root`.
pub fn resolve_asset(asset_root: &Path, file: &str) -> Option<PathBuf> {
    let relative = Path::new(file);
    let contained = !file.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));
    if !contained {
        return None;
    }
    let path = asset_root.join(relative);
    path.is_file().then_some(path)
}

/// Printer block of a tenant document. All keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub settings: ConfigMap,
}

impl PrinterConfig {
    pub fn from_document(document: &str) -> Self {
        Self {
            settings: extract(document, PRINTER_MARKER),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Configured printer address; empty and `TBD` count as not configured.
    pub fn printer_ip(&self) -> Option<&str> {
        self.get("printer_ip").and_then(configured)
    }
}

/// `None` for blank or sentinel values.
pub fn configured(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != UNCONFIGURED_SENTINEL).then_some(value)
}
