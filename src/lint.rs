//! Tenant Document Lint - Rule/Report Separation
//!
//! Extraction silently skips anything it can't read. Lint runs the same
//! grammar and reports what was skipped, without changing what extraction
//! returns. Nothing here blocks composition or printing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::branding::UNCONFIGURED_SENTINEL;
use crate::config_block::{extract_pairs, skipped_lines, BRANDING_MARKER, PRINTER_MARKER};
use crate::grammar::{fenced_block_after, FENCE};

pub const BRANDING_KEYS: [&str; 10] = [
    "logo_file",
    "primary_color",
    "accent_color",
    "font",
    "report_footer",
    "phone",
    "web",
    "line1",
    "line2",
    "line3",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub block: String,
    pub message: String,
    pub remediation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintReport {
    pub tenant: String,
    /// No warnings (info entries don't count)
    pub clean: bool,
    pub violations: Vec<LintViolation>,
}

/// A tenant config block under lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Branding,
    Printer,
}

impl Block {
    pub const ALL: [Block; 2] = [Block::Branding, Block::Printer];

    pub fn marker(&self) -> &'static str {
        match self {
            Self::Branding => BRANDING_MARKER,
            Self::Printer => PRINTER_MARKER,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Branding => "branding",
            Self::Printer => "printer",
        }
    }
}

pub trait LintRule {
    fn name(&self) -> &'static str;
    fn check(&self, document: &str, block: Block) -> Vec<LintViolation>;
}

fn violation(
    rule: &dyn LintRule,
    severity: ViolationSeverity,
    block: Block,
    message: String,
    remediation: Option<&str>,
) -> LintViolation {
    LintViolation {
        rule: rule.name().to_string(),
        severity,
        block: block.name().to_string(),
        message,
        remediation: remediation.map(str::to_string),
    }
}

// --- Concrete Rules ---

pub struct MissingBlockRule;

impl LintRule for MissingBlockRule {
    fn name(&self) -> &'static str { "missing_block" }

    fn check(&self, document: &str, block: Block) -> Vec<LintViolation> {
        if !document.contains(block.marker()) {
            return vec![violation(
                self,
                ViolationSeverity::Info,
                block,
                format!("No \"{}\" heading; defaults apply", block.marker()),
                None,
            )];
        }
        if fenced_block_after(document, block.marker()).is_none() {
            return vec![violation(
                self,
                ViolationSeverity::Warning,
                block,
                "Heading present but no complete fenced block follows it".to_string(),
                Some(format!("Wrap the settings in {} fences", FENCE).as_str()),
            )];
        }
        vec![]
    }
}

pub struct UnparsedLineRule;

impl LintRule for UnparsedLineRule {
    fn name(&self) -> &'static str { "unparsed_line" }

    fn check(&self, document: &str, block: Block) -> Vec<LintViolation> {
        skipped_lines(document, block.marker())
            .into_iter()
            // Line 1 is the fence's info string.
            .filter(|(line_no, _)| *line_no > 1)
            .map(|(line_no, line)| {
                violation(
                    self,
                    ViolationSeverity::Warning,
                    block,
                    format!("Line {} ignored: {}", line_no, line),
                    Some("Use `key := value`"),
                )
            })
            .collect()
    }
}

pub struct EmptyKeyRule;

impl LintRule for EmptyKeyRule {
    fn name(&self) -> &'static str { "empty_key" }

    fn check(&self, document: &str, block: Block) -> Vec<LintViolation> {
        extract_pairs(document, block.marker())
            .into_iter()
            .filter(|(key, _)| key.is_empty())
            .map(|(_, value)| {
                violation(
                    self,
                    ViolationSeverity::Warning,
                    block,
                    format!("Value `{}` is stored under an empty key", value),
                    Some("Put the setting name before `:=`"),
                )
            })
            .collect()
    }
}

pub struct DuplicateKeyRule;

impl LintRule for DuplicateKeyRule {
    fn name(&self) -> &'static str { "duplicate_key" }

    fn check(&self, document: &str, block: Block) -> Vec<LintViolation> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for (key, _) in extract_pairs(document, block.marker()) {
            *counts.entry(key).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, count)| {
                violation(
                    self,
                    ViolationSeverity::Warning,
                    block,
                    format!("Key `{}` assigned {} times; the last value wins", key, count),
                    None,
                )
            })
            .collect()
    }
}

pub struct UnknownBrandingKeyRule;

impl LintRule for UnknownBrandingKeyRule {
    fn name(&self) -> &'static str { "unknown_key" }

    fn check(&self, document: &str, block: Block) -> Vec<LintViolation> {
        if block != Block::Branding {
            return vec![];
        }
        extract_pairs(document, block.marker())
            .into_iter()
            .filter(|(key, _)| !key.is_empty() && !BRANDING_KEYS.contains(&key.as_str()))
            .map(|(key, _)| {
                violation(
                    self,
                    ViolationSeverity::Info,
                    block,
                    format!("Key `{}` is not a branding setting", key),
                    None,
                )
            })
            .collect()
    }
}

pub struct PrinterSentinelRule;

impl LintRule for PrinterSentinelRule {
    fn name(&self) -> &'static str { "printer_unconfigured" }

    fn check(&self, document: &str, block: Block) -> Vec<LintViolation> {
        if block != Block::Printer {
            return vec![];
        }
        let last_ip = extract_pairs(document, block.marker())
            .into_iter()
            .filter(|(key, _)| key == "printer_ip")
            .last();
        match last_ip {
            Some((_, value)) if value == UNCONFIGURED_SENTINEL => vec![violation(
                self,
                ViolationSeverity::Info,
                block,
                format!("printer_ip is {}; labels must be downloaded manually", UNCONFIGURED_SENTINEL),
                Some("Set printer_ip to the printer's address"),
            )],
            _ => vec![],
        }
    }
}

pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
}

impl Linter {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(MissingBlockRule),
                Box::new(UnparsedLineRule),
                Box::new(EmptyKeyRule),
                Box::new(DuplicateKeyRule),
                Box::new(UnknownBrandingKeyRule),
                Box::new(PrinterSentinelRule),
            ],
        }
    }

    pub fn lint(&self, tenant: &str, document: &str) -> LintReport {
        let mut violations = vec![];
        for block in Block::ALL {
            for rule in &self.rules {
                violations.extend(rule.check(document, block));
            }
        }
        LintReport {
            tenant: tenant.to_string(),
            clean: !violations
                .iter()
                .any(|v| v.severity == ViolationSeverity::Warning),
            violations,
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}
