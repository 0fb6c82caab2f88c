//! Token Grammar - Placeholders, Fragment References, Config Blocks
//!
//! ```text
//! placeholder   = "{" ( "TENANT_NAME" | "CHEMICAL_LIST" ) "}"
//! fragment_ref  = "§tools/" path
//! path          = 1*non-whitespace ".ttc.md"
//! fence         = "```"
//! block         = marker *any fence body fence      ; first fence pair after marker
//! assignment    = key ":=" value                     ; split on first ":="
//! key           = trimmed (may be empty)
//! value         = trimmed, one surrounding '"' stripped per side
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const FRAGMENT_SIGIL: &str = "§tools/";
pub const FENCE: &str = "```";
pub const ASSIGNMENT: &str = ":=";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(TENANT_NAME|CHEMICAL_LIST)\}").expect("placeholder pattern"));

static FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"§tools/(\S+\.ttc\.md)").expect("fragment pattern"));

/// Fixed placeholder vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Placeholder {
    TenantName,
    ChemicalList,
}

impl Placeholder {
    pub const ALL: [Placeholder; 2] = [Placeholder::TenantName, Placeholder::ChemicalList];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TenantName => "TENANT_NAME",
            Self::ChemicalList => "CHEMICAL_LIST",
        }
    }

    /// The literal token as it appears in documents, e.g. `{TENANT_NAME}`.
    pub fn token(&self) -> String {
        format!("{{{}}}", self.name())
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Replace every placeholder in one left-to-right pass.
///
/// Replacement text is never rescanned. Placeholders without a value stay as-is.
pub fn substitute<'a, F>(text: &str, mut lookup: F) -> String
where
    F: FnMut(Placeholder) -> Option<&'a str>,
{
    PLACEHOLDER_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            Placeholder::from_name(&caps[1])
                .and_then(&mut lookup)
                .map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}

/// Distinct fragment references in first-seen order.
///
/// Returns the path part only (`safety.ttc.md` for `§tools/safety.ttc.md`).
pub fn fragment_references(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    FRAGMENT_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|reference| seen.insert(reference.clone()))
        .collect()
}

/// Body of the first fenced region after the first `marker`, if any.
///
/// The body starts right after the opening fence, so an info string such as
/// `text` on the fence line ends up as an ordinary (non-assignment) line.
pub fn fenced_block_after<'a>(document: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    let after_marker = &document[document.find(marker)? + marker.len()..];
    let after_open = &after_marker[after_marker.find(FENCE)? + FENCE.len()..];
    let close = after_open.find(FENCE)?;
    Some(&after_open[..close])
}

/// Parse one `key := value` line. Lines without `:=` yield `None`.
///
/// A line with nothing before `:=` still parses, under the empty key.
pub fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(ASSIGNMENT)?;
    Some((key.trim(), strip_quotes(value.trim())))
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_single_pass() {
        let out = substitute("{TENANT_NAME} / {CHEMICAL_LIST}", |p| match p {
            Placeholder::TenantName => Some("{CHEMICAL_LIST}"),
            Placeholder::ChemicalList => Some("acetone"),
        });
        assert_eq!(out, "{CHEMICAL_LIST} / acetone");
    }

    #[test]
    fn test_placeholder_tokens() {
        assert_eq!(Placeholder::TenantName.token(), "{TENANT_NAME}");
        assert_eq!(Placeholder::ChemicalList.token(), "{CHEMICAL_LIST}");
    }

    #[test]
    fn test_substitute_leaves_unbound() {
        let out = substitute("Hi {TENANT_NAME}, {UNKNOWN} {CHEMICAL_LIST}", |p| match p {
            Placeholder::TenantName => Some("Acme"),
            Placeholder::ChemicalList => None,
        });
        assert_eq!(out, "Hi Acme, {UNKNOWN} {CHEMICAL_LIST}");
    }

    #[test]
    fn test_fragment_references_dedup_first_seen() {
        let text = "use §tools/b.ttc.md then §tools/a.ttc.md, and §tools/b.ttc.md again";
        assert_eq!(fragment_references(text), vec!["b.ttc.md", "a.ttc.md"]);
    }

    #[test]
    fn test_fragment_reference_shapes() {
        assert!(fragment_references("§tools/notes.md").is_empty());
        assert!(fragment_references("tools/a.ttc.md").is_empty());
        assert_eq!(fragment_references("(§tools/sub/x.ttc.md)"), vec!["sub/x.ttc.md"]);
    }

    #[test]
    fn test_fenced_block_after_marker() {
        let doc = "```\nearly := 1\n```\n### Marker\ntext\n```\na := 1\n```\n```\nb := 2\n```";
        assert_eq!(fenced_block_after(doc, "### Marker"), Some("\na := 1\n"));
        assert_eq!(fenced_block_after(doc, "### Missing"), None);
        assert_eq!(fenced_block_after("### Marker\n```\nunterminated", "### Marker"), None);
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("  key :=  \"v 1\" "), Some(("key", "v 1")));
        assert_eq!(parse_assignment("url := http://x:=y"), Some(("url", "http://x:=y")));
        assert_eq!(parse_assignment("# comment"), None);
        assert_eq!(parse_assignment(" := orphan"), Some(("", "orphan")));
        assert_eq!(parse_assignment("k := \"\"\"x\"\"\""), Some(("k", "\"\"x\"\"")));
    }
}
