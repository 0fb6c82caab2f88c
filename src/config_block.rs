//! Config Block Extractor
//!
//! Tenant documents are hand-edited markdown. Settings live in a fenced block
//! under a heading:
//!
//! ````text
//! ### 打印配置
//! ```
//! printer_ip := "10.0.0.12"
//! ```
//! ````
//!
//! Extraction is permissive: anything that doesn't parse is skipped, and a
//! missing heading or fence yields an empty result.

use std::collections::BTreeMap;

use crate::grammar::{fenced_block_after, parse_assignment};

/// Heading of the branding block.
pub const BRANDING_MARKER: &str = "### 品牌标识";

/// Heading of the printer block.
pub const PRINTER_MARKER: &str = "### 打印配置";

pub type ConfigMap = BTreeMap<String, String>;

/// Every `key := value` assignment in the block, in encounter order.
pub fn extract_pairs(document: &str, marker: &str) -> Vec<(String, String)> {
    let Some(body) = fenced_block_after(document, marker) else {
        return vec![];
    };
    body.lines()
        .filter_map(parse_assignment)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// The block as a mapping; later assignments to a key overwrite earlier ones.
pub fn extract(document: &str, marker: &str) -> ConfigMap {
    extract_pairs(document, marker).into_iter().collect()
}

/// Lines of the block that were skipped as non-assignments. Line 1 is the
/// remainder of the opening fence line. Blank lines are not reported.
pub fn skipped_lines(document: &str, marker: &str) -> Vec<(usize, String)> {
    let Some(body) = fenced_block_after(document, marker) else {
        return vec![];
    };
    body.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && parse_assignment(line).is_none())
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TENANT_DOC: &str = "# Acme SDS kernel\n\
        Some prose.\n\
        \n\
        ### 品牌标识\n\
        Brand settings below.\n\
        ```\n\
        logo_file := \"acme.png\"\n\
        primary_color := #112233\n\
        # not an assignment\n\
        line1 := 1 Main St\n\
        line2 := Springfield\n\
        ```\n\
        \n\
        ### 打印配置\n\
        ```text\n\
        printer_ip := \"TBD\"\n\
        model := ZD421\n\
        ```\n";

    #[test]
    fn test_extract_branding_block() {
        let map = extract(TENANT_DOC, BRANDING_MARKER);
        assert_eq!(map.get("logo_file").map(String::as_str), Some("acme.png"));
        assert_eq!(map.get("primary_color").map(String::as_str), Some("#112233"));
        assert_eq!(map.len(), 4);
        assert!(!map.contains_key("printer_ip"));
    }

    #[test]
    fn test_extract_printer_block_ignores_info_string() {
        let map = extract(TENANT_DOC, PRINTER_MARKER);
        assert_eq!(map.len(), 2);
        assert_eq!(map["printer_ip"], "TBD");
        assert_eq!(map["model"], "ZD421");
    }

    #[test]
    fn test_pairs_keep_order() {
        let pairs = extract_pairs(TENANT_DOC, BRANDING_MARKER);
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["logo_file", "primary_color", "line1", "line2"]);
    }

    #[test]
    fn test_marker_without_fence_is_empty() {
        assert!(extract("### 打印配置\nprinter_ip := 1.2.3.4\n", PRINTER_MARKER).is_empty());
        assert!(extract("", PRINTER_MARKER).is_empty());
    }

    #[test]
    fn test_empty_key_is_recorded() {
        let doc = format!("{}\n```\n := orphan\nprinter_ip := 1.2.3.4\n```", PRINTER_MARKER);
        let map = extract(&doc, PRINTER_MARKER);
        assert_eq!(map.get("").map(String::as_str), Some("orphan"));
        assert_eq!(map["printer_ip"], "1.2.3.4");
        assert!(skipped_lines(&doc, PRINTER_MARKER).is_empty());
    }

    #[test]
    fn test_skipped_lines_reported() {
        let skipped = skipped_lines(TENANT_DOC, BRANDING_MARKER);
        assert_eq!(skipped, vec![(4, "# not an assignment".to_string())]);
    }
}
