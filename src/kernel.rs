//! Kernel Composer - Three-Layer Instruction Document
//!
//! base (variables substituted) → tool fragments (first-seen order) → tenant override.
//! Composition is a pure function of the loader contents and the bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grammar::{self, Placeholder};
use crate::hashing::sha256_hex;
use crate::roster::{roster_summary, ChemicalRecord, TenantIdentity};
use crate::store::{DocumentKey, DocumentLoader, LoadError};

/// Used when the base kernel is absent from the store.
pub const FALLBACK_KERNEL: &str = "You are an SDS management assistant.";

pub const SECTION_DELIMITER: &str = "\n\n---\n\n";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(#[source] LoadError),
}

/// Placeholder values for one composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    values: BTreeMap<Placeholder, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tenant name and chemical roster summary.
    pub fn for_tenant(tenant: &TenantIdentity, chemicals: &[ChemicalRecord]) -> Self {
        Self::new()
            .with(Placeholder::TenantName, tenant.display_name.clone())
            .with(Placeholder::ChemicalList, roster_summary(chemicals))
    }

    pub fn with(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.values.insert(placeholder, value.into());
        self
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }

    pub fn apply(&self, text: &str) -> String {
        grammar::substitute(text, |p| self.get(p))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedKernel {
    pub text: String,
    /// References whose fragment was found and appended, in append order
    pub fragments: Vec<String>,
    /// References found in the base but absent from the store
    pub missing_fragments: Vec<String>,
    pub tenant_override: bool,
    pub used_fallback: bool,
    /// SHA-256 of `text`
    pub digest: String,
}

impl ComposedKernel {
    pub fn into_text(self) -> String {
        self.text
    }
}

pub struct KernelComposer<L> {
    loader: L,
}

impl<L: DocumentLoader> KernelComposer<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Compose the kernel for `tenant_slug`.
    ///
    /// Missing documents are never errors: the base falls back to
    /// [`FALLBACK_KERNEL`], fragments and the tenant override are skipped.
    pub fn compose(&self, tenant_slug: &str, bindings: &Bindings) -> Result<ComposedKernel, ComposeError> {
        let (base, used_fallback) = match self.load(&DocumentKey::Base)? {
            Some(text) => (text, false),
            None => {
                tracing::warn!("base kernel not found, using fallback");
                (FALLBACK_KERNEL.to_string(), true)
            }
        };

        let mut kernel = bindings.apply(&base);
        let mut fragments = vec![];
        let mut missing_fragments = vec![];

        for reference in grammar::fragment_references(&kernel) {
            match self.load(&DocumentKey::tool(reference.as_str()))? {
                Some(content) => {
                    tracing::debug!(%reference, "appending tool fragment");
                    kernel.push_str(SECTION_DELIMITER);
                    kernel.push_str(&format!("<!-- Tool: {} -->\n", reference));
                    kernel.push_str(&content);
                    fragments.push(reference);
                }
                None => {
                    tracing::debug!(%reference, "tool fragment not found, skipping");
                    missing_fragments.push(reference);
                }
            }
        }

        let tenant_override = match self.load(&DocumentKey::tenant(tenant_slug))? {
            Some(content) => {
                kernel.push_str(SECTION_DELIMITER);
                kernel.push_str(&bindings.apply(&content));
                true
            }
            None => false,
        };

        tracing::debug!(
            tenant = tenant_slug,
            fragments = fragments.len(),
            tenant_override,
            "kernel composed"
        );

        Ok(ComposedKernel {
            digest: sha256_hex(kernel.as_bytes()),
            text: kernel,
            fragments,
            missing_fragments,
            tenant_override,
            used_fallback,
        })
    }

    fn load(&self, key: &DocumentKey) -> Result<Option<String>, ComposeError> {
        self.loader
            .load_optional(key)
            .map_err(ComposeError::StoreUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;

    struct FailingStore;

    impl DocumentLoader for FailingStore {
        fn load(&self, key: &DocumentKey) -> Result<String, LoadError> {
            match key {
                DocumentKey::Base => Ok("see §tools/x.ttc.md".to_string()),
                _ => Err(LoadError::Unavailable {
                    key: key.clone(),
                    reason: "disk on fire".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_fallback_when_base_missing() {
        let composer = KernelComposer::new(MemoryDocumentStore::new());
        let kernel = composer.compose("acme", &Bindings::new()).unwrap();
        assert_eq!(kernel.text, FALLBACK_KERNEL);
        assert!(kernel.used_fallback);
        assert!(!kernel.text.contains(grammar::FRAGMENT_SIGIL));
    }

    #[test]
    fn test_tenant_override_substituted_independently() {
        let store = MemoryDocumentStore::new()
            .with(DocumentKey::Base, "base for {TENANT_NAME}")
            .with(DocumentKey::tenant("acme"), "override for {TENANT_NAME} §tools/a.ttc.md")
            .with(DocumentKey::tool("a.ttc.md"), "tool A");
        let bindings = Bindings::new().with(Placeholder::TenantName, "Acme");

        let kernel = KernelComposer::new(store).compose("acme", &bindings).unwrap();
        // References inside the override are not resolved.
        assert_eq!(
            kernel.text,
            "base for Acme\n\n---\n\noverride for Acme §tools/a.ttc.md"
        );
        assert!(kernel.tenant_override);
        assert!(kernel.fragments.is_empty());
    }

    #[test]
    fn test_reference_introduced_by_binding_is_resolved() {
        let store = MemoryDocumentStore::new()
            .with(DocumentKey::Base, "{CHEMICAL_LIST}")
            .with(DocumentKey::tool("a.ttc.md"), "tool A");
        let bindings = Bindings::new().with(Placeholder::ChemicalList, "§tools/a.ttc.md");

        let kernel = KernelComposer::new(store).compose("acme", &bindings).unwrap();
        assert_eq!(kernel.fragments, vec!["a.ttc.md"]);
    }

    #[test]
    fn test_missing_fragment_skipped_silently() {
        let store = MemoryDocumentStore::new().with(DocumentKey::Base, "see §tools/gone.ttc.md");
        let kernel = KernelComposer::new(store).compose("acme", &Bindings::new()).unwrap();
        assert_eq!(kernel.text, "see §tools/gone.ttc.md");
        assert_eq!(kernel.missing_fragments, vec!["gone.ttc.md"]);
    }

    #[test]
    fn test_store_failure_propagates() {
        let composer = KernelComposer::new(FailingStore);
        let err = composer.compose("acme", &Bindings::new()).unwrap_err();
        assert!(err.to_string().contains("Document store unavailable"));
    }

    #[test]
    fn test_bindings_for_tenant() {
        let tenant = TenantIdentity::new("Acme Labs", "acme");
        let bindings = Bindings::for_tenant(&tenant, &[]);
        assert_eq!(bindings.get(Placeholder::TenantName), Some("Acme Labs"));
        assert_eq!(
            bindings.get(Placeholder::ChemicalList),
            Some(crate::roster::EMPTY_ROSTER)
        );
    }
}
