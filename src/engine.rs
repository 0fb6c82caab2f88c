//! Tenant Engine - Single Entry Point
//!
//! Wires one document store to the composer, the config-block consumers and
//! the label encoder. Holds no per-tenant state; every call reads the store
//! afresh.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{AgentConfig, AgentError, AgentRequest, AgentResponse, LanguageModel};
use crate::branding::{Branding, PrinterConfig};
use crate::config::{tenant_asset_root, EngineConfig};
use crate::hashing::compute_label_hash;
use crate::kernel::{Bindings, ComposeError, ComposedKernel, KernelComposer};
use crate::label::{encode, LabelSpec};
use crate::lint::{LintReport, Linter};
use crate::print::{LabelTransport, PrinterTarget, TransportError};
use crate::roster::{ChemicalRecord, TenantIdentity};
use crate::store::{DocumentKey, DocumentLoader, LoadError};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Store(#[from] LoadError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedLabel {
    pub spec: LabelSpec,
    pub zpl: String,
    pub label_hash: String,
    pub engine_version: String,
    pub encoded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrintOutcome {
    Sent { address: String, quantity: u32 },
    /// No printer configured; the ZPL is handed back for manual download
    ManualDownload { zpl: String },
}

pub struct TenantEngine<L> {
    composer: KernelComposer<L>,
    uploads_dir: PathBuf,
    linter: Linter,
}

impl<L: DocumentLoader> TenantEngine<L> {
    pub fn new(loader: L, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            composer: KernelComposer::new(loader),
            uploads_dir: uploads_dir.into(),
            linter: Linter::new(),
        }
    }

    fn tenant_document(&self, tenant: &TenantIdentity) -> Result<Option<String>, EngineError> {
        Ok(self
            .composer
            .loader()
            .load_optional(&DocumentKey::tenant(tenant.slug.as_str()))?)
    }

    /// Compose the kernel with the tenant's name and chemical roster bound.
    pub fn kernel(
        &self,
        tenant: &TenantIdentity,
        chemicals: &[ChemicalRecord],
    ) -> Result<ComposedKernel, EngineError> {
        let bindings = Bindings::for_tenant(tenant, chemicals);
        Ok(self.composer.compose(&tenant.slug, &bindings)?)
    }

    /// Compose the tenant's kernel and send it with `message` to the model.
    pub fn ask(
        &self,
        model: &dyn LanguageModel,
        config: &AgentConfig,
        tenant: &TenantIdentity,
        chemicals: &[ChemicalRecord],
        message: &str,
        context: &str,
    ) -> Result<AgentResponse, EngineError> {
        let kernel = self.kernel(tenant, chemicals)?;
        let request = AgentRequest::new(kernel.text, message).with_context(context);
        let response = model.generate(config, &request)?;
        tracing::debug!(
            tenant = %tenant.slug,
            kernel_digest = %kernel.digest,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "model answered"
        );
        Ok(response)
    }

    /// Branding block over defaults; no tenant document means defaults.
    pub fn branding(&self, tenant: &TenantIdentity) -> Result<Branding, EngineError> {
        let asset_root = tenant_asset_root(&self.uploads_dir, &tenant.slug);
        Ok(match self.tenant_document(tenant)? {
            Some(document) => Branding::from_document(tenant, &document, &asset_root),
            None => Branding::defaults(tenant),
        })
    }

    pub fn printer_config(&self, tenant: &TenantIdentity) -> Result<PrinterConfig, EngineError> {
        Ok(self
            .tenant_document(tenant)?
            .map(|document| PrinterConfig::from_document(&document))
            .unwrap_or_default())
    }

    pub fn printer_target(
        &self,
        tenant: &TenantIdentity,
        requested: Option<&str>,
    ) -> Result<PrinterTarget, EngineError> {
        Ok(PrinterTarget::resolve(requested, &self.printer_config(tenant)?))
    }

    /// Lint the tenant document. A missing document lints as empty.
    pub fn lint(&self, tenant: &TenantIdentity) -> Result<LintReport, EngineError> {
        let document = self.tenant_document(tenant)?.unwrap_or_default();
        Ok(self.linter.lint(&tenant.slug, &document))
    }

    pub fn encode_label(&self, spec: LabelSpec) -> Result<EncodedLabel, EngineError> {
        let zpl = encode(&spec);
        let label_hash = compute_label_hash(&spec, &zpl, ENGINE_VERSION)?;
        Ok(EncodedLabel {
            spec,
            zpl,
            label_hash,
            engine_version: ENGINE_VERSION.to_string(),
            encoded_at: Utc::now(),
        })
    }

    /// Send an encoded label, or hand it back when no printer is configured.
    pub fn print(
        &self,
        tenant: &TenantIdentity,
        label: &EncodedLabel,
        requested: Option<&str>,
        transport: &dyn LabelTransport,
    ) -> Result<PrintOutcome, EngineError> {
        match self.printer_target(tenant, requested)? {
            PrinterTarget::Configured { address, authority } => {
                tracing::debug!(tenant = %tenant.slug, %address, ?authority, "printing label");
                transport.send(&address, &label.zpl)?;
                Ok(PrintOutcome::Sent {
                    address,
                    quantity: label.spec.quantity,
                })
            }
            PrinterTarget::Unconfigured => Ok(PrintOutcome::ManualDownload {
                zpl: label.zpl.clone(),
            }),
        }
    }
}

impl TenantEngine<crate::store::FsDocumentStore> {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.document_store(), config.uploads_dir.clone())
    }
}
