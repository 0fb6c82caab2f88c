//! Engine configuration.
//!
//! Every field has a default, so an absent or partial JSON file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::AgentConfig;
use crate::print::{TcpTransport, DEFAULT_PRINTER_PORT};
use crate::store::{FsDocumentStore, DEFAULT_BASE_FILE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Root of `tools/` and `tenants/` kernel documents
    #[serde(default = "default_kernels_dir")]
    pub kernels_dir: PathBuf,
    /// Root of per-tenant uploads (`<uploads>/tenants/<slug>/`)
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_base_kernel")]
    pub base_kernel: String,
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
    #[serde(default = "default_printer_port")]
    pub printer_port: u16,
    #[serde(default = "default_printer_timeout_ms")]
    pub printer_timeout_ms: u64,
    #[serde(default)]
    pub agent: AgentConfig,
}

fn default_kernels_dir() -> PathBuf { PathBuf::from("kernels") }
fn default_uploads_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_base_kernel() -> String { DEFAULT_BASE_FILE.to_string() }
fn default_load_timeout_ms() -> u64 { 5000 }
fn default_printer_port() -> u16 { DEFAULT_PRINTER_PORT }
fn default_printer_timeout_ms() -> u64 { 5000 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kernels_dir: default_kernels_dir(),
            uploads_dir: default_uploads_dir(),
            base_kernel: default_base_kernel(),
            load_timeout_ms: default_load_timeout_ms(),
            printer_port: default_printer_port(),
            printer_timeout_ms: default_printer_timeout_ms(),
            agent: AgentConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn document_store(&self) -> FsDocumentStore {
        FsDocumentStore::new(&self.kernels_dir)
            .with_base_file(&self.base_kernel)
            .with_timeout(Duration::from_millis(self.load_timeout_ms))
    }

    pub fn tenant_asset_root(&self, slug: &str) -> PathBuf {
        tenant_asset_root(&self.uploads_dir, slug)
    }

    pub fn transport(&self) -> TcpTransport {
        TcpTransport {
            port: self.printer_port,
            timeout: Duration::from_millis(self.printer_timeout_ms),
        }
    }
}

/// Upload directory of one tenant: `<uploads>/tenants/<slug>`.
pub fn tenant_asset_root(uploads_dir: &Path, slug: &str) -> PathBuf {
    uploads_dir.join("tenants").join(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"kernelsDir": "/app/kernels", "agent": {"model": "gemini-2.5-pro"}}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.kernels_dir, PathBuf::from("/app/kernels"));
        assert_eq!(config.base_kernel, DEFAULT_BASE_FILE);
        assert_eq!(config.agent.model, "gemini-2.5-pro");
        assert_eq!(config.agent.max_output_tokens, 6000);
        assert_eq!(config.tenant_asset_root("acme"), PathBuf::from("uploads/tenants/acme"));
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(EngineConfig::load(&missing), Err(ConfigError::Read { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = EngineConfig::load(&bad).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
