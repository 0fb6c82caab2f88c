//! Document Store - Named Text Documents
//!
//! Kernels and tenant documents are loaded by key. "Not found" is an
//! expected outcome and is kept apart from store failures.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of a loadable document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum DocumentKey {
    /// The base agent kernel
    Base,
    /// A tool fragment, named by its reference path (e.g. `safety.ttc.md`)
    Tool(String),
    /// A tenant override document, named by tenant slug
    Tenant(String),
}

impl DocumentKey {
    pub fn tool(reference: impl Into<String>) -> Self {
        Self::Tool(reference.into())
    }

    pub fn tenant(slug: impl Into<String>) -> Self {
        Self::Tenant(slug.into())
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Tool(name) => write!(f, "tool/{}", name),
            Self::Tenant(slug) => write!(f, "tenant/{}", slug),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Document not found: {0}")]
    NotFound(DocumentKey),

    #[error("Document store unavailable while loading {key}: {reason}")]
    Unavailable { key: DocumentKey, reason: String },
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Loads documents by key.
///
/// Implementations must be stateless across calls as far as callers can
/// observe: the same key against an unchanged store yields the same text.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, key: &DocumentKey) -> Result<String, LoadError>;

    /// Load a document, mapping `NotFound` to `None`.
    fn load_optional(&self, key: &DocumentKey) -> Result<Option<String>, LoadError> {
        match self.load(key) {
            Ok(text) => Ok(Some(text)),
            Err(LoadError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<L: DocumentLoader + ?Sized> DocumentLoader for &L {
    fn load(&self, key: &DocumentKey) -> Result<String, LoadError> {
        (**self).load(key)
    }
}

/// In-memory store keyed by the display form of [`DocumentKey`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: BTreeMap<String, String>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: DocumentKey, text: impl Into<String>) {
        self.documents.insert(key.to_string(), text.into());
    }

    pub fn with(mut self, key: DocumentKey, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }
}

impl DocumentLoader for MemoryDocumentStore {
    fn load(&self, key: &DocumentKey) -> Result<String, LoadError> {
        self.documents
            .get(&key.to_string())
            .cloned()
            .ok_or_else(|| LoadError::NotFound(key.clone()))
    }
}

/// Filesystem layout:
///
/// ```text
/// <root>/<base_file>                  base
/// <root>/tools/<reference>            tool/<reference>
/// <root>/tenants/<slug>-sds.ttc.md    tenant/<slug>
/// ```
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
    base_file: String,
    timeout: Option<Duration>,
}

pub const DEFAULT_BASE_FILE: &str = "sds_v1.0.ttc.md";
pub const TENANT_DOCUMENT_SUFFIX: &str = "-sds.ttc.md";

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_file: DEFAULT_BASE_FILE.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_file(mut self, base_file: impl Into<String>) -> Self {
        self.base_file = base_file.into();
        self
    }

    /// Bound every read; an expired read is reported as `Unavailable`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its file, or `None` when the name would leave its directory.
    pub fn path_for(&self, key: &DocumentKey) -> Option<PathBuf> {
        match key {
            DocumentKey::Base => Some(self.root.join(&self.base_file)),
            DocumentKey::Tool(name) => {
                is_contained(name).then(|| self.root.join("tools").join(name))
            }
            DocumentKey::Tenant(slug) => is_contained(slug).then(|| {
                self.root
                    .join("tenants")
                    .join(format!("{}{}", slug, TENANT_DOCUMENT_SUFFIX))
            }),
        }
    }

    fn read(&self, key: &DocumentKey, path: PathBuf) -> Result<String, LoadError> {
        let Some(timeout) = self.timeout else {
            return read_file(key, &path);
        };

        let (tx, rx) = mpsc::channel();
        let thread_key = key.clone();
        thread::spawn(move || {
            // The receiver may have given up already; nothing to report then.
            let _ = tx.send(read_file(&thread_key, &path));
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(LoadError::Unavailable {
                key: key.clone(),
                reason: format!("read timed out after {}ms", timeout.as_millis()),
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(LoadError::Unavailable {
                key: key.clone(),
                reason: "reader thread exited without a result".to_string(),
            }),
        }
    }
}

impl DocumentLoader for FsDocumentStore {
    fn load(&self, key: &DocumentKey) -> Result<String, LoadError> {
        let Some(path) = self.path_for(key) else {
            tracing::warn!(%key, "refusing document name outside its directory");
            return Err(LoadError::NotFound(key.clone()));
        };
        self.read(key, path)
    }
}

fn read_file(key: &DocumentKey, path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(key.clone()),
        _ => LoadError::Unavailable {
            key: key.clone(),
            reason: e.to_string(),
        },
    })
}

fn is_contained(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
