//! KernelForge Core - Tenant Kernel Compiler
//!
//! # The Laws
//! 1. Missing Documents Are Not Errors (base falls back, the rest is skipped)
//! 2. Store Failures Always Surface
//! 3. Composition Is Pure (same store + same bindings = same bytes)
//! 4. Config Blocks Are Permissive (unreadable lines are skipped, never fatal)
//! 5. Labels Never Overrun Their Layout

pub mod agent;
pub mod branding;
pub mod config;
pub mod config_block;
pub mod engine;
pub mod grammar;
pub mod hashing;
pub mod kernel;
pub mod label;
pub mod lint;
pub mod logging;
pub mod print;
pub mod roster;
pub mod store;

pub use agent::{AgentConfig, AgentRequest, AgentResponse, LanguageModel, TokenUsage};
pub use branding::{Branding, PrinterConfig};
pub use config::EngineConfig;
pub use config_block::{extract, BRANDING_MARKER, PRINTER_MARKER};
pub use engine::{EncodedLabel, EngineError, PrintOutcome, TenantEngine};
pub use hashing::{compute_label_hash, sha256_hex};
pub use kernel::{Bindings, ComposeError, ComposedKernel, KernelComposer};
pub use label::{encode, LabelSpec, LabelVariant};
pub use print::{PrintAuthority, PrinterTarget};
pub use roster::{ChemicalRecord, TenantIdentity};
pub use store::{DocumentKey, DocumentLoader, FsDocumentStore, LoadError, MemoryDocumentStore};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
