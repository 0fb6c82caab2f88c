//! KernelForge CLI - Bridge interface for the backend
//!
//! Commands: compose, branding, printer, label, print, lint
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero on failure

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use kernelforge_core::{
    logging, ChemicalRecord, EngineConfig, LabelSpec, LabelVariant, PrinterTarget, TenantEngine, TenantIdentity,
};

#[derive(Parser)]
#[command(name = "kernelforge-cli")]
#[command(about = "KernelForge CLI - Tenant Kernel Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to engine config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the kernels directory
    #[arg(short, long)]
    kernels_dir: Option<PathBuf>,

    /// Override the uploads directory
    #[arg(short, long)]
    uploads_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TenantArgs {
    /// Tenant slug
    #[arg(short, long)]
    tenant: String,

    /// Tenant display name (defaults to the slug)
    #[arg(short, long)]
    name: Option<String>,
}

impl TenantArgs {
    fn identity(&self) -> TenantIdentity {
        TenantIdentity::new(self.name.as_deref().unwrap_or(self.tenant.as_str()), self.tenant.as_str())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the kernel for a tenant
    Compose {
        #[command(flatten)]
        tenant: TenantArgs,

        /// JSON array of chemical records
        #[arg(long)]
        chemicals: Option<String>,

        /// Print the kernel text instead of JSON
        #[arg(long)]
        raw: bool,
    },

    /// Show tenant branding
    Branding {
        #[command(flatten)]
        tenant: TenantArgs,
    },

    /// Show tenant printer settings and the resolved target
    Printer {
        #[command(flatten)]
        tenant: TenantArgs,
    },

    /// Encode a label
    Label {
        /// JSON payload (LabelSpec)
        #[arg(short, long)]
        payload: String,

        /// Label type overriding the payload variant (ghs_primary, primary, secondary)
        #[arg(long)]
        label_type: Option<String>,
    },

    /// Encode a label and send it to the tenant's printer
    Print {
        #[command(flatten)]
        tenant: TenantArgs,

        /// JSON payload (LabelSpec)
        #[arg(short, long)]
        payload: String,

        /// Printer address overriding the tenant setting
        #[arg(long)]
        printer_ip: Option<String>,
    },

    /// Report problems in the tenant document's config blocks
    Lint {
        #[command(flatten)]
        tenant: TenantArgs,
    },
}

fn emit<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&format!("Serialization error: {}", e)),
    }
}

fn fail(message: &str) -> ExitCode {
    tracing::error!("{}", message);
    println!("{}", serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn parse<T: serde::de::DeserializeOwned>(what: &str, payload: &str) -> Result<T, ExitCode> {
    serde_json::from_str(payload).map_err(|e| fail(&format!("Invalid {}: {}", what, e)))
}

fn main() -> ExitCode {
    logging::init_cli();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(c) => c,
            Err(e) => return fail(&e.to_string()),
        },
        None => EngineConfig::default(),
    };
    if let Some(dir) = cli.kernels_dir {
        config.kernels_dir = dir;
    }
    if let Some(dir) = cli.uploads_dir {
        config.uploads_dir = dir;
    }

    let engine = TenantEngine::from_config(&config);

    match cli.command {
        Commands::Compose { tenant, chemicals, raw } => {
            let chemicals: Vec<ChemicalRecord> = match chemicals {
                Some(json) => match parse("chemicals", &json) {
                    Ok(c) => c,
                    Err(code) => return code,
                },
                None => vec![],
            };
            match engine.kernel(&tenant.identity(), &chemicals) {
                Ok(kernel) if raw => {
                    println!("{}", kernel.text);
                    ExitCode::SUCCESS
                }
                Ok(kernel) => emit(&kernel),
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::Branding { tenant } => match engine.branding(&tenant.identity()) {
            Ok(branding) => emit(&branding),
            Err(e) => fail(&e.to_string()),
        },

        Commands::Printer { tenant } => {
            match engine.printer_config(&tenant.identity()) {
                Ok(config) => emit(&serde_json::json!({
                    "target": PrinterTarget::resolve(None, &config),
                    "settings": config.settings,
                })),
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::Label { payload, label_type } => {
            let mut spec: LabelSpec = match parse("payload", &payload) {
                Ok(s) => s,
                Err(code) => return code,
            };
            if let Some(label_type) = label_type {
                match label_type.parse::<LabelVariant>() {
                    Ok(variant) => spec.variant = variant,
                    Err(e) => return fail(&e.to_string()),
                }
            }
            match engine.encode_label(spec) {
                Ok(label) => emit(&serde_json::json!({ "success": true, "label": label })),
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::Print { tenant, payload, printer_ip } => {
            let spec: LabelSpec = match parse("payload", &payload) {
                Ok(s) => s,
                Err(code) => return code,
            };
            let transport = config.transport();
            let result = engine.encode_label(spec).and_then(|label| {
                engine.print(&tenant.identity(), &label, printer_ip.as_deref(), &transport)
            });
            match result {
                Ok(outcome) => emit(&serde_json::json!({ "success": true, "outcome": outcome })),
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::Lint { tenant } => match engine.lint(&tenant.identity()) {
            Ok(report) => {
                let code = emit(&report);
                if report.clean {
                    code
                } else {
                    ExitCode::from(2) // Lint warnings
                }
            }
            Err(e) => fail(&e.to_string()),
        },
    }
}
