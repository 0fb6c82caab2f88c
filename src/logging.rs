//! Tracing setup for the CLI.
//!
//! Logs go to stderr so stdout carries only JSON. Level comes from
//! `RUST_LOG` (default: `info`).

use tracing_subscriber::EnvFilter;

pub fn init_cli() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
