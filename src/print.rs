//! Print Authority System
//!
//! Decides which printer a label goes to and ships the ZPL as raw bytes.

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::branding::{configured, PrinterConfig};

pub const DEFAULT_PRINTER_PORT: u16 = 9100;
pub const DEFAULT_PRINTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the printer address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintAuthority {
    /// Tenant document printer block
    Tenant,
    /// Explicit address on the print request
    Request,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrinterTarget {
    Configured { address: String, authority: PrintAuthority },
    /// No usable address; the caller should offer the ZPL for manual download
    Unconfigured,
}

impl PrinterTarget {
    /// Request override first, then the tenant's `printer_ip`.
    pub fn resolve(requested: Option<&str>, tenant: &PrinterConfig) -> Self {
        if let Some(address) = requested.and_then(configured) {
            return Self::Configured {
                address: address.to_string(),
                authority: PrintAuthority::Request,
            };
        }
        match tenant.printer_ip() {
            Some(address) => Self::Configured {
                address: address.to_string(),
                authority: PrintAuthority::Tenant,
            },
            None => Self::Unconfigured,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Configured { address, .. } => Some(address),
            Self::Unconfigured => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid printer address {0}")]
    InvalidAddress(String),

    #[error("Printer connection failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw byte-stream transport to a label printer.
pub trait LabelTransport {
    fn send(&self, address: &str, zpl: &str) -> Result<(), TransportError>;
}

/// Plain TCP, one connection per job.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    pub port: u16,
    pub timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self {
            port: DEFAULT_PRINTER_PORT,
            timeout: DEFAULT_PRINTER_TIMEOUT,
        }
    }
}

impl TcpTransport {
    fn socket_addr(&self, address: &str) -> Result<SocketAddr, TransportError> {
        (address, self.port)
            .to_socket_addrs()
            .map_err(|_| TransportError::InvalidAddress(address.to_string()))?
            .next()
            .ok_or_else(|| TransportError::InvalidAddress(address.to_string()))
    }
}

impl LabelTransport for TcpTransport {
    fn send(&self, address: &str, zpl: &str) -> Result<(), TransportError> {
        let addr = self.socket_addr(address)?;
        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(zpl.as_bytes())?;
        stream.flush()?;
        tracing::info!(printer = %addr, bytes = zpl.len(), "label sent");
        Ok(())
    }
}
