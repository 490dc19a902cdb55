use std::fmt;

use thiserror::Error;

use crate::soap::transport::TransportError;
use crate::soap::xml::XmlError;

/// Fault code the provider returns for a rejected username/password pair.
pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";

/// A `<SOAP-ENV:Fault>` returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Local part of `faultcode`, e.g. `Server` or `INVALID_CREDENTIALS`.
    pub code: String,
    /// `server` unless the fault code is one of the envelope namespace codes,
    /// in which case it is that code lowercased.
    pub origin: String,
    pub message: String,
}

impl Fault {
    pub fn is_authentication(&self) -> bool {
        self.code == INVALID_CREDENTIALS
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.message)
    }
}

#[derive(Error, Debug)]
pub enum SoapError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("HTTP status {status} without SOAP fault: {body}")]
    Status { status: u16, body: String },

    #[error("SOAP fault ({}): {}", .0.origin, .0.message)]
    Fault(Fault),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Cannot encode parameter: {0}")]
    Encoding(String),

    #[error("Cannot parse response: {0}")]
    Parse(String),
}

impl SoapError {
    /// True for failures that happened before a SOAP body could be obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, SoapError::Transport(_) | SoapError::Status { .. })
    }
}

impl From<XmlError> for SoapError {
    fn from(err: XmlError) -> Self {
        SoapError::Parse(err.to_string())
    }
}

impl From<Fault> for SoapError {
    fn from(fault: Fault) -> Self {
        if fault.is_authentication() {
            SoapError::Authentication(fault.message)
        } else {
            SoapError::Fault(fault)
        }
    }
}
