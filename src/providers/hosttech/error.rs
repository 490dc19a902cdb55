use thiserror::Error;

use crate::error::Error;
use crate::soap::SoapError;

#[derive(Error, Debug)]
pub enum HosttechProviderError {
    #[error("SOAP error: {0}")]
    Soap(#[from] SoapError),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected data: {0}")]
    InvalidData(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

pub fn map_error(e: HosttechProviderError) -> Error {
    use HosttechProviderError::*;
    match e {
        Soap(SoapError::Authentication(msg)) => Error::Authentication(msg),
        Soap(SoapError::Fault(fault)) => Error::Fault {
            code: fault.code,
            message: fault.message,
        },
        Soap(SoapError::Encoding(msg)) => Error::InvalidInput(msg),
        Soap(SoapError::Parse(msg)) => Error::Parse(msg),
        Soap(err @ (SoapError::Transport(_) | SoapError::Status { .. })) => {
            Error::Transport(err.to_string())
        }
        Credential(msg) => Error::Credential(msg),
        ZoneNotFound(msg) => Error::ZoneNotFound(msg),
        InvalidInput(msg) => Error::InvalidInput(msg),
        InvalidData(msg) => Error::Parse(msg),
        Provider(msg) => Error::Provider(msg),
    }
}
