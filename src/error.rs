use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Ambiguous match: {0}")]
    AmbiguousMatch(String),

    #[error("Record set mismatch: {0}")]
    RecordSetMismatch(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl Error {
    /// Short summary used as the `msg` of a failed run.
    pub fn summary(&self) -> &'static str {
        match self {
            Error::Transport(_) => "Cannot reach the DNS API",
            Error::Fault { .. } | Error::Provider(_) => "Internal error (API level)",
            Error::Authentication(_) | Error::Credential(_) => "Cannot authenticate",
            Error::AmbiguousMatch(_) => "Record selection is ambiguous",
            Error::RecordSetMismatch(_) => {
                "Record already exists with different value. Set 'overwrite' to replace it"
            }
            Error::Parse(_) => "Internal error (SOAP level)",
            Error::ZoneNotFound(_) => "Zone not found",
            Error::InvalidInput(_) => "Invalid parameters",
        }
    }
}
