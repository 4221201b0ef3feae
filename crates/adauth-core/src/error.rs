//! Error types for adauth

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("Missing '{0}' parameter in Active Directory options")]
    MissingOption(String),

    #[error("Unknown placeholder '{{{placeholder}}}' in option '{option}'")]
    UnknownPlaceholder { option: String, placeholder: String },

    #[error("Malformed template in option '{option}': {reason}")]
    MalformedTemplate { option: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Directory Errors
    #[error("Directory client is not available")]
    DirectoryUnavailable,

    #[error("Directory search failed: {0}")]
    Search(String),

    #[error("Directory bind failed: {0}")]
    Bind(String),
}

impl Error {
    /// Setup defects that must reach the caller instead of being folded into a
    /// rejected login.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingOption(_) | Error::InvalidConfig(_))
    }
}
