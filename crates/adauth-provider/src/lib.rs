//! Active Directory / LDAP authentication provider
//!
//! Validates a username/password pair against a directory server and answers with a
//! tri-state [`AuthOutcome`]:
//! - `Authenticated`, with the identifier the host should register the user under
//! - `RejectContinue`, the host may try its next provider
//! - `RejectStop`, the host must stop
//!
//! Options are string templates rendered against the attempt's parameters, see
//! [`resolver`].

pub mod directory;
pub mod engine;
pub mod metrics;
pub mod params;
pub mod provider;
pub mod resolver;

pub use directory::{
    default_connector, DirectoryConnection, DirectoryConnector, DirectoryEntry, DirectoryError,
    DirectoryResult,
};
#[cfg(feature = "ldap")]
pub use directory::LdapConnector;
pub use engine::{ActiveDirectoryProvider, ProviderSettings};
pub use params::Params;
pub use provider::AuthProvider;
pub use resolver::{render, resolve, TemplateError};

pub use adauth_core::types::{AuthDecision, AuthOutcome, FailureMode, ProviderOptions, User};
