//! Directory client abstraction
//!
//! The engine talks to the directory through these traits so the wire client can be
//! swapped out (or be absent entirely):
//! - [`DirectoryConnector`] opens connections by address
//! - [`DirectoryConnection`] binds and searches on one connection
//!
//! The `ldap` feature provides [`LdapConnector`], backed by `ldap3`.

#[cfg(feature = "ldap")]
mod ldap;
#[cfg(test)]
pub(crate) mod mock;

#[cfg(feature = "ldap")]
pub use ldap::LdapConnector;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// LDAP result code for invalid credentials
pub const RC_INVALID_CREDENTIALS: u32 = 49;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Failed to connect to directory server: {0}")]
    Connect(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Bind failed with code {rc}: {message}")]
    Bind { rc: u32, message: String },

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Server returned a referral, referral chasing is not supported")]
    ReferralsUnsupported,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// One entry of a search result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Distinguished name
    pub dn: String,

    /// Attribute name -> values, in server order
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// First value of an attribute.
    ///
    /// Attribute names are case-insensitive in LDAP; an exact match wins, otherwise
    /// the first ASCII case-insensitive match is used.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        let values = self.attributes.get(name).or_else(|| {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })?;
        values.first().map(|s| s.as_str())
    }
}

/// Opens connections to a directory server
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Connect to the server at `url` (`ldap://`, `ldaps://`, `ldapi://`)
    async fn connect(&self, url: &str) -> DirectoryResult<Box<dyn DirectoryConnection>>;
}

/// A single open directory connection
#[async_trait]
pub trait DirectoryConnection: Send {
    /// Whether referrals returned by the server may be followed
    fn set_chase_referrals(&mut self, chase: bool);

    /// Simple bind. An empty DN and password is an anonymous bind.
    async fn simple_bind(&mut self, bind_dn: &str, password: &str) -> DirectoryResult<()>;

    /// Subtree search under `base`, returning entries in server order
    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: &[String],
        timeout: Duration,
    ) -> DirectoryResult<Vec<DirectoryEntry>>;

    async fn unbind(&mut self) -> DirectoryResult<()>;
}

/// Connector used when none is given explicitly.
///
/// `None` when the crate is built without a directory client.
pub fn default_connector(config: &adauth_core::config::LdapConfig) -> Option<Arc<dyn DirectoryConnector>> {
    #[cfg(feature = "ldap")]
    {
        Some(Arc::new(LdapConnector::new(config.clone())))
    }

    #[cfg(not(feature = "ldap"))]
    {
        let _ = config;
        None
    }
}
