//! ldap3-backed directory client
//!
//! Supports LDAP, LDAPS (SSL) and STARTTLS connections.

use super::{
    DirectoryConnection, DirectoryConnector, DirectoryEntry, DirectoryError, DirectoryResult,
    RC_INVALID_CREDENTIALS,
};
use adauth_core::config::LdapConfig;
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, ResultEntry, Scope, SearchEntry};
use std::time::Duration;
use tracing::debug;

/// LDAP result code for a referral
const RC_REFERRAL: u32 = 10;

/// Opens ldap3 connections with the configured TLS and timeout settings
#[derive(Debug, Clone)]
pub struct LdapConnector {
    config: LdapConfig,
}

impl LdapConnector {
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    fn settings(&self) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.config.connect_timeout())
            .set_starttls(self.config.start_tls)
            .set_no_tls_verify(self.config.skip_tls_verify)
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    async fn connect(&self, url: &str) -> DirectoryResult<Box<dyn DirectoryConnection>> {
        debug!("Connecting to LDAP server: {}", url);

        let (conn, ldap) = LdapConnAsync::with_settings(self.settings(), url)
            .await
            .map_err(|e| DirectoryError::Connect(e.to_string()))?;

        ldap3::drive!(conn);

        Ok(Box::new(LdapSession {
            ldap,
            chase_referrals: true,
        }))
    }
}

/// One ldap3 connection.
///
/// ldap3 never follows referrals itself. With chasing disabled, search references are
/// dropped from results; with chasing enabled they are reported as an error.
struct LdapSession {
    ldap: Ldap,
    chase_referrals: bool,
}

#[async_trait]
impl DirectoryConnection for LdapSession {
    fn set_chase_referrals(&mut self, chase: bool) {
        self.chase_referrals = chase;
    }

    async fn simple_bind(&mut self, bind_dn: &str, password: &str) -> DirectoryResult<()> {
        let result = self
            .ldap
            .simple_bind(bind_dn, password)
            .await
            .map_err(map_bind_error)?;

        match result.rc {
            0 => Ok(()),
            RC_INVALID_CREDENTIALS => Err(DirectoryError::InvalidCredentials),
            rc => Err(DirectoryError::Bind {
                rc,
                message: result.text,
            }),
        }
    }

    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: &[String],
        timeout: Duration,
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        let attrs: Vec<&str> = attributes.iter().map(String::as_str).collect();

        let (rs, _res) = self
            .ldap
            .with_timeout(timeout)
            .search(base, Scope::Subtree, filter, attrs)
            .await
            .map_err(|e| map_search_error(e, timeout))?
            .success()
            .map_err(|e| map_search_error(e, timeout))?;

        let mut entries = Vec::with_capacity(rs.len());
        for entry in rs {
            if is_reference(&entry) {
                if self.chase_referrals {
                    return Err(DirectoryError::ReferralsUnsupported);
                }
                debug!("Skipping search reference");
                continue;
            }
            entries.push(convert_entry(SearchEntry::construct(entry)));
        }

        Ok(entries)
    }

    async fn unbind(&mut self) -> DirectoryResult<()> {
        self.ldap
            .unbind()
            .await
            .map_err(|e| DirectoryError::Protocol(e.to_string()))
    }
}

fn is_reference(entry: &ResultEntry) -> bool {
    entry.is_ref() || entry.is_intermediate()
}

fn convert_entry(entry: SearchEntry) -> DirectoryEntry {
    let mut attributes = entry.attrs;
    for (name, values) in entry.bin_attrs {
        attributes.entry(name).or_insert_with(|| {
            values
                .iter()
                .map(|v| String::from_utf8_lossy(v).into_owned())
                .collect()
        });
    }

    DirectoryEntry {
        dn: entry.dn,
        attributes,
    }
}

fn map_bind_error(err: LdapError) -> DirectoryError {
    match err {
        LdapError::LdapResult { result } if result.rc == RC_INVALID_CREDENTIALS => {
            DirectoryError::InvalidCredentials
        }
        LdapError::LdapResult { result } => DirectoryError::Bind {
            rc: result.rc,
            message: result.text,
        },
        other => DirectoryError::Protocol(other.to_string()),
    }
}

fn map_search_error(err: LdapError, timeout: Duration) -> DirectoryError {
    match err {
        LdapError::Timeout { .. } => DirectoryError::Timeout(timeout),
        LdapError::LdapResult { result } if result.rc == RC_REFERRAL => {
            DirectoryError::ReferralsUnsupported
        }
        other => DirectoryError::Search(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_convert_entry_merges_binary_attributes() {
        let mut attrs = HashMap::new();
        attrs.insert("mail".to_string(), vec!["alice@corp".to_string()]);
        let mut bin_attrs = HashMap::new();
        bin_attrs.insert("description".to_string(), vec![b"plain bytes".to_vec()]);

        let entry = convert_entry(SearchEntry {
            dn: "cn=alice,dc=corp".to_string(),
            attrs,
            bin_attrs,
        });

        assert_eq!(entry.dn, "cn=alice,dc=corp");
        assert_eq!(entry.first_value("mail"), Some("alice@corp"));
        assert_eq!(entry.first_value("description"), Some("plain bytes"));
    }

    #[tokio::test]
    async fn test_connect_refused_maps_to_connect_error() {
        let connector = LdapConnector::new(LdapConfig {
            connect_timeout_seconds: 1,
            ..Default::default()
        });

        // Port 1 on loopback is not expected to run a directory server
        match connector.connect("ldap://127.0.0.1:1").await {
            Err(DirectoryError::Connect(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connection unexpectedly succeeded"),
        }
    }
}
