//! Active Directory authentication engine
//!
//! One attempt runs up to two independent directory connections:
//!
//! 1. **Search** (only when `search-fields` is configured): bind as the search identity
//!    (`search-user` or anonymous), look the user up and copy the requested attributes
//!    and the entry's `dn` into the parameter set.
//! 2. **Bind**: connect again and bind with the rendered `bind-user`/`bind-password`.
//!    Success means the directory accepted the end user's credentials.
//!
//! Failures in either phase never reach the caller as errors; they become the
//! failure-mode outcome derived from `continue-on-failure`.

use crate::directory::{default_connector, DirectoryConnection, DirectoryConnector};
use crate::metrics::{self, Phase};
use crate::params::Params;
use crate::provider::AuthProvider;
use crate::resolver::{render, resolve};
use adauth_core::config::EngineConfig;
use adauth_core::types::{keys, AuthDecision, FailureMode, ProviderOptions, User};
use adauth_core::{AdAuthConfig, Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Timeouts applied by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Budget for the whole attempt, search and bind together
    pub timeout: Duration,
    /// Wait for the search result
    pub search_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for ProviderSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timeout: config.timeout(),
            search_timeout: config.search_timeout(),
        }
    }
}

/// Authenticates users against an Active Directory / LDAP server
pub struct ActiveDirectoryProvider {
    connector: Option<Arc<dyn DirectoryConnector>>,
    settings: ProviderSettings,
}

impl ActiveDirectoryProvider {
    pub const PLUGIN_TYPE: &'static str = "activedirectory";

    /// Provider using the built-in directory client, if this build has one
    pub fn new(config: &AdAuthConfig) -> Self {
        Self {
            connector: default_connector(&config.ldap),
            settings: ProviderSettings::from(&config.engine),
        }
    }

    pub fn with_connector(
        connector: Arc<dyn DirectoryConnector>,
        settings: ProviderSettings,
    ) -> Self {
        Self {
            connector: Some(connector),
            settings,
        }
    }

    /// Provider without a directory client; every attempt is rejected
    pub fn unavailable(settings: ProviderSettings) -> Self {
        Self {
            connector: None,
            settings,
        }
    }

    pub fn is_available(&self) -> bool {
        self.connector.is_some()
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Authenticate `username`/`password`.
    ///
    /// Returns `Err` only for configuration defects: a referenced option missing
    /// (checked before any connection is made) or a broken
    /// `auto-register-username` template.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        options: &ProviderOptions,
    ) -> Result<AuthDecision> {
        debug!("Username: {}", username);
        debug!("Options: {:?}", options.redacted());

        let started = Instant::now();
        let failure = FailureMode::from_options(options);
        options.validate()?;

        let decision = match &self.connector {
            None => {
                warn!("Rejecting user {}: {}", username, Error::DirectoryUnavailable);
                metrics::record_phase_failure(Phase::Unavailable);
                failure.decision()
            }
            Some(connector) => {
                let attempt = self.attempt(connector.as_ref(), username, password, options, failure);
                match tokio::time::timeout(self.settings.timeout, attempt).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(
                            "Active Directory authentication for user {} timed out after {:?}",
                            username, self.settings.timeout
                        );
                        metrics::record_phase_failure(Phase::Timeout);
                        failure.decision()
                    }
                }
            }
        };

        metrics::record_attempt(decision.outcome, started.elapsed().as_secs_f64());
        Ok(decision)
    }

    /// Authenticate a user record by its email, discarding the auto-register name
    pub async fn authenticate_user(
        &self,
        user: &User,
        password: &str,
        options: &ProviderOptions,
    ) -> Result<bool> {
        let decision = self.authenticate(&user.email, password, options).await?;
        Ok(decision.is_authenticated())
    }

    async fn attempt(
        &self,
        connector: &dyn DirectoryConnector,
        username: &str,
        password: &str,
        options: &ProviderOptions,
        failure: FailureMode,
    ) -> Result<AuthDecision> {
        let mut params = Params::new(username, password);

        if options.contains(keys::SEARCH_FIELDS) {
            params = match self.search(connector, options, params).await {
                Ok(params) => params,
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    error!("Active Directory search failed for user {}: {}", username, e);
                    metrics::record_phase_failure(Phase::Search);
                    return Ok(failure.decision());
                }
            };
        }

        match self.bind(connector, options, &params).await {
            Ok(()) => {}
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                error!("Active Directory bind failed for user {}: {}", username, e);
                metrics::record_phase_failure(Phase::Bind);
                return Ok(failure.decision());
            }
        }

        let auto_register = resolve(options, keys::AUTO_REGISTER_USERNAME, &params)?;
        debug!("User: {}, authenticated: true", username);

        Ok(AuthDecision::authenticated(auto_register))
    }

    /// Search phase: returns the parameter set enriched with `dn` and the requested
    /// attributes.
    async fn search(
        &self,
        connector: &dyn DirectoryConnector,
        options: &ProviderOptions,
        mut params: Params,
    ) -> Result<Params> {
        let server = resolve(options, keys::SERVER, &params)?;

        let mut conn = connector
            .connect(&server)
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        conn.set_chase_referrals(false);

        let result = self.search_with(conn.as_mut(), options, &mut params).await;

        if let Err(e) = conn.unbind().await {
            debug!("Failed to unbind search connection: {}", e);
        }

        result.map(|()| params)
    }

    async fn search_with(
        &self,
        conn: &mut dyn DirectoryConnection,
        options: &ProviderOptions,
        params: &mut Params,
    ) -> Result<()> {
        let bound = if options.contains(keys::SEARCH_USER) {
            let search_user = resolve(options, keys::SEARCH_USER, params)?;
            let search_password = resolve(options, keys::SEARCH_PASSWORD, params)?;
            conn.simple_bind(&search_user, &search_password).await
        } else {
            conn.simple_bind("", "").await
        };
        bound.map_err(|e| Error::Search(format!("search identity bind: {}", e)))?;

        let base = resolve(options, keys::SEARCH_BASE, params)?;
        let filter = resolve(options, keys::SEARCH_FILTER, params)?;
        let attributes = search_attributes(options, params)?;

        let entries = conn
            .search(&base, &filter, &attributes, self.settings.search_timeout)
            .await
            .map_err(|e| Error::Search(e.to_string()))?;

        // Only the first entry counts. With no match the bind phase still runs with
        // the parameters gathered so far.
        let entry = match entries.into_iter().next() {
            Some(entry) => entry,
            None => {
                warn!("Search in '{}' with filter '{}' returned no entries", base, filter);
                return Ok(());
            }
        };

        debug!("Search matched dn: {}", entry.dn);
        debug!("Search attributes: {:?}", entry.attributes);

        for attr in &attributes {
            let value = entry.first_value(attr).unwrap_or_default().to_string();
            params.set(attr.clone(), value);
        }
        params.set(Params::DN, entry.dn);

        Ok(())
    }

    /// Bind phase: validate the end user's credentials on a fresh connection
    async fn bind(
        &self,
        connector: &dyn DirectoryConnector,
        options: &ProviderOptions,
        params: &Params,
    ) -> Result<()> {
        let server = resolve(options, keys::SERVER, params)?;
        let bind_user = resolve(options, keys::BIND_USER, params)?;
        let bind_password = resolve(options, keys::BIND_PASSWORD, params)?;

        // Servers treat an empty DN or password as an anonymous/unauthenticated bind
        // and report success without checking anything.
        if bind_user.is_empty() || bind_password.is_empty() {
            return Err(Error::Bind(
                "refusing unauthenticated bind with empty DN or password".to_string(),
            ));
        }

        let mut conn = connector
            .connect(&server)
            .await
            .map_err(|e| Error::Bind(e.to_string()))?;
        conn.set_chase_referrals(false);

        let result = conn
            .simple_bind(&bind_user, &bind_password)
            .await
            .map_err(|e| Error::Bind(e.to_string()));

        if let Err(e) = conn.unbind().await {
            debug!("Failed to unbind user connection: {}", e);
        }

        result
    }
}

/// Attribute list from `search-fields`: comma separated, trimmed, each rendered
fn search_attributes(options: &ProviderOptions, params: &Params) -> Result<Vec<String>> {
    options
        .require(keys::SEARCH_FIELDS)?
        .split(',')
        .map(|field| render(field.trim(), params).map_err(|e| e.for_option(keys::SEARCH_FIELDS)))
        .collect()
}

#[async_trait]
impl AuthProvider for ActiveDirectoryProvider {
    fn plugin_type(&self) -> &'static str {
        Self::PLUGIN_TYPE
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        options: &ProviderOptions,
    ) -> Result<AuthDecision> {
        ActiveDirectoryProvider::authenticate(self, username, password, options).await
    }
}
