//! Configuration for adauth
//!
//! Example:
//! ```toml
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [engine]
//! timeout_seconds = 120
//! search_timeout_seconds = 60
//!
//! [ldap]
//! connect_timeout_seconds = 10
//! start_tls = false
//!
//! [options]
//! server = "ldap://dc.example.com"
//! search-fields = "sAMAccountName, mail"
//! search-base = "dc=example,dc=com"
//! search-filter = "(mail={username})"
//! bind-user = "{dn}"
//! bind-password = "{password}"
//! auto-register-username = "{sAMAccountName}"
//! ```

use crate::types::ProviderOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdAuthConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub ldap: LdapConfig,

    /// Active Directory provider options (templates)
    #[serde(default)]
    pub options: ProviderOptions,
}

impl AdAuthConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to read config: {}", e)))?;

        let config = Self::from_toml(&content)?;
        debug!("Loaded configuration from {}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override settings from `ADAUTH_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(level) = var("ADAUTH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("ADAUTH_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(secs) = var("ADAUTH_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.engine.timeout_seconds = secs;
        }
        if let Some(secs) = var("ADAUTH_SEARCH_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.engine.search_timeout_seconds = secs;
        }
        if let Some(server) = var("ADAUTH_SERVER") {
            self.options.insert("server", server);
        }
        if var("ADAUTH_START_TLS").map(|v| v == "true").unwrap_or(false) {
            self.ldap.start_tls = true;
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.logging.validate()?;
        self.engine.validate()?;
        self.ldap.validate()?;
        self.options.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> crate::Result<()> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(crate::Error::InvalidConfig(format!(
                "Unknown log format '{}' (expected pretty or json)",
                other
            ))),
        }
    }
}

/// Authentication engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Budget for a whole attempt (search and bind)
    #[serde(default = "default_attempt_timeout")]
    pub timeout_seconds: u64,

    /// Wait for the search result
    #[serde(default = "default_search_timeout")]
    pub search_timeout_seconds: u64,
}

fn default_attempt_timeout() -> u64 {
    crate::DEFAULT_ATTEMPT_TIMEOUT_SECS
}

fn default_search_timeout() -> u64 {
    crate::DEFAULT_SEARCH_TIMEOUT_SECS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_attempt_timeout(),
            search_timeout_seconds: default_search_timeout(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_seconds)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.timeout_seconds == 0 {
            return Err(crate::Error::InvalidConfig(
                "engine.timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.search_timeout_seconds == 0 {
            return Err(crate::Error::InvalidConfig(
                "engine.search_timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Directory connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Use STARTTLS for connection upgrade
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub skip_tls_verify: bool,
}

fn default_connect_timeout() -> u64 {
    crate::DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout(),
            start_tls: false,
            skip_tls_verify: false,
        }
    }
}

impl LdapConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.connect_timeout_seconds == 0 {
            return Err(crate::Error::InvalidConfig(
                "ldap.connect_timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
