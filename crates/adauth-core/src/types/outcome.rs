//! Authentication outcome types

use super::options::{keys, ProviderOptions, FLAG_FALSE};
use serde::{Deserialize, Serialize};

/// Tri-state result of an authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    /// The directory accepted the credentials
    Authenticated,
    /// Rejected; the host may try its next provider
    RejectContinue,
    /// Rejected; the host must not consult further providers
    RejectStop,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Authenticated => "authenticated",
            AuthOutcome::RejectContinue => "reject_continue",
            AuthOutcome::RejectStop => "reject_stop",
        }
    }
}

impl std::fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How failures are reported, derived from `continue-on-failure`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    RejectContinue,
    #[default]
    RejectStop,
}

impl FailureMode {
    /// `RejectStop` unless `continue-on-failure` is set to anything but `"False"`
    pub fn from_options(options: &ProviderOptions) -> Self {
        match options.get(keys::CONTINUE_ON_FAILURE) {
            Some(value) if value != FLAG_FALSE => FailureMode::RejectContinue,
            _ => FailureMode::RejectStop,
        }
    }

    pub fn outcome(&self) -> AuthOutcome {
        match self {
            FailureMode::RejectContinue => AuthOutcome::RejectContinue,
            FailureMode::RejectStop => AuthOutcome::RejectStop,
        }
    }

    /// The decision returned for any failed attempt
    pub fn decision(&self) -> AuthDecision {
        AuthDecision {
            outcome: self.outcome(),
            auto_register_username: None,
        }
    }
}

/// Final answer of a provider for one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDecision {
    pub outcome: AuthOutcome,

    /// Identifier the host may use to create or link an account.
    /// Only set when `outcome` is `Authenticated`.
    pub auto_register_username: Option<String>,
}

impl AuthDecision {
    pub fn authenticated(auto_register_username: impl Into<String>) -> Self {
        Self {
            outcome: AuthOutcome::Authenticated,
            auto_register_username: Some(auto_register_username.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.outcome.is_authenticated()
    }
}
