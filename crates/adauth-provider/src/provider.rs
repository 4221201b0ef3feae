//! Authentication provider interface
//!
//! Hosts hold providers as `Arc<dyn AuthProvider>` and decide how a
//! `RejectContinue` from one provider is combined with the next.

use adauth_core::types::{AuthDecision, ProviderOptions, User};
use adauth_core::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Name the provider is registered under in host configuration
    fn plugin_type(&self) -> &'static str;

    /// Check `username`/`password` and return the provider's decision.
    ///
    /// Only configuration errors are returned as `Err`; every directory or credential
    /// failure is expressed through the decision's outcome.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        options: &ProviderOptions,
    ) -> Result<AuthDecision>;

    /// Authenticate an existing user record by its email
    async fn authenticate_user(
        &self,
        user: &User,
        password: &str,
        options: &ProviderOptions,
    ) -> Result<bool> {
        let decision = self.authenticate(&user.email, password, options).await?;
        Ok(decision.is_authenticated())
    }
}
