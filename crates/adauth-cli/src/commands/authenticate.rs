//! authenticate command - run one authentication attempt

use super::CommandContext;
use adauth_provider::{ActiveDirectoryProvider, AuthDecision, AuthOutcome};
use anyhow::{Context, Result};
use std::io::BufRead;
use tracing::info;

pub async fn execute(
    ctx: &CommandContext,
    username: &str,
    password: Option<String>,
    json: bool,
) -> Result<AuthOutcome> {
    ctx.config.validate().context("Configuration is invalid")?;

    let password = match password {
        Some(password) => password,
        None => read_password(std::io::stdin().lock())?,
    };

    let provider = ActiveDirectoryProvider::new(&ctx.config);
    if !provider.is_available() {
        info!("Built without a directory client, every attempt will be rejected");
    }

    let decision = provider
        .authenticate(username, &password, &ctx.config.options)
        .await
        .context("Active Directory options are invalid")?;

    println!("{}", render(&decision, json)?);
    Ok(decision.outcome)
}

/// Process exit status for an outcome
pub fn exit_code(outcome: AuthOutcome) -> i32 {
    match outcome {
        AuthOutcome::Authenticated => 0,
        AuthOutcome::RejectContinue => 1,
        AuthOutcome::RejectStop => 2,
    }
}

fn render(decision: &AuthDecision, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(decision)?);
    }

    let mut out = format!("outcome: {}", decision.outcome);
    if let Some(name) = &decision.auto_register_username {
        out.push_str(&format!("\nauto-register username: {}", name));
    }
    Ok(out)
}

/// First line of `input`, without the line terminator
fn read_password(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: &str) -> CommandContext {
        CommandContext {
            config: adauth_core::AdAuthConfig::from_toml(config).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_zero_timeout_is_rejected_before_authenticating() {
        let ctx = context(
            r#"
            [engine]
            timeout_seconds = 0

            [options]
            server = "ldap://127.0.0.1:1"
            bind-user = "{username}"
            bind-password = "{password}"
            auto-register-username = "{username}"
            "#,
        );

        let err = execute(&ctx, "alice", Some("secret".to_string()), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Configuration is invalid"));
    }

    #[tokio::test]
    async fn test_zero_search_timeout_is_rejected() {
        let mut ctx = context("");
        ctx.config.engine.search_timeout_seconds = 0;

        assert!(execute(&ctx, "alice", Some("secret".to_string()), true)
            .await
            .is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(AuthOutcome::Authenticated), 0);
        assert_eq!(exit_code(AuthOutcome::RejectContinue), 1);
        assert_eq!(exit_code(AuthOutcome::RejectStop), 2);
    }

    #[test]
    fn test_read_password_strips_newline_only() {
        let password = read_password(" pass word \r\nignored\n".as_bytes()).unwrap();
        assert_eq!(password, " pass word ");
    }

    #[test]
    fn test_render_text() {
        let decision = AuthDecision::authenticated("alice@corp");
        assert_eq!(
            render(&decision, false).unwrap(),
            "outcome: authenticated\nauto-register username: alice@corp"
        );
    }

    #[test]
    fn test_render_json() {
        let decision = AuthDecision {
            outcome: AuthOutcome::RejectStop,
            auto_register_username: None,
        };
        let value: serde_json::Value = serde_json::from_str(&render(&decision, true).unwrap()).unwrap();
        assert_eq!(value["outcome"], "reject_stop");
        assert!(value["auto_register_username"].is_null());
    }
}
