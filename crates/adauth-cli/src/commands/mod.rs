//! CLI command implementations

pub mod authenticate;
pub mod check;

use adauth_core::AdAuthConfig;

/// Context passed to all commands
pub struct CommandContext {
    pub config: AdAuthConfig,
}
