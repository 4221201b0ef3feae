//! check-config command - validate configuration without contacting the directory

use super::CommandContext;
use anyhow::{Context, Result};

pub fn execute(ctx: &CommandContext) -> Result<()> {
    ctx.config.validate().context("Configuration is invalid")?;

    let config = &ctx.config;
    println!("Configuration OK");
    println!("  log level:        {} ({})", config.logging.level, config.logging.format);
    println!("  attempt timeout:  {:?}", config.engine.timeout());
    println!("  search timeout:   {:?}", config.engine.search_timeout());
    println!("  connect timeout:  {:?}", config.ldap.connect_timeout());
    println!("  starttls:         {}", config.ldap.start_tls);
    println!("  options:          {}", config.options.redacted());

    Ok(())
}
