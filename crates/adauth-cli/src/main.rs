//! adauth - Active Directory / LDAP authentication checks from the command line

mod commands;

use adauth_core::config::{AdAuthConfig, LoggingConfig};
use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::CommandContext;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "adauth")]
#[command(author = "adauth Team")]
#[command(version = adauth_core::VERSION)]
#[command(about = "Active Directory / LDAP authentication decision engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ADAUTH_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ADAUTH_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate a user against the configured directory
    Authenticate {
        /// Username handed to the option templates as {username}
        #[arg(short, long)]
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "ADAUTH_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load and validate the configuration
    CheckConfig,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AdAuthConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path))?;
            config.apply_env();
            config
        }
        None => AdAuthConfig::from_env(),
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);

    let ctx = CommandContext { config };

    match cli.command {
        Commands::Authenticate {
            username,
            password,
            json,
        } => {
            let outcome = commands::authenticate::execute(&ctx, &username, password, json).await?;
            std::process::exit(commands::authenticate::exit_code(outcome));
        }
        Commands::CheckConfig => commands::check::execute(&ctx)?,
        Commands::Version => println!("adauth {}", adauth_core::VERSION),
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output
    if logging.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
