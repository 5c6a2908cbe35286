//! `unipile-mcp` - MCP server for the Unipile API.
//!
//! Speaks JSON-RPC over stdin/stdout, so stdout is reserved for protocol
//! messages and every log line goes to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use unipile_mcp::clients::config::{
    ENV_API_KEY, ENV_BASE_URL, ENV_MAX_ATTEMPTS, ENV_PORT, ENV_SUBDOMAIN, ENV_TIMEOUT_SECS,
};
use unipile_mcp::clients::{UnipileClient, UnipileConfig};
use unipile_mcp::health::{HealthCheckConfig, HealthChecker};
use unipile_mcp::transport::LineTransport;
use unipile_mcp::McpServer;

const DEFAULT_LOG_FILTER: &str = "unipile_mcp=info";

/// MCP server exposing Unipile chats, accounts and LinkedIn as tools.
#[derive(Parser)]
#[command(
    name = "unipile-mcp",
    version,
    about = "MCP server for the Unipile API",
    long_about = "Model Context Protocol server exposing the Unipile REST API \
                  (chats, messages, accounts, LinkedIn posts, profiles and search) as tools.\n\
                  Connection settings are read from flags or UNIPILE_* environment variables."
)]
struct Cli {
    /// Log filter, e.g. `debug` or `unipile_mcp=trace` (overrides RUST_LOG).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Unipile API key.
    #[arg(long, global = true, env = ENV_API_KEY, hide_env_values = true)]
    api_key: Option<String>,

    /// Full Unipile base URL, e.g. https://api8.unipile.com:13851.
    #[arg(long, global = true, env = ENV_BASE_URL)]
    base_url: Option<String>,

    /// DSN subdomain, used when no base URL is given (e.g. api8).
    #[arg(long, global = true, env = ENV_SUBDOMAIN)]
    subdomain: Option<String>,

    /// DSN port, used when no base URL is given (e.g. 13851).
    #[arg(long, global = true, env = ENV_PORT)]
    port: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = ENV_TIMEOUT_SECS)]
    timeout_secs: Option<u64>,

    /// Total attempts for read requests; 1 disables retries.
    #[arg(long, global = true, env = ENV_MAX_ATTEMPTS)]
    max_attempts: Option<u32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdin/stdout (default).
    Serve,
    /// Print the tool definitions as JSON and exit.
    Tools,
    /// Probe the Unipile API and print a health report.
    Health {
        /// Probe timeout in seconds.
        #[arg(long, default_value = "5")]
        probe_timeout: u64,
    },
}

impl Cli {
    /// Resolve connection settings; flags win over the environment.
    fn unipile_config(&self) -> Result<UnipileConfig> {
        let config = UnipileConfig::from_lookup(|key| match key {
            ENV_API_KEY => self.api_key.clone(),
            ENV_BASE_URL => self.base_url.clone(),
            ENV_SUBDOMAIN => self.subdomain.clone(),
            ENV_PORT => self.port.clone(),
            ENV_TIMEOUT_SECS => self.timeout_secs.map(|v| v.to_string()),
            ENV_MAX_ATTEMPTS => self.max_attempts.map(|v| v.to_string()),
            _ => None,
        })?;
        Ok(config)
    }
}

fn init_logging(level: Option<&str>, format: LogFormat) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(false)
                    .compact(),
            )
            .init(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.log_format)?;

    let config = cli
        .unipile_config()
        .context("Unipile connection is not configured")?;
    let client = Arc::new(UnipileClient::new(&config).context("failed to build Unipile client")?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                base_url = client.base_url(),
                "Unipile MCP server starting"
            );
            let server = McpServer::unipile(client).await;
            info!("Registered {} tools", server.list_tools().await.len());

            LineTransport::stdio()
                .serve(&server)
                .await
                .context("stdio transport failed")?;
        }
        Commands::Tools => {
            let server = McpServer::unipile(client).await;
            let tools = server.list_tools().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "tools": tools }))?
            );
        }
        Commands::Health { probe_timeout } => {
            let checker = HealthChecker::new(
                client,
                HealthCheckConfig {
                    check_timeout: Duration::from_secs(probe_timeout),
                    ..Default::default()
                },
            );
            let report = checker.check_all().await;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !report.is_ok() {
                bail!("{}", report.message);
            }
        }
    }

    Ok(())
}
