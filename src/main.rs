use anyhow::Result;
use clap::{Parser, Subcommand};
use levelup::{cli, config, server};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "levelup", version, about = "Gamified personal progress tracker over REST and MCP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API with MCP (Streamable HTTP) at /mcp
    Serve,
    /// Start the MCP server (stdio transport)
    Mcp,
    /// Print XP, level, open tasks and goals
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also show this many recent activity-log entries
        #[arg(long, default_value_t = 0)]
        activity: usize,
    },
    /// Check database health and model reachability
    Doctor,
    /// Delete all progress (asks for confirmation)
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::LevelupConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve_http(config).await?,
        Command::Mcp => server::serve_stdio(config).await?,
        Command::Status { json, activity } => cli::status::status(&config, json, activity)?,
        Command::Doctor => cli::doctor::doctor(&config).await?,
        Command::Reset => cli::reset::reset(&config)?,
    }

    Ok(())
}
