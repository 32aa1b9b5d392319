use anyhow::Result;
use clap::{Parser, Subcommand};

/// portfolio - personal portfolio site with a contact form
#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Personal portfolio website and contact delivery", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Log in to the mail relay with the configured credentials
    SmtpCheck,
    /// List contact submissions waiting in the fallback store
    Pending,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = portfolio::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    portfolio::observability::init_observability(&config.logging)?;

    match cli.command {
        Commands::Serve { host, port } => portfolio::cli::server::serve(config, host, port).await,
        Commands::SmtpCheck => portfolio::cli::smtp::check(config).await,
        Commands::Pending => portfolio::cli::pending::list(config).await,
    }
}
