use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use devquest_cli::client::{API_URL_ENV, ApiClient, DEFAULT_API_URL, api_url_for_edge};
use devquest_cli::commands::{BlogCommand, CvCommand, OracleCommand, ProfileCommand, QuestsCommand};
use devquest_cli::error::CliResult;
use devquest_cli::output::OutputFormat;
use devquest_edge::config::Config;

#[derive(Parser)]
#[command(name = "devquest-cli")]
#[command(about = "DevQuest CLI - your developer career, from the terminal")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(
        long,
        global = true,
        env = API_URL_ENV,
        help = "API base URL (defaults to a local edge relay)"
    )]
    pub api_url: Option<String>,

    #[clap(
        long,
        short = 'c',
        global = true,
        help = "Edge relay config file to derive the API URL from"
    )]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Show the hero profile")]
    Profile(ProfileCommand),

    #[clap(about = "Show the quest log (GitHub repositories)")]
    Quests(QuestsCommand),

    #[clap(about = "Ask the Oracle for career advice")]
    Oracle(OracleCommand),

    #[clap(about = "Upload a CV or show its analysis")]
    Cv(CvCommand),

    #[clap(about = "Tavern board (blog) commands")]
    Blog(BlogCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    init_logging();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let api_url = match (&cli.api_url, &cli.config) {
        (Some(url), _) => url.clone(),
        (None, Some(path)) => api_url_for_edge(&Config::from_file(path)?.edge),
        (None, None) => DEFAULT_API_URL.to_string(),
    };
    tracing::debug!("Using API at {api_url}");

    let client = ApiClient::new(&api_url)?;

    match &cli.command {
        Command::Profile(cmd) => cmd.execute(&client, format).await,
        Command::Quests(cmd) => cmd.execute(&client, format).await,
        Command::Oracle(cmd) => cmd.execute(&client, format).await,
        Command::Cv(cmd) => cmd.execute(&client, format).await,
        Command::Blog(cmd) => cmd.execute(&client, format).await,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
