//! DevQuest Edge - same-origin relay for the portfolio API

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use devquest_edge::config::{BackendOrigin, Config, EdgeConfig};
use devquest_edge::error::Result;
use devquest_edge::proxy::{DEFAULT_ALLOW_LIST, EdgeServer, HeaderPolicy, TargetResolver};

/// DevQuest Edge - relays /api/* to the portfolio backend
#[derive(Parser)]
#[command(name = "devquest-edge")]
#[command(about = "Same-origin edge relay between the DevQuest SPA and its backend API")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(long, global = true)]
    pub listen: Option<String>,

    /// Backend origin (overrides both the config file and the environment)
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Forward only accept, content-type and authorization request headers
    #[arg(long, global = true)]
    pub restrict_headers: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the relay server (default command)
    #[command(name = "serve")]
    Serve,

    /// Print the resolved configuration and sample target URLs, then exit
    #[command(name = "check")]
    Check,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let (config, origin) = resolve(&cli)?;

    match cli.command {
        None | Some(Command::Serve) => serve(config, origin).await,
        Some(Command::Check) => check(&config, origin),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,devquest_edge=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn resolve(cli: &Cli) -> Result<(EdgeConfig, BackendOrigin)> {
    let mut config = Config::load(cli.config.as_deref())?.edge;

    if let Some(ref listen) = cli.listen {
        config.listen_addr = listen.clone();
    }
    if cli.restrict_headers {
        config.header_allow_list = Some(DEFAULT_ALLOW_LIST.iter().map(|s| s.to_string()).collect());
    }

    let origin = match cli.origin {
        Some(ref origin) => BackendOrigin::parse(origin)?,
        None => config.resolve_origin()?,
    };

    tracing::debug!("Config loaded: {:?}", config);
    Ok((config, origin))
}

async fn serve(config: EdgeConfig, origin: BackendOrigin) -> Result<()> {
    tracing::info!("Starting DevQuest edge relay");

    let server = EdgeServer::new(config, origin);
    server.serve().await?;

    tracing::info!("DevQuest edge relay stopped");
    Ok(())
}

fn check(config: &EdgeConfig, origin: BackendOrigin) -> Result<()> {
    config.validate()?;
    let policy = HeaderPolicy::from_config(config)?;
    let resolver = TargetResolver::from_config(origin, config);

    println!("listen addr     : {}", config.listen_addr);
    println!("backend origin  : {}", resolver.origin());
    println!("origin override : ${}", config.origin_env);
    println!("request headers : {}", policy.describe());
    match config.timeout_secs {
        Some(secs) => println!("upstream timeout: {secs}s"),
        None => println!("upstream timeout: none"),
    }

    let sample_path = format!("{}/github/repos", config.route_prefix.trim_end_matches('/'));
    if let Ok(target) = resolver.resolve_path(&sample_path, Some("x=1")) {
        println!("{sample_path}?x=1 -> {}", target.url);
    }
    if let Ok(target) = resolver.resolve_query(Some("path=github/repos&x=1")) {
        println!("{}?path=github/repos&x=1 -> {}", config.query_route, target.url);
    }

    Ok(())
}
