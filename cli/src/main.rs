use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use client::EnvironmentClient;
use shared_types::{Environment, Metadata};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(
    name = "envctl",
    version,
    about = "Manage environments in the registry"
)]
struct Cli {
    /// Registry base URL
    #[arg(
        long,
        global = true,
        env = "ENVCTL_SERVER",
        default_value = "http://localhost:3000"
    )]
    server: String,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        global = true,
        default_value_t = Output::Human
    )]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the latest version of every environment
    List,
    /// Show one environment
    Get {
        name: String,
        /// Pin to a specific version
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        uid: Option<String>,
    },
    /// Create an environment from a JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Record a new version of an environment from a JSON file
    Update {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete one version, or every version when --uid is omitted
    Delete {
        name: String,
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        uid: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("ENVCTL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_environment(path: &Path) -> Result<Environment> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid environment in {}", path.display()))
}

fn print_metadata(output: Output, meta: &Metadata) -> Result<()> {
    match output {
        Output::Human => println!("{}\t{}", meta.name, meta.uid),
        Output::Json => println!("{}", serde_json::to_string_pretty(meta)?),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let client = EnvironmentClient::new(&cli.server)?;
    debug!("Using registry at {}", cli.server);

    match cli.command {
        Commands::List => {
            let envs = client.list().await?;
            match cli.output {
                Output::Human => {
                    println!("NAME\tUID");
                    for env in &envs {
                        println!("{}\t{}", env.metadata.name, env.metadata.uid);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&envs)?),
            }
        }
        Commands::Get { name, uid } => {
            let env = client.get(&name, uid.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&env)?);
        }
        Commands::Create { file } => {
            let env = read_environment(&file)?;
            let meta = client.create(&env).await?;
            print_metadata(cli.output, &meta)?;
        }
        Commands::Update { file } => {
            let env = read_environment(&file)?;
            let meta = client.update(&env).await?;
            print_metadata(cli.output, &meta)?;
        }
        Commands::Delete { name, uid } => {
            if uid.is_none() {
                warn!("Deleting all versions of {}", name);
            }
            client.delete(&name, uid.as_deref()).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    run(Cli::parse()).await
}
