mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use visual_ideation::logger::{self, LogLevel, LoggerConfig};
use visual_ideation::{AppConfig, CredentialGate, CredentialProvider, CredentialStoreConfig, GeminiClient};

#[derive(Parser)]
#[command(name = "ideation")]
#[command(about = "Generate, refine and animate images with Gemini, or research ideas with grounded search")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Where downloaded images and videos are written
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Keep the API key in memory only, for this run
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the API key
    Login {
        /// Key to store; prompted for when omitted
        #[arg(long)]
        key: Option<String>,
    },

    /// Remove the stored API key
    Logout,

    /// Interactive generate -> edit -> video workflow
    Ideate,

    /// Ask a question answered with Google Search grounding
    Research {
        /// Question to ask; starts an interactive session when omitted
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut log_config = LoggerConfig::from_env();
    if cli.verbose {
        log_config = log_config.with_level(LogLevel::Debug);
    }
    logger::init_with_config(log_config)?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.output_dir {
        config = config.with_output_dir(dir);
    }
    if cli.ephemeral {
        config = config.with_credentials(CredentialStoreConfig::memory());
    }
    logger::log_config_info(&config);

    let gate = CredentialGate::new(CredentialProvider::from_config(&config.credentials));

    match cli.command {
        Commands::Login { key } => cli::keys::login(&gate, key).await?,
        Commands::Logout => {
            gate.dismiss().await?;
            println!("API key removed.");
        }
        Commands::Ideate => {
            let client = Arc::new(GeminiClient::new(&config.gemini)?);
            cli::ideate::run(client, gate, config.output_dir()).await?;
        }
        Commands::Research { query } => {
            let client = Arc::new(GeminiClient::new(&config.gemini)?);
            cli::research::run(client, gate, query).await?;
        }
    }

    Ok(())
}
