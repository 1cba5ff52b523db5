//! Main entry point for the JSON i18n translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use json_i18n_translator::cli::commands::{self, Commands};
use json_i18n_translator::{JsonTranslator, TranslatorConfig};

/// JSON i18n Translator - translate JSON language files with Gemini
#[derive(Parser, Debug)]
#[command(name = "json-i18n-translator", version, about, long_about = None)]
struct Args {
    /// API key for Gemini (optional, defaults to GOOGLE_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// JSON configuration file (replaces environment configuration)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generation model (defaults to GEMINI_MODEL or gemini-1.5-flash)
    #[arg(long)]
    model: Option<String>,

    /// Maximum wait for one backend call in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Args {
    /// Build the process-wide configuration once; CLI flags win over env
    fn load_config(&self) -> anyhow::Result<TranslatorConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = TranslatorConfig::from_file(path)?;
                if let Some(api_key) = &self.api_key {
                    config.api_key = api_key.clone();
                }
                config
            }
            None => TranslatorConfig::from_env_with_key(self.api_key.clone())?,
        };

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let mut args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let default_filter = format!(
        "{}={},tower_http={}",
        env!("CARGO_CRATE_NAME"),
        default_level,
        default_level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(command) = args.command.take() else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    let config = args.load_config()?;
    let translator = JsonTranslator::with_gemini(&config)?;

    // Execute command
    match command {
        Commands::Translate {
            file,
            target_lang,
            output,
        } => {
            commands::handle_translate(translator, file, target_lang, output).await?;
        }
        Commands::Serve { host, port } => {
            commands::handle_serve(translator, host, port).await?;
        }
    }

    Ok(())
}
