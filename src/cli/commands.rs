//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::models::TranslationRequest;
use crate::core::orchestrator::JsonTranslator;

/// Commands for the JSON translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a JSON file
    Translate {
        /// Input JSON file (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Target language, a code such as "es" or a name such as "Spanish"
        #[arg(short, long)]
        target_lang: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP API server
    Serve {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Read a source file and make sure it is JSON before anything is sent out
pub fn read_source(file: &Path) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;

    serde_json::from_str::<serde_json::Value>(&content)
        .map_err(|e| anyhow::anyhow!("Invalid JSON file {}: {}", file.display(), e))?;

    Ok(content)
}

/// Handle JSON file translation command
pub async fn handle_translate(
    translator: JsonTranslator,
    file: PathBuf,
    target_lang: String,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Input: {}", file.display());
    info!("Target language: {}", target_lang);

    let source = read_source(&file)?;
    let request = TranslationRequest::new(target_lang, source);

    let translated = tokio::select! {
        result = translator.translate(&request) => result?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted"),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", translated))?;
            info!("Output: {}", path.display());
            eprintln!("✅ Translation written to {}", path.display());
        }
        None => println!("{}", translated),
    }

    Ok(())
}

/// Handle server command
pub async fn handle_serve(translator: JsonTranslator, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    info!("Starting HTTP server on {}:{} (model {})", host, port, translator.model());
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port, translator).await?;

    Ok(())
}
