//! persona-sim console binary.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` - required; the program explains how to set it and exits
//! - `PERSONA_SIM_MODEL` - model id (default: `gpt-4o`)
//! - `OPENAI_BASE_URL` - any OpenAI-compatible endpoint
//! - `PERSONA_SIM_CATALOG_DIR` - extra persona YAML files to load
//! - `PERSONA_SIM_COLOR` - `0` disables colors
//! - `RUST_LOG` - tracing filter (default: "warn"); logs go to stderr
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin persona-sim
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use persona_sim::config::{self, Settings};
use persona_sim::{BaseLLM, ConsoleSession, LlmAgentFactory, PersonaCatalog, Scenarios};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();

    // Logs share the terminal with the conversation, so keep them on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env();
    if settings.require_api_key().is_err() {
        eprintln!("{}", config::missing_key_help());
        return Ok(());
    }

    let mut catalog = PersonaCatalog::with_defaults().context("built-in persona catalog")?;
    if let Some(dir) = &settings.catalog_dir {
        let added = catalog
            .load_directory(dir)
            .with_context(|| format!("loading personas from {}", dir.display()))?;
        tracing::info!("Loaded {} personas from {}", added, dir.display());
    }
    let scenarios = Scenarios::builtin().context("built-in scenarios")?;

    let llm = settings.llm().build()?;
    tracing::info!(
        "persona-sim v{} using model {}",
        persona_sim::VERSION,
        llm.model()
    );

    let mut session = ConsoleSession::new(
        Arc::new(catalog),
        scenarios,
        Arc::new(LlmAgentFactory::new(llm)),
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    )
    .color(settings.color);
    session.run().await?;

    Ok(())
}
