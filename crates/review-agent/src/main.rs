//! review-agent - run organization risk reviews from the command line
//!
//! - `review` runs a full review against a JSON fixture and prints the
//!   persisted envelope
//! - `thresholds` prints the payment risk threshold block
//! - `migrate` upgrades a stored envelope to the latest version

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use review_agent::{
    build_agent_report, parse_agent_report, render_thresholds, InMemoryRepository,
    ReviewAgent, ReviewAgentConfig, ReviewFixture,
};
use review_types::ReviewContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Organization review agent CLI
#[derive(Parser)]
#[command(name = "review-agent")]
#[command(about = "Automated risk review of merchant organizations", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "REVIEW_AGENT_CONFIG")]
    config: Option<String>,

    /// Log level, overrides the configured one
    #[arg(long, env = "REVIEW_AGENT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "REVIEW_AGENT_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review the organization described by a fixture file
    Review {
        /// Fixture JSON: organization, admin user, products, account, payments
        #[arg(short, long)]
        input: String,

        /// SUBMISSION, SETUP_COMPLETE, THRESHOLD or MANUAL
        #[arg(long, default_value = "submission")]
        context: ReviewContext,

        /// Tag stored on the envelope; defaults to the context
        #[arg(long)]
        review_type: Option<String>,
    },

    /// Print the payment risk thresholds
    Thresholds,

    /// Upgrade a stored report envelope to the latest version
    Migrate {
        /// Stored envelope JSON
        #[arg(short, long)]
        input: String,
    },
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn review(
    config: ReviewAgentConfig,
    input: &str,
    context: ReviewContext,
    review_type: Option<String>,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading fixture {}", input))?;
    let mut fixture: ReviewFixture =
        serde_json::from_str(&raw).with_context(|| format!("parsing fixture {}", input))?;

    let mut agent = ReviewAgent::from_config(config)?;
    if let Some(provider) = fixture.provider.take() {
        agent = agent.with_provider(Arc::new(provider));
    }

    let repository = InMemoryRepository::new();
    let organization = repository.insert_fixture(fixture).await;

    let result = agent
        .run_organization_review(&repository, &organization, context)
        .await?;

    let review_type = review_type.unwrap_or_else(|| context.as_str().to_ascii_lowercase());
    let envelope = build_agent_report(&result, &review_type);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

async fn migrate(input: &str) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading envelope {}", input))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let envelope = parse_agent_report(&value)?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ReviewAgentConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_tracing(&level, cli.json || config.logging.json);

    match cli.command {
        Command::Review {
            input,
            context,
            review_type,
        } => review(config, &input, context, review_type).await,
        Command::Thresholds => {
            print!("{}", render_thresholds());
            Ok(())
        }
        Command::Migrate { input } => migrate(&input).await,
    }
}
