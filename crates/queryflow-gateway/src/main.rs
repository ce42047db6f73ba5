//! Queryflow — text-to-SQL workflow orchestrator

use clap::{Parser, Subcommand};
use queryflow_core::AppConfig;
use queryflow_gateway::{build_state, start_server};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "queryflow", about = "Queryflow — declarative multi-agent workflow orchestrator")]
struct Cli {
    /// Settings file
    #[arg(short, long, default_value = "config/settings.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port override (default: app.port from settings)
        #[arg(short, long)]
        port: Option<u16>,
        /// Plan file override (default: orchestration.plan_file from settings)
        #[arg(long)]
        plans: Option<PathBuf>,
    },
    /// Run one plan to completion and print the results as JSON
    Run {
        /// Plan name (default: orchestration.default_plan from settings)
        #[arg(long)]
        plan: Option<String>,
        /// Initial inputs as a JSON object
        #[arg(long, default_value = "{}")]
        input: String,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "queryflow=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, plans } => {
            let mut config = AppConfig::load_env(&cli.config)?;
            if let Some(plans) = plans {
                config.orchestration.plan_file = plans.display().to_string();
            }
            let port = port.unwrap_or(config.app.port);
            start_server(config, port).await?;
        }

        Commands::Run { plan, input } => {
            let config = AppConfig::load_env(&cli.config)?;
            let plan = plan.unwrap_or_else(|| config.orchestration.default_plan.clone());
            let inputs: Map<String, Value> = serde_json::from_str(&input)
                .map_err(|e| anyhow::anyhow!("--input must be a JSON object: {}", e))?;

            let state = build_state(config).await?;
            let output = state.controller.run(&plan, inputs).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Version => {
            println!("queryflow v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
