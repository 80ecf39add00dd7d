use clap::{Args, Subcommand};
use localagent_client::SystemService;
use localagent_types::HistoryKind;

use crate::context;

#[derive(Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommands,
}

#[derive(Subcommand)]
pub enum SystemCommands {
    /// Current host metrics
    Metrics,
    /// Backend health and version
    Status,
    /// Aggregated dashboard counters
    Dashboard,
    /// Recent system events
    Events {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Audit trail of past activity
    History {
        /// Which trail to read, tasks or events
        #[arg(long, default_value = "tasks")]
        kind: String,
    },
}

pub async fn run(args: SystemArgs) -> anyhow::Result<()> {
    let service = SystemService::new(context::api_client().await?);

    match args.command {
        SystemCommands::Metrics => context::print_json(&service.metrics().await?),
        SystemCommands::Status => context::print_json(&service.status().await?),
        SystemCommands::Dashboard => context::print_json(&service.dashboard_metrics().await?),
        SystemCommands::Events { limit } => context::print_json(&service.events(limit).await?),
        SystemCommands::History { kind } => {
            let kind: HistoryKind =
                serde_json::from_value(serde_json::Value::String(kind.clone()))
                    .map_err(|_| anyhow::anyhow!("unknown history trail: {kind}"))?;
            context::print_json(&service.history(kind).await?)
        }
    }
}
