use clap::{Args, Subcommand};
use localagent_client::AgentService;

use crate::context;

#[derive(Args)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommands,
}

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List agents
    List,
    /// Show one agent by id
    Show { id: String },
}

pub async fn run(args: AgentArgs) -> anyhow::Result<()> {
    let service = AgentService::new(context::api_client().await?);

    match args.command {
        AgentCommands::List => {
            let agents = service.list(None).await?;
            context::print_json(&agents)
        }
        AgentCommands::Show { id } => match service.get(&id).await? {
            Some(agent) => context::print_json(&agent),
            None => anyhow::bail!("agent {id} not found"),
        },
    }
}
