use clap::{Args, Subcommand};
use localagent_client::ToolService;

use crate::context;

#[derive(Args)]
pub struct ToolArgs {
    #[command(subcommand)]
    pub command: ToolCommands,
}

#[derive(Subcommand)]
pub enum ToolCommands {
    /// List tools. Requires the tool-call gate to be open; a closed
    /// gate yields an empty catalogue without touching the backend.
    List {
        /// Open the tool-call gate for this invocation
        #[arg(long)]
        enable_gate: bool,
    },
    /// Show recent executions of one tool
    Executions { id: String },
}

pub async fn run(args: ToolArgs) -> anyhow::Result<()> {
    let client = context::api_client().await?;

    match args.command {
        ToolCommands::List { enable_gate } => {
            client.set_tool_calls_allowed(enable_gate);
            let service = ToolService::new(client);
            let tools = service.list(None).await?;
            context::print_json(&tools)
        }
        ToolCommands::Executions { id } => {
            client.set_tool_calls_allowed(true);
            let service = ToolService::new(client);
            let executions = service.executions(&id).await?;
            context::print_json(&executions)
        }
    }
}
