use clap::{Args, Subcommand};
use localagent_app_state::{CodeRunnerContainer, JobTrackerConfig};
use localagent_types::CodeInput;

use crate::context;

#[derive(Args)]
pub struct CodeArgs {
    #[command(subcommand)]
    pub command: CodeCommands,
}

#[derive(Subcommand)]
pub enum CodeCommands {
    /// Submit code to a runtime and poll until it finishes
    Run {
        /// Runtime instance id
        #[arg(long)]
        runtime: String,
        /// Source code to execute
        #[arg(long)]
        source: String,
        /// Language of the source
        #[arg(long, default_value = "python")]
        language: String,
    },
    /// Show one execution by id
    Status { id: String },
    /// Cancel a running execution
    Cancel { id: String },
    /// List available runtimes
    Runtimes,
}

pub async fn run(args: CodeArgs) -> anyhow::Result<()> {
    let client = context::api_client().await?;
    let container = CodeRunnerContainer::new(client, JobTrackerConfig::default());

    match args.command {
        CodeCommands::Run {
            runtime,
            source,
            language,
        } => {
            let input = CodeInput {
                code: source,
                language,
                config: None,
            };
            let id = container.run(&runtime, input).await?;
            let record = context::wait_for_terminal(container.executions(), &id).await?;
            context::print_json(&record)
        }
        CodeCommands::Status { id } => {
            let record = container.execution_status(&id).await?;
            context::print_json(&record)
        }
        CodeCommands::Cancel { id } => {
            container.cancel_execution(&id).await?;
            println!("cancelled {id}");
            Ok(())
        }
        CodeCommands::Runtimes => {
            container.refresh_runtimes().await?;
            let runtimes = container.runtimes().items().await;
            context::print_json(&runtimes)
        }
    }
}
