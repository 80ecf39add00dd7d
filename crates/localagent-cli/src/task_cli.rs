use clap::{Args, Subcommand};
use localagent_client::TaskService;

use crate::context;

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    List,
    /// Show one task by id
    Show { id: String },
    /// Create a task from an inline JSON draft
    Create {
        /// Task draft as a JSON object
        json: String,
    },
    /// Start a pending task
    Start { id: String },
    /// Cancel a task
    Cancel { id: String },
    /// Delete a task
    Delete { id: String },
}

pub async fn run(args: TaskArgs) -> anyhow::Result<()> {
    let service = TaskService::new(context::api_client().await?);

    match args.command {
        TaskCommands::List => {
            let tasks = service.list(None).await?;
            context::print_json(&tasks)
        }
        TaskCommands::Show { id } => match service.get(&id).await? {
            Some(task) => context::print_json(&task),
            None => anyhow::bail!("task {id} not found"),
        },
        TaskCommands::Create { json } => {
            let draft: serde_json::Value = serde_json::from_str(&json)?;
            let task = service.create(&draft).await?;
            context::print_json(&task)
        }
        TaskCommands::Start { id } => {
            let task = service.start(&id).await?;
            context::print_json(&task)
        }
        TaskCommands::Cancel { id } => {
            let task = service.cancel(&id).await?;
            context::print_json(&task)
        }
        TaskCommands::Delete { id } => {
            service.delete(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}
