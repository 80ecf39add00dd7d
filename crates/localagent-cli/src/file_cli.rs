use clap::{Args, Subcommand};
use localagent_app_state::{FileProcessorContainer, JobTrackerConfig};
use localagent_types::{FileOperationConfig, FileType};

use crate::context;

#[derive(Args)]
pub struct FileArgs {
    #[command(subcommand)]
    pub command: FileCommands,
}

#[derive(Subcommand)]
pub enum FileCommands {
    /// List files known to the backend
    List {
        /// Restrict the listing to one directory
        #[arg(long)]
        directory: Option<String>,
    },
    /// Convert a file and poll until the job finishes
    Convert {
        /// Source path on the backend
        source: String,
        /// Target format, for example pdf or png
        #[arg(long)]
        to: String,
        /// Explicit target path
        #[arg(long)]
        target: Option<String>,
    },
    /// Show one conversion job by id
    Status { id: String },
}

pub async fn run(args: FileArgs) -> anyhow::Result<()> {
    let client = context::api_client().await?;
    let container = FileProcessorContainer::new(client, JobTrackerConfig::default());

    match args.command {
        FileCommands::List { directory } => {
            container.refresh(directory.as_deref()).await?;
            let files = container.files().items().await;
            context::print_json(&files)
        }
        FileCommands::Convert { source, to, target } => {
            let kind: FileType = serde_json::from_value(serde_json::Value::String(to.clone()))
                .map_err(|_| anyhow::anyhow!("unknown target format: {to}"))?;
            let config = FileOperationConfig {
                source,
                target,
                kind: Some(kind),
                options: None,
            };
            let id = container.start_conversion(&config).await?;
            let record = context::wait_for_terminal(container.conversions(), &id).await?;
            context::print_json(&record)
        }
        FileCommands::Status { id } => {
            let record = container.conversion_status(&id).await?;
            context::print_json(&record)
        }
    }
}
