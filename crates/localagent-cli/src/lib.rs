use clap::Parser;

mod agent_cli;
mod auth_cli;
mod code_cli;
mod context;
mod file_cli;
mod system_cli;
mod task_cli;
mod tool_cli;
mod watch_cli;

#[derive(Parser)]
#[command(name = "localagent")]
#[command(about = "LocalAgent admin console CLI")]
pub struct LocalAgentCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Log in and persist the session token
    Login(auth_cli::LoginArgs),
    /// Task management (list, show, create, start, cancel, delete)
    Tasks(task_cli::TaskArgs),
    /// Agent catalogue (list, show)
    Agents(agent_cli::AgentArgs),
    /// Tool catalogue and the tool-call gate
    Tools(tool_cli::ToolArgs),
    /// Code runner (run, status, cancel)
    Code(code_cli::CodeArgs),
    /// File processing (list, convert, status)
    Files(file_cli::FileArgs),
    /// System metrics and status
    System(system_cli::SystemArgs),
    /// Stream server events over the push channel
    Watch(watch_cli::WatchArgs),
}

pub async fn run() -> anyhow::Result<()> {
    let cli = LocalAgentCli::parse();
    match cli.command {
        Commands::Login(args) => auth_cli::run(args).await,
        Commands::Tasks(args) => task_cli::run(args).await,
        Commands::Agents(args) => agent_cli::run(args).await,
        Commands::Tools(args) => tool_cli::run(args).await,
        Commands::Code(args) => code_cli::run(args).await,
        Commands::Files(args) => file_cli::run(args).await,
        Commands::System(args) => system_cli::run(args).await,
        Commands::Watch(args) => watch_cli::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;

    use super::LocalAgentCli;

    #[test]
    fn cli_requires_subcommand() {
        let err = match LocalAgentCli::try_parse_from(["localagent"]) {
            Ok(_) => panic!("expected missing subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn cli_rejects_unknown_subcommand() {
        let err = match LocalAgentCli::try_parse_from(["localagent", "unknown-subcommand"]) {
            Ok(_) => panic!("expected invalid subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn task_subcommands_parse() {
        let cli = LocalAgentCli::try_parse_from(["localagent", "tasks", "list"]);
        assert!(cli.is_ok());

        let cli = LocalAgentCli::try_parse_from(["localagent", "tasks", "start", "t1"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn code_run_requires_runtime_and_source() {
        let err = match LocalAgentCli::try_parse_from(["localagent", "code", "run"]) {
            Ok(_) => panic!("expected missing argument parse error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
