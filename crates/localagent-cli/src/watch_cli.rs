use clap::Args;
use localagent_client::{resolve_base_url, resolve_ws_url};
use localagent_events::{EventsSupervisor, ServerEvent, SupervisorConfig};
use tokio::sync::mpsc;

#[derive(Args)]
pub struct WatchArgs {
    /// Reconnect attempts before giving up
    #[arg(long, default_value_t = 5)]
    pub max_retries: u32,
}

pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let base = resolve_base_url(None);
    let ws_url = resolve_ws_url(&base.base_url);
    println!("watching {ws_url}");

    let supervisor = EventsSupervisor::with_config(
        ws_url,
        SupervisorConfig {
            max_retries: args.max_retries,
            ..SupervisorConfig::default()
        },
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = tokio::spawn(async move { supervisor.run(tx).await });

    while let Some(event) = rx.recv().await {
        print_event(&event);
    }

    runner.await??;
    Ok(())
}

fn print_event(event: &ServerEvent) {
    match event {
        ServerEvent::TaskUpdate {
            id,
            status,
            progress,
        } => match progress {
            Some(progress) => println!("task {id} {status:?} {progress:.0}%"),
            None => println!("task {id} {status:?}"),
        },
        ServerEvent::AgentUpdate { id, status } => println!("agent {id} {status:?}"),
        ServerEvent::SystemEvent { level, message } => println!("[{level}] {message}"),
        ServerEvent::Metrics(metrics) => println!(
            "metrics cpu={:.1}% mem={:.1}% disk={:.1}%",
            metrics.cpu_usage, metrics.memory_usage, metrics.disk_usage
        ),
        ServerEvent::ExecutionLog { execution_id, line } => {
            println!("{execution_id} | {line}");
        }
        ServerEvent::Other { kind, data } => println!("{kind} {data}"),
    }
}
