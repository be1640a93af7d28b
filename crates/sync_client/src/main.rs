use std::time::Duration;

use clap::Parser;
use sync_client::{
    HttpTransport, NewChange, Queue, Replayer,
    config::{self, Args, Command},
    error::Result,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(err) = run(args).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = config::load(&args)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("sync_client={}", settings.level))),
        )
        .init();

    let mut queue = Queue::open(&settings.queue_path)?;
    match args.command {
        Command::Enqueue {
            url,
            method,
            body,
            entity,
            action,
            target_id,
        } => {
            let change = NewChange {
                entity,
                action,
                target_id,
                url,
                method,
                body: serde_json::from_str(&body)?,
            };
            let id = queue.enqueue(change)?;
            println!("queued #{id}");
        }
        Command::List => {
            for item in queue.list_all() {
                println!(
                    "#{} {} {} {}",
                    item.id,
                    item.timestamp.format("%Y-%m-%d %H:%M"),
                    item.method,
                    item.url
                );
            }
        }
        Command::Remove { id } => queue.remove_by_id(id)?,
        Command::Clear => queue.clear_all()?,
        Command::Replay => {
            let transport =
                HttpTransport::new(&settings.base_url, &settings.username, &settings.password)?;
            let mut replayer = Replayer::new(transport, queue);
            let report = replayer.replay().await?;
            println!(
                "sent {}, applied {}, retained {}",
                report.sent,
                report.succeeded,
                replayer.queue().len()
            );
            for err in report.batch_errors {
                println!("batch not delivered: {err}");
            }
        }
        Command::Watch { interval_secs } => {
            let transport =
                HttpTransport::new(&settings.base_url, &settings.username, &settings.password)?;
            let interval =
                Duration::from_secs(interval_secs.unwrap_or(settings.probe_interval_secs).max(1));
            let mut replayer = Replayer::new(transport, queue);
            replayer
                .watch(interval, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
        }
    }
    Ok(())
}
