use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use uptime_sync::config::{self, Config};
use uptime_sync::integrations::uptime_kuma::{ServiceOptions, UptimeKumaService};
use uptime_sync::integrations::MonitorService;
use uptime_sync::reconcile::{self, reconcile};

#[derive(Parser, Debug)]
#[command(name = "uptime-sync")]
#[command(about = "Reconcile declared HTTP monitors with an Uptime Kuma instance")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List monitors known to the remote service
    List,
    /// Reconcile the declared monitors with the remote service
    Sync {
        /// Keep reconciling every `sync.interval_secs`
        #[arg(long)]
        watch: bool,
        /// Remove remote monitors that are not declared (overrides `sync.prune`)
        #[arg(long)]
        prune: bool,
    },
    /// Remove a monitor by name
    Remove {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("uptime_sync=info".parse()?),
        )
        .init();

    if args.init {
        config::init_wizard().await?;
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;
    let service = UptimeKumaService::setup(&config.provider, ServiceOptions::from(&config)).await?;

    match args.command.unwrap_or(Command::Sync {
        watch: false,
        prune: false,
    }) {
        Command::List => list(&service).await,
        Command::Sync { watch, prune } => sync(&service, &config, watch, prune).await,
        Command::Remove { name } => {
            let monitor = service.get_by_name(&name).await?;
            service.remove(&monitor).await?;
            println!("Removed {} ({})", monitor.name, monitor.url);
            Ok(())
        }
    }
}

async fn list(service: &UptimeKumaService) -> Result<()> {
    let monitors = service.get_all().await?;
    if monitors.is_empty() {
        println!("No monitors.");
        return Ok(());
    }
    for monitor in monitors {
        println!("{:>6}  {:<32}  {}", monitor.id, monitor.name, monitor.url);
    }
    Ok(())
}

async fn sync(service: &UptimeKumaService, config: &Config, watch: bool, prune: bool) -> Result<()> {
    let prune = prune || config.sync.prune;

    if !watch {
        let report = reconcile(service, &config.monitors, prune).await?;
        if !report.is_clean() {
            anyhow::bail!("{} monitor(s) failed to reconcile", report.failed.len());
        }
        return Ok(());
    }

    let every = Duration::from_secs(config.sync.interval_secs.max(1));
    reconcile::watch(service, &config.monitors, prune, every, tokio::signal::ctrl_c()).await;
    Ok(())
}
