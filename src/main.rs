//! ztna-client binary entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use ztna_client::{
    cli, logging, ActivityLog, ClientContext, Config, ConnectionController, ConnectionIdStore,
    ConnectivityMonitor, ContextProvider, ContinuousAuthPoller, GatewayClient, MonitorConfig,
    PolicyClient, Scheduler, SessionStore, UnloadGuard,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("try 'ztna-client --help'");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_with(config.log_filter());

    if let Err(e) = run(&args, &config).await {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(args: &cli::Args, config: &Config) -> ztna_client::Result<()> {
    info!("ztna-client v{}", env!("CARGO_PKG_VERSION"));
    info!("gateway: {}", config.gateway.base_url);

    let store = Arc::new(SessionStore::new());
    let log = Arc::new(ActivityLog::new(config.activity.capacity));
    let provider = Arc::new(ContextProvider::new(ClientContext::default()));

    let gateway = GatewayClient::new(&config.gateway.base_url, config.request_timeout())?;
    let policy = PolicyClient::new(&config.gateway.policy_url, config.request_timeout())?;
    let persist = ConnectionIdStore::new(&config.storage.state_dir);

    match gateway.health().await {
        Ok(health) => info!("gateway health: {}", health.status),
        Err(e) => tracing::warn!("gateway health check failed: {}", e),
    }

    let controller = ConnectionController::new(
        Arc::clone(&store),
        Arc::clone(&log),
        gateway.clone(),
        persist.clone(),
    );
    let (scheduler, bus) = Scheduler::new(controller);
    tokio::spawn(scheduler.run());

    // A session persisted before the last shutdown is rediscovered by
    // the first status poll; a stale one is cleared by the same poll.
    if let Err(e) = bus.status().await {
        info!("no session rediscovered: {}", e);
    }

    if let Some(ref credential) = args.credential {
        let context = provider.snapshot()?;
        match bus.connect(credential, context).await {
            Ok(session) => {
                if let Some(id) = session.connection_id {
                    info!("session {} active", id);
                }
            }
            Err(e) => tracing::error!("connect failed: {}", e),
        }
    }

    let monitor_config = MonitorConfig {
        probe_url: config.monitor.probe_url.clone(),
        probe_interval: config.probe_interval(),
    };
    // The sender must outlive the wait below: the monitor stops when
    // every event sender is gone.
    let (monitor, _net_events) =
        ConnectivityMonitor::new(bus.clone(), Arc::clone(&log), monitor_config)?;
    tokio::spawn(monitor.run());

    let poller = ContinuousAuthPoller::new(
        policy,
        Arc::clone(&provider),
        Arc::clone(&store),
        Arc::clone(&log),
        config.auth_interval(),
    );
    tokio::spawn(poller.run());

    let guard = UnloadGuard::new(Arc::clone(&store), persist, gateway, Arc::clone(&log));
    guard.arm()?;

    info!("running; press ctrl-c to shut down");
    tokio::signal::ctrl_c().await?;

    // Best-effort release: the attempt is guaranteed, confirmation is
    // not. Bound the wait so shutdown stays prompt.
    if let Some(handle) = guard.fire() {
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }
    info!("shutdown complete");

    Ok(())
}
