//! envetcd - run a command with its environment resolved from etcd
//!
//! Composition root: parses flags, wires the etcd store and the process
//! supervisor into the driver, and exits with the driver's status.

mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use envetcd_core::application::exit_code::{EXIT_OK, EXIT_PARSE_FLAGS_ERROR};
use envetcd_core::application::{gateway_peer, normalize_peers, Driver, Invocation, Resolver, RunOutcome};
use envetcd_core::domain::{DeploymentContext, ResolutionConfig, StoreConfig, DEFAULT_PREFIX};
use envetcd_core::port::HostProbe;
use envetcd_core::{AppError, VERSION};
use envetcd_infra_etcd::EtcdKeyValueStore;
use envetcd_infra_system::{SystemHostProbe, TokioProcessSupervisor};

#[derive(Parser, Debug)]
#[command(name = "envetcd")]
#[command(about = "Set environment variables from etcd and run a command", long_about = None)]
#[command(version)]
struct Cli {
    /// etcd peers (comma separated or repeated); defaults to the default gateway
    #[arg(short = 'C', long, env = "ENVETCD_PEERS", value_delimiter = ',')]
    peers: Vec<String>,

    /// Replace the peer list with the cluster's advertised members
    #[arg(long, env = "ENVETCD_SYNC")]
    sync: bool,

    /// Key prefix all tiers live under
    #[arg(long, env = "ENVETCD_PREFIX", default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// System name selecting the system tiers
    #[arg(long, env = "ENVETCD_SYSTEM", default_value = "")]
    system: String,

    /// Service name; its tier may only refine keys already set
    #[arg(long, env = "ENVETCD_SERVICE", default_value = "")]
    service: String,

    /// Host tier name (default: this host's name)
    #[arg(long, env = "ENVETCD_HOSTNAME")]
    hostname: Option<String>,

    /// Keep characters outside [A-Za-z0-9_] in variable names
    #[arg(long, env = "ENVETCD_NO_SANITIZE")]
    no_sanitize: bool,

    /// Keep variable names in their stored case
    #[arg(long, env = "ENVETCD_NO_UPCASE")]
    no_upcase: bool,

    /// Write NAME="value" lines to this file instead of running a command
    #[arg(short = 'w', long, env = "ENVETCD_WRITE_ENV")]
    write_env: Option<PathBuf>,

    /// Start the command with only the resolved variables
    #[arg(short = 'c', long, env = "ENVETCD_CLEAN_ENV")]
    clean_env: bool,

    /// Log filter (e.g. "debug", "envetcd_core=trace")
    #[arg(short = 'l', long, env = "ENVETCD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Runtime environment (development, test, integration, production)
    #[arg(short = 'e', long = "zvelo-env", env = "ZVELO_ENV", default_value = "development")]
    zvelo_env: String,

    /// Cluster index; required outside development
    #[arg(long, env = "CLUSTER_ID")]
    cluster_id: Option<String>,

    /// Per-request store timeout in milliseconds
    #[arg(long, env = "ENVETCD_TIMEOUT_MS", default_value_t = 1000)]
    timeout_ms: u64,

    /// Command to run with the resolved environment
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help / --version also arrive here
            let code = if err.use_stderr() {
                EXIT_PARSE_FLAGS_ERROR
            } else {
                EXIT_OK
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = telemetry::init_logging(cli.log_level.as_deref()) {
        eprintln!("envetcd: {e:#}");
        std::process::exit(EXIT_PARSE_FLAGS_ERROR);
    }

    info!(version = VERSION, "envetcd starting");

    let outcome = run(cli).await;
    let code = outcome.exit_code();

    match &outcome {
        RunOutcome::Failed(err) => error!(error = %err, exit_code = code, "envetcd failed"),
        RunOutcome::ChildFailed(result) => {
            info!(exit_code = code, signal = ?result.signal, "Propagating subprocess exit status")
        }
        RunOutcome::Success => {}
    }

    std::process::exit(code);
}

async fn run(cli: Cli) -> RunOutcome {
    match prepare(cli).await {
        Ok((driver, cfg, invocation)) => driver.run_invocation(&cfg, invocation).await,
        Err(err) => RunOutcome::Failed(err),
    }
}

/// Build everything the driver needs
///
/// Checks that need no network (invocation, deployment flags, config)
/// run before the store is contacted.
async fn prepare(cli: Cli) -> Result<(Driver, ResolutionConfig, Invocation), AppError> {
    let invocation = Invocation::plan(cli.write_env, cli.command)?;
    let deployment = DeploymentContext::from_flags(&cli.zvelo_env, cli.cluster_id.as_deref())?;

    let probe = SystemHostProbe::new();
    let hostname = match cli.hostname {
        Some(hostname) => hostname,
        None => probe
            .hostname()
            .map_err(|e| AppError::Validation(format!("cannot determine hostname: {e}")))?,
    };

    let cfg = ResolutionConfig::new(hostname, cli.system)
        .with_service(cli.service)
        .with_prefix(cli.prefix)
        .with_sanitize(!cli.no_sanitize)
        .with_upcase(!cli.no_upcase);
    cfg.validate()?;

    let peers = resolve_peers(&cli.peers, &probe).await?;
    let store_config = StoreConfig {
        sync: cli.sync,
        timeout: Duration::from_millis(cli.timeout_ms),
        ..StoreConfig::new(peers)
    };

    let store = EtcdKeyValueStore::connect(&store_config, store_config.peers.clone())
        .await
        .map_err(|e| AppError::PeerConfiguration {
            peer: store_config.peers.join(","),
            reason: e.to_string(),
        })?;
    info!(peers = ?store.peers(), sync = store_config.sync, "Store configured");

    let driver = Driver::new(
        Resolver::new(Arc::new(store)),
        Arc::new(TokioProcessSupervisor::with_clean_env(cli.clean_env)),
        deployment,
    );

    Ok((driver, cfg, invocation))
}

/// Normalize the configured peers, or fall back to the default gateway
async fn resolve_peers(configured: &[String], probe: &dyn HostProbe) -> Result<Vec<String>, AppError> {
    let configured: Vec<String> = configured
        .iter()
        .filter(|peer| !peer.trim().is_empty())
        .cloned()
        .collect();

    if !configured.is_empty() {
        return normalize_peers(&configured);
    }

    let gateway = probe
        .default_gateway()
        .await
        .map_err(|e| AppError::PeerConfiguration {
            peer: "default gateway".to_string(),
            reason: e.to_string(),
        })?;

    let peer = gateway_peer(gateway);
    info!(peer = %peer, "No peers configured, using default gateway");
    Ok(vec![peer])
}
