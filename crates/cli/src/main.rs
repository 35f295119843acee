//! # dnsguard
//!
//! Policy-driven DNS resolution core: rule evaluation, response caching,
//! interface-aware upstream resolution, bypass grants and telemetry.

mod bootstrap;
mod di;
mod server;

use clap::{Parser, Subcommand};
use dnsguard_domain::{CliOverrides, DnsQuery, RecordType, TransactionId};
use dnsguard_infrastructure::TracingSink;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "dnsguard")]
#[command(version)]
#[command(about = "Policy-driven DNS filtering and resolution core")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Control API bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Control API port
    #[arg(short = 'p', long)]
    control_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Manifest file to load rules from
    #[arg(short = 'm', long)]
    manifest: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control API and background jobs (default)
    Serve,
    /// Run one query through the pipeline and print the outcome
    Query {
        name: String,
        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        bind_address: cli.bind,
        control_port: cli.control_port,
        log_level: cli.log_level,
        manifest_path: cli.manifest,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    let services = di::Services::build(config)?;
    services.load_initial_manifest().await;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(services, cli.config).await,
        Command::Query { name, record_type } => query(services, &name, &record_type).await,
    }
}

async fn serve(services: di::Services, config_path: Option<String>) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    let drain = services
        .telemetry
        .clone()
        .spawn_drain(Arc::new(TracingSink), shutdown.child_token());

    let runner = services.job_runner();
    let jobs_token = runner.cancellation_token();
    runner.start().await;

    let config = services.config();
    let control = if config.server.control_enabled {
        let state = services.app_state();
        let server_config = config.server.clone();
        let token = shutdown.child_token();
        Some(tokio::spawn(async move {
            server::start_control_server(&server_config, state, token).await
        }))
    } else {
        info!("Control API disabled");
        None
    };

    wait_for_shutdown(&services, config_path.as_deref()).await;

    info!("Shutting down");
    jobs_token.cancel();
    shutdown.cancel();

    if let Some(handle) = control {
        match handle.await {
            Ok(Err(e)) => error!(error = %e, "Control API failed"),
            Err(e) => error!(error = %e, "Control API task panicked"),
            Ok(Ok(())) => {}
        }
    }
    let _ = drain.await;
    Ok(())
}

/// Returns on Ctrl+C. On Unix, SIGHUP re-reads the configuration file.
async fn wait_for_shutdown(services: &di::Services, config_path: Option<&str>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "SIGHUP handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => return,
                _ = hangup.recv() => reload(services, config_path),
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (services, config_path);
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg_attr(not(unix), allow(dead_code))]
fn reload(services: &di::Services, config_path: Option<&str>) {
    let Some(path) = config_path else {
        warn!("Reload requested but no configuration file was given");
        return;
    };
    let current = services.config();
    let overrides = CliOverrides {
        bind_address: Some(current.server.bind_address.clone()),
        control_port: Some(current.server.control_port),
        log_level: None,
        manifest_path: current.manifest.path.clone(),
    };
    match dnsguard_domain::Config::load(Some(path), overrides) {
        Ok(config) => match services.reload.execute(config) {
            Ok(snapshot) => info!(version = snapshot.version, "Configuration reloaded"),
            Err(e) => error!(error = %e, "Configuration reload incomplete"),
        },
        Err(e) => error!(error = %e, "Configuration reload rejected"),
    }
}

async fn query(services: di::Services, name: &str, record_type: &str) -> anyhow::Result<()> {
    let record_type: RecordType = record_type
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let query = DnsQuery::new(name, record_type, TransactionId(fastrand::u64(..)));

    let outcome = services.pipeline.handle(query).await;

    let answer = outcome.answer.as_ref().map(|a| {
        json!({
            "status": format!("{:?}", a.status),
            "addresses": a.addresses.iter().map(|ip| ip.to_string()).collect::<Vec<_>>(),
            "cname_chain": a.cname_chain.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            "upstream_ttl": a.upstream_ttl,
        })
    });
    let report = json!({
        "name": name,
        "type": record_type.as_str(),
        "outcome": outcome.tag.as_str(),
        "decision": outcome.verdict.decision,
        "source": outcome.verdict.source,
        "answer": answer,
        "error": outcome.error.as_ref().map(|e| e.to_string()),
        "interface": outcome.interface.as_ref().map(|i| i.to_string()),
        "attempts": outcome.attempts,
        "latency_ms": outcome.latency.as_secs_f64() * 1000.0,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    services.telemetry.drain(&TracingSink).await;
    Ok(())
}
