//! Jury daemon: entry point for running a jury node.

use anyhow::Context;
use clap::Parser;
use jury_node::{init_logging, run_sweep, JuryNode, NodeConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jury-daemon", about = "Dispute case lifecycle daemon")]
struct Cli {
    /// Data directory for the case store.
    #[arg(long, env = "JURY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address the HTTP API binds to.
    #[arg(long, env = "JURY_RPC_HOST")]
    rpc_host: Option<String>,

    /// HTTP API port.
    #[arg(long, env = "JURY_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Disable the HTTP API.
    #[arg(long, env = "JURY_DISABLE_RPC")]
    no_rpc: bool,

    /// Disable the Prometheus metrics endpoint.
    #[arg(long, env = "JURY_DISABLE_METRICS")]
    no_metrics: bool,

    /// Seconds between sweeps for expired cases.
    #[arg(long, env = "JURY_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "JURY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "JURY_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "JURY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Node operations.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum NodeAction {
    /// Run the node until SIGINT/SIGTERM.
    Run,
    /// Close every expired case once and exit.
    Sweep,
    /// Print the effective configuration as TOML.
    Config,
}

/// Layer CLI flags and env vars over the config file (or the defaults).
fn build_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => NodeConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(host) = &cli.rpc_host {
        config.rpc_host = host.clone();
    }
    if let Some(port) = cli.rpc_port {
        config.rpc_port = port;
    }
    if cli.no_rpc {
        config.enable_rpc = false;
    }
    if cli.no_metrics {
        config.enable_metrics = false;
    }
    if let Some(secs) = cli.sweep_interval_secs {
        config.sweep_interval_secs = secs;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let Command::Node { action } = cli.command;
    if let NodeAction::Config = action {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    init_logging(config.parsed_log_format()?, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    match action {
        NodeAction::Run => {
            tracing::info!(
                "starting jury node (data: {}, RPC: {}, sweep every {}s)",
                config.data_dir.display(),
                if config.enable_rpc {
                    format!("{}:{}", config.rpc_host, config.rpc_port)
                } else {
                    "off".into()
                },
                config.sweep_interval_secs,
            );
            let mut node = JuryNode::new(config)?;
            node.run().await?;
            tracing::info!("jury daemon exited cleanly");
        }
        NodeAction::Sweep => {
            let node = JuryNode::new(config)?;
            let lifecycle = std::sync::Arc::clone(node.lifecycle());
            let clock = std::sync::Arc::clone(node.clock());
            let report = tokio::task::spawn_blocking(move || {
                run_sweep(&lifecycle, clock.as_ref(), None)
            })
            .await
            .context("sweep task panicked")??;
            print_sweep(&report);
        }
        NodeAction::Config => {}
    }

    Ok(())
}

fn print_sweep(report: &jury_lifecycle::SweepReport) {
    println!(
        "examined {} expired case(s): {} closed, {} already closed, {} failed",
        report.examined, report.closed, report.already_closed, report.failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("jury-daemon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_without_flags() {
        let config = build_config(&parse(&["node", "run"])).unwrap();
        assert_eq!(config, NodeConfig::default());
    }

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jury.toml");
        std::fs::write(
            &path,
            "rpc_port = 8000\nsweep_interval_secs = 60\n[lifecycle]\nthreshold_min_votes = 10\n",
        )
        .unwrap();

        let cli = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--rpc-port",
            "9000",
            "--no-metrics",
            "node",
            "run",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.rpc_port, 9000);
        assert_eq!(config.sweep_interval_secs, 60);
        assert_eq!(config.lifecycle.threshold_min_votes, 10);
        assert!(!config.enable_metrics);
        assert!(config.enable_rpc);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let cli = parse(&["--log-format", "xml", "node", "config"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = parse(&["--config", "/nonexistent/jury.toml", "node", "sweep"]);
        assert!(build_config(&cli).is_err());
    }
}
