//! `vpcforge` command line: run the HTTP server or drive the orchestrator
//! directly against the configured provider and store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;
use vpcforge_rs::config::{LayeredConfigOptions, VpcForgeConfig};
use vpcforge_rs::core::Orchestrator;
use vpcforge_rs::protocol::{ApiResponse, CreateNetworkRequest, NetworkList};

/// Command-line options.
#[derive(Parser)]
#[command(name = "vpcforge", version, about)]
struct Cli {
    /// Extra vpcforge.json5 layered on top of system, user and cwd config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address, overrides `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Provision a network with one public and one private subnet
    Create {
        #[arg(long)]
        name: String,
        /// Address block, defaults to `orchestrator.default_cidr_block`
        #[arg(long)]
        cidr_block: Option<String>,
    },
    /// List stored networks, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one stored network
    Get { vpc_id: String },
    /// Tear a network down and remove its record
    Delete { vpc_id: String },
}

/// Entry point for the vpcforge CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vpcforge_rs::init_logging();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                override_bind(&mut config, bind)?;
            }
            vpcforge_rs::server::serve(&config)
                .await
                .context("server failed")?;
        }
        Command::Create { name, cidr_block } => {
            let orchestrator = orchestrator(&config)?;
            let request = CreateNetworkRequest {
                name: Some(name),
                cidr_block,
            };
            let record = orchestrator
                .create_from_request(Some(&request), None)
                .await?;
            let message = format!("VPC '{}' created successfully", record.name);
            print_json(&ApiResponse::ok(record).with_message(message))?;
        }
        Command::List { limit } => {
            let records = orchestrator(&config)?.list_networks(limit).await?;
            print_json(&ApiResponse::ok(NetworkList::from(records)))?;
        }
        Command::Get { vpc_id } => {
            let record = orchestrator(&config)?.get_network(&vpc_id).await?;
            print_json(&ApiResponse::ok(record))?;
        }
        Command::Delete { vpc_id } => {
            let result = orchestrator(&config)?.delete_network(&vpc_id).await?;
            let message = format!(
                "VPC '{}' and all associated resources deleted successfully",
                result.vpc_id
            );
            print_json(&ApiResponse::ok(result).with_message(message))?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<VpcForgeConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    info!(
        "loading layered config (cwd={}, runtime_config_set={})",
        cwd.display(),
        path.is_some()
    );
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = path {
        options = options.with_runtime_path(path);
    }
    let layered = VpcForgeConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

/// Apply `serve --bind` and re-check the config it lands in.
fn override_bind(config: &mut VpcForgeConfig, bind: String) -> anyhow::Result<()> {
    config.server.bind = bind;
    config.validate().context("invalid --bind")
}

fn orchestrator(config: &VpcForgeConfig) -> anyhow::Result<Orchestrator> {
    Orchestrator::from_config(config).context("failed to build orchestrator")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_bind_override_is_a_config_error() {
        let mut config = VpcForgeConfig::default();
        let err = override_bind(&mut config, "   ".to_string()).unwrap_err();
        assert!(format!("{err:#}").contains("server.bind cannot be empty"), "{err:#}");

        override_bind(&mut config, "0.0.0.0:9000".to_string()).expect("valid bind");
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }
}
