/*!
 * wg-adduser
 * Provision a WireGuard client: allocate its address, append it to the
 * server config, reload the interface and print the client config
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use wgpool_core::{add_peer, ConfigFile, PeerSettings, WgKeyProvider, WgQuickApplier};

mod prompt;

#[derive(Parser)]
#[command(name = "wg-adduser")]
#[command(about = "Add a WireGuard peer and print its client configuration")]
struct Cli {
    /// Peer settings (endpoint, DNS, allowed IPs, keepalive)
    #[arg(short, long, default_value = "/wgconf/adduser.toml")]
    config: PathBuf,

    /// Server configuration the peer is appended to
    #[arg(long, default_value = "/etc/wireguard/wg0.conf")]
    wg_config: PathBuf,

    /// Path to the `wg` binary
    #[arg(long, default_value = "wg")]
    wg: String,

    /// Path to the `wg-quick` binary
    #[arg(long, default_value = "wg-quick")]
    wg_quick: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("wgpool_adduser={log_level},wgpool_core={log_level}"))
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let settings = PeerSettings::load(&cli.config)?;
    debug!(?settings, "loaded peer settings");

    // Ask the operator about the new peer
    let peer = prompt::ask_new_peer()?;

    // Allocate, append and reload
    let store = ConfigFile::new(&cli.wg_config);
    let keys = WgKeyProvider::new(&cli.wg);
    let applier = WgQuickApplier::new(&cli.wg_config).with_tools(&cli.wg, &cli.wg_quick);

    let provisioned = add_peer(peer, &settings, &store, &keys, &applier)
        .with_context(|| format!("could not add peer to {}", cli.wg_config.display()))?;

    // Message on stderr, config on stdout
    eprintln!("\nGenerated client configuration:");
    println!("{}", provisioned.client_config);
    Ok(())
}
