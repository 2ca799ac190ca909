/*!
 * wg-prepare
 * Bootstrap a WireGuard server config: address, port, key and NAT hooks
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use wgpool_core::{init_server, ConfigFile, FirewallHooks, ServerInit, WgKeyProvider};

#[derive(Parser)]
#[command(name = "wg-prepare")]
#[command(about = "Generate WireGuard server configuration")]
struct Cli {
    /// IPv4 subnet for the server, e.g. 10.0.0.0/24
    #[arg(long)]
    subnet: String,

    /// Optional IPv6 subnet, e.g. fd42:42:42::/64
    #[arg(long)]
    subnet6: Option<String>,

    /// Listen port (1-65535)
    #[arg(long)]
    listen_port: u32,

    /// Server private key; generated with `wg genkey` when omitted
    #[arg(long)]
    private_key: Option<String>,

    /// Where to write the configuration
    #[arg(long, default_value = "/etc/wireguard/wg0.conf")]
    output_file: PathBuf,

    /// Add forwarding and NAT masquerade rules for this egress interface
    #[arg(long, value_name = "EGRESS")]
    masquerade: Option<String>,

    /// PreUp command, written verbatim
    #[arg(long)]
    pre_up: Option<String>,

    /// PostUp command, written verbatim (overrides --masquerade)
    #[arg(long)]
    post_up: Option<String>,

    /// PreDown command, written verbatim
    #[arg(long)]
    pre_down: Option<String>,

    /// PostDown command, written verbatim (overrides --masquerade)
    #[arg(long)]
    post_down: Option<String>,

    /// Path to the `wg` binary
    #[arg(long, default_value = "wg")]
    wg: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("wgpool_prepare={log_level},wgpool_core={log_level}"))
        .with_writer(std::io::stderr)
        .init();

    // Explicit hooks win over generated NAT rules
    let explicit = FirewallHooks {
        pre_up: cli.pre_up,
        post_up: cli.post_up,
        pre_down: cli.pre_down,
        post_down: cli.post_down,
    };
    let hooks = match cli.masquerade.as_deref() {
        Some(egress) => explicit.or(FirewallHooks::masquerade(egress)),
        None => explicit,
    };
    debug!(?hooks, "firewall hooks");

    let request = ServerInit {
        ipv4_subnet: cli.subnet,
        ipv6_subnet: cli.subnet6,
        listen_port: cli.listen_port,
        private_key: cli.private_key,
        hooks,
    };

    // Write the server config
    let store = ConfigFile::new(&cli.output_file);
    let keys = WgKeyProvider::new(cli.wg);

    init_server(request, &store, &keys)
        .with_context(|| format!("could not prepare {}", cli.output_file.display()))?;

    println!(
        "Server configuration successfully written to {}",
        cli.output_file.display()
    );
    Ok(())
}
