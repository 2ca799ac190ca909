/*!
 * Server initialisation
 * Validates operator input and writes a fresh `[Interface]` config
 */

use std::collections::BTreeSet;

use tracing::info;

use crate::allocator::allocate;
use crate::error::Result;
use crate::keys::KeyProvider;
use crate::render::{render_server, FirewallHooks, InterfaceAddress, ServerProfile};
use crate::storage::ConfigFile;
use crate::subnet::Subnet;
use crate::validate;

/// Raw server-init input, as typed by the operator.
#[derive(Debug, Clone, Default)]
pub struct ServerInit {
    pub ipv4_subnet: String,
    pub ipv6_subnet: Option<String>,
    pub listen_port: u32,
    /// Generated with the [`KeyProvider`] when absent.
    pub private_key: Option<String>,
    pub hooks: FirewallHooks,
}

fn first_host(subnet: Subnet) -> Result<InterfaceAddress> {
    let ip = allocate(subnet, &BTreeSet::new())?;
    Ok(InterfaceAddress::in_subnet(ip, subnet))
}

/// Writes a new server config to `store` and returns what was written.
///
/// Nothing is generated or written if any input is invalid or the
/// destination already exists.
pub fn init_server(
    request: ServerInit,
    store: &ConfigFile,
    keys: &impl KeyProvider,
) -> Result<ServerProfile> {
    let ipv4 = validate::ipv4_subnet(&request.ipv4_subnet)?;
    let ipv6 = request
        .ipv6_subnet
        .as_deref()
        .map(validate::ipv6_subnet)
        .transpose()?;
    let listen_port = validate::listen_port(request.listen_port)?;
    if let Some(key) = &request.private_key {
        validate::key("private key", key)?;
    }
    store.ensure_absent()?;

    let private_key = match request.private_key {
        Some(key) => key,
        None => {
            info!("no private key supplied, generating one");
            keys.generate_keypair()?.private_key
        }
    };

    let profile = ServerProfile {
        ipv4: first_host(ipv4)?,
        ipv6: ipv6.map(first_host).transpose()?,
        listen_port,
        private_key,
        hooks: request.hooks,
    };

    store.create(&render_server(&profile))?;
    info!(
        path = %store.path().display(),
        address = %profile.ipv4,
        listen_port,
        "server configuration written"
    );
    Ok(profile)
}
