/*!
 * Peer provisioning
 * Allocates addresses for a new client, records it in the server config and
 * produces the client's own config
 */

use tracing::{info, warn};

use crate::allocator::AddressPool;
use crate::apply::Applier;
use crate::error::Result;
use crate::keys::KeyProvider;
use crate::render::{render_client_config, render_peer_stanza, ClientProfile, PeerRecord};
use crate::scraper::scan;
use crate::settings::PeerSettings;
use crate::storage::ConfigFile;
use crate::validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerKey {
    /// Generate a fresh key pair; the private key goes into the client config.
    Generate,
    /// Operator holds the private key; only the public half is known.
    Supplied { public_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPeer {
    pub username: String,
    pub key: PeerKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedPeer {
    pub record: PeerRecord,
    pub client_config: String,
}

/// Adds `peer` to the server config in `store` and reloads the interface.
///
/// The read-allocate-append-reload sequence takes no lock. Two concurrent
/// runs against the same file can hand out the same address or interleave
/// their appends, so callers must serialise invocations themselves (for
/// example `flock` around the whole command).
///
/// Errors before the append leave the file untouched. A reload failure after
/// the append leaves the new peer on disk but not on the live interface.
pub fn add_peer(
    peer: NewPeer,
    settings: &PeerSettings,
    store: &ConfigFile,
    keys: &impl KeyProvider,
    applier: &impl Applier,
) -> Result<ProvisionedPeer> {
    validate::username(&peer.username)?;

    let (private_key, public_key) = match peer.key {
        PeerKey::Generate => {
            let pair = keys.generate_keypair()?;
            (Some(pair.private_key), pair.public_key)
        }
        PeerKey::Supplied { public_key } => {
            let public_key = public_key.trim().to_string();
            validate::key("public key", &public_key)?;
            (None, public_key)
        }
    };

    let scraped = scan(&store.read()?)?;
    let ipv4 = AddressPool::new(scraped.ipv4, &scraped.excluded).allocate()?;
    let ipv6 = scraped
        .ipv6
        .map(|subnet| AddressPool::new(subnet, &scraped.excluded).allocate())
        .transpose()?;

    let server_public_key = keys.interface_public_key(&settings.interface_name)?;

    let record = PeerRecord {
        username: peer.username.trim().to_string(),
        public_key,
        ipv4,
        ipv6,
    };
    store.append(&render_peer_stanza(&record))?;
    info!(
        username = %record.username,
        %ipv4,
        ipv6 = ?ipv6,
        path = %store.path().display(),
        "peer appended"
    );

    if let Err(err) = applier.reload(&settings.interface_name) {
        warn!(
            interface = %settings.interface_name,
            "config updated but live interface was not reloaded"
        );
        return Err(err);
    }

    let client_config = render_client_config(&ClientProfile {
        ipv4,
        ipv6,
        private_key: private_key.as_deref(),
        server_public_key: &server_public_key,
        endpoint: &settings.endpoint,
        dns: &settings.dns_server,
        allowed_ips: &settings.allowed_ips,
        persistent_keepalive: settings.persistent_keepalive,
    });

    Ok(ProvisionedPeer {
        record,
        client_config,
    })
}
