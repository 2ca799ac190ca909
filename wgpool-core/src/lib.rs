/*!
 * wgpool
 * WireGuard server bootstrap and peer provisioning over plain wg-quick configs
 *
 * The config file on disk is the only state. Every run re-scrapes it, picks
 * the lowest free address and writes text back.
 */

pub mod allocator;
pub mod apply;
pub mod error;
pub mod keys;
pub mod peer;
pub mod render;
pub mod scraper;
pub mod server;
pub mod settings;
pub mod storage;
pub mod subnet;
pub mod validate;

pub use allocator::{allocate, AddressPool};
pub use apply::{Applier, WgQuickApplier};
pub use error::{Error, Result};
pub use keys::{KeyPair, KeyProvider, WgKeyProvider};
pub use peer::{add_peer, NewPeer, PeerKey, ProvisionedPeer};
pub use render::{FirewallHooks, PeerRecord, ServerProfile};
pub use scraper::{scan, ScrapedConfig};
pub use server::{init_server, ServerInit};
pub use settings::PeerSettings;
pub use storage::ConfigFile;
pub use subnet::Subnet;
