use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Client-config parameters for peer provisioning, read from a small TOML file.
///
/// ```toml
/// interface_name = "wg0"
/// dns_server = "1.1.1.1"
/// endpoint = "vpn.example.com:51820"
/// allowed_ips = "0.0.0.0/0"
/// persistent_keepalive = 25
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerSettings {
    #[serde(default = "default_interface_name")]
    pub interface_name: String,
    #[serde(default = "default_dns_server")]
    pub dns_server: String,
    pub endpoint: String,
    #[serde(default = "default_allowed_ips")]
    pub allowed_ips: String,
    #[serde(default = "default_persistent_keepalive")]
    pub persistent_keepalive: u32,
}

fn default_interface_name() -> String {
    "wg0".to_string()
}

fn default_dns_server() -> String {
    "8.8.8.8".to_string()
}

fn default_allowed_ips() -> String {
    "0.0.0.0/0".to_string()
}

fn default_persistent_keepalive() -> u32 {
    21
}

impl PeerSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Could not read settings {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Invalid settings {}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
