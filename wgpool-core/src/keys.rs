/*!
 * Key provider
 * WireGuard key material via the `wg` binary
 */

use std::io::Write;
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: String,
    pub public_key: String,
}

/// Source of WireGuard keys. Key material is never validated here beyond
/// "the tool produced something".
pub trait KeyProvider {
    fn generate_keypair(&self) -> Result<KeyPair>;

    /// Public key of a running interface.
    fn interface_public_key(&self, interface: &str) -> Result<String>;
}

/// [`KeyProvider`] backed by `wg genkey`, `wg pubkey` and `wg show`.
#[derive(Debug, Clone)]
pub struct WgKeyProvider {
    wg_path: String,
}

impl Default for WgKeyProvider {
    fn default() -> Self {
        Self::new("wg")
    }
}

impl WgKeyProvider {
    pub fn new(wg_path: impl Into<String>) -> Self {
        Self {
            wg_path: wg_path.into(),
        }
    }

    fn run(&self, command: &'static str, args: &[&str], stdin: Option<&str>) -> Result<String> {
        tracing::debug!(command, "running key tool");
        let spawn_err = |e: std::io::Error| Error::KeyGen {
            command,
            detail: e.to_string(),
        };

        let mut child = Command::new(&self.wg_path)
            .args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;
        if let (Some(input), Some(pipe)) = (stdin, child.stdin.as_mut()) {
            pipe.write_all(input.as_bytes()).map_err(spawn_err)?;
        }
        let output = child.wait_with_output().map_err(spawn_err)?;

        if !output.status.success() {
            return Err(keygen_error(&output, command));
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            return Err(Error::KeyGen {
                command,
                detail: "returned an empty key".into(),
            });
        }
        Ok(value)
    }
}

fn keygen_error(output: &Output, command: &'static str) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    Error::KeyGen {
        command,
        detail: if detail.is_empty() {
            format!("{command} failed")
        } else {
            detail.to_string()
        },
    }
}

impl KeyProvider for WgKeyProvider {
    fn generate_keypair(&self) -> Result<KeyPair> {
        let private_key = self.run("wg genkey", &["genkey"], None)?;
        let public_key = self.run("wg pubkey", &["pubkey"], Some(&private_key))?;
        Ok(KeyPair {
            private_key,
            public_key,
        })
    }

    fn interface_public_key(&self, interface: &str) -> Result<String> {
        self.run("wg show", &["show", interface, "public-key"], None)
    }
}
