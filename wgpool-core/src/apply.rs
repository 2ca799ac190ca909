/*!
 * Live reload
 * Pushes an edited config to a running interface without taking it down
 */

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

use crate::error::{Error, Result};

pub trait Applier {
    fn reload(&self, interface: &str) -> Result<()>;
}

/// `wg-quick strip <config>` piped into `wg syncconf <interface>`.
#[derive(Debug, Clone)]
pub struct WgQuickApplier {
    config_path: PathBuf,
    wg_path: String,
    wg_quick_path: String,
}

impl WgQuickApplier {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            wg_path: "wg".into(),
            wg_quick_path: "wg-quick".into(),
        }
    }

    pub fn with_tools(mut self, wg_path: impl Into<String>, wg_quick_path: impl Into<String>) -> Self {
        self.wg_path = wg_path.into();
        self.wg_quick_path = wg_quick_path.into();
        self
    }
}

fn apply_error(output: &Output, command: &'static str) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    Error::Apply {
        command,
        detail: if detail.is_empty() {
            format!("{command} failed")
        } else {
            detail.to_string()
        },
    }
}

fn spawn_error(command: &'static str) -> impl Fn(std::io::Error) -> Error {
    move |e| Error::Apply {
        command,
        detail: e.to_string(),
    }
}

impl Applier for WgQuickApplier {
    fn reload(&self, interface: &str) -> Result<()> {
        tracing::info!(interface, config = %self.config_path.display(), "reloading interface");

        let strip = Command::new(&self.wg_quick_path)
            .arg("strip")
            .arg(&self.config_path)
            .output()
            .map_err(spawn_error("wg-quick strip"))?;
        if !strip.status.success() {
            return Err(apply_error(&strip, "wg-quick strip"));
        }

        let mut stripped = tempfile::Builder::new()
            .prefix("wgpool-")
            .suffix(".conf")
            .tempfile()?;
        stripped.write_all(&strip.stdout)?;
        stripped.flush()?;

        let sync = Command::new(&self.wg_path)
            .arg("syncconf")
            .arg(interface)
            .arg(stripped.path())
            .output()
            .map_err(spawn_error("wg syncconf"))?;
        if !sync.status.success() {
            return Err(apply_error(&sync, "wg syncconf"));
        }
        Ok(())
    }
}
