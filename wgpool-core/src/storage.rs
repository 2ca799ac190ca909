/*!
 * Config file storage
 * Read, append and create-once access to the server config on disk
 */

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A wg-quick config file. No locking is done; see [`crate::add_peer`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Fails with [`Error::FileExists`] when something is already at the path.
    pub fn ensure_absent(&self) -> Result<()> {
        if self.exists() {
            return Err(Error::FileExists {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    pub fn read(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Appends to an existing file; never creates one.
    pub fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Writes a new owner-only (0600) file in one step, refusing to replace
    /// anything that appeared at the path in the meantime.
    pub fn create(&self, text: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".wgpool-")
            .tempfile_in(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
        }

        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;

        tmp.persist_noclobber(&self.path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                Error::FileExists {
                    path: self.path.clone(),
                }
            } else {
                Error::Io(e.error)
            }
        })?;
        Ok(())
    }
}
