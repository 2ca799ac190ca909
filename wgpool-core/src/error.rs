use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("No available IP addresses in subnet {subnet}")]
    PoolExhausted { subnet: String },

    #[error("Key generation failed: {command}: {detail}")]
    KeyGen {
        command: &'static str,
        detail: String,
    },

    #[error("Live reload failed: {command}: {detail}")]
    Apply {
        command: &'static str,
        detail: String,
    },

    #[error("Configuration file {} already exists. Aborting to avoid overwrite.", path.display())]
    FileExists { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
