use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuillErr>;

/// Errors surfaced while loading the things a reference field is hosted
/// with. Editing, decoding and rendering never fail.
#[derive(Error, Debug)]
pub enum QuillErr {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to parse catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config.toml: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The trigger must be a single visible character that cannot appear in
    /// the placeholder grammar's delimiters.
    #[error("invalid trigger character {0:?}")]
    InvalidTrigger(char),

    #[error("could not find home directory")]
    NoHomeDir,
}
