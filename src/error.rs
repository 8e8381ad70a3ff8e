use std::path::PathBuf;

use thiserror::Error;

/// Domain errors raised by the import pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A page lists one of its own descendants as an ancestor.
    #[error("page hierarchy cycle: page {id} appears twice in its own parent chain")]
    PageCycle { id: i64 },

    #[error("invalid {which} {value:?}: only ASCII letters, digits and '_' are allowed")]
    InvalidPrefix { which: &'static str, value: String },

    #[error("invalid extension {0:?}")]
    InvalidExtension(String),

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
