mod catalog;

pub use catalog::{known_architectures, normalize_code, Catalog};
pub use pmu_data::{PmuEvent, TableKind, UNKNOWN_EVENT};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown PMU architecture '{0}'")]
    UnknownArchitecture(String),
    #[error("Failed to read event table {path}")]
    TableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse event table {path}")]
    TableParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
