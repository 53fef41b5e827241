// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for the driver: a per-file failure rides the results channel tagged by path
//! (ยง4.6); only [`DriverError::BowlerQuit`] (the user pressing `q`) is allowed to escape the main
//! loop early.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("i/o error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("user quit the interactive review")]
    BowlerQuit,
    #[error("{0} asked to be retried")]
    RetryFile(PathBuf),
}
