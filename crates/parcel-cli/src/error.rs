//! Errors surfaced by `parcel` subcommands.

use std::{io, path::PathBuf};

use parcel_crypto::CryptoError;
use parcel_proto::ItemError;
use thiserror::Error;

/// Failure of a subcommand, reported by `main` before exiting non-zero.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing an item file failed.
    #[error("{}: {source}", path.display())]
    File {
        /// File being accessed
        path: PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// Writing to stdout failed.
    #[error("output: {0}")]
    Output(#[from] io::Error),

    /// The item is malformed or its signature is invalid.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// The signing key could not be used.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// JSON rendering failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
