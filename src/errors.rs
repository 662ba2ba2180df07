//! Error types for the scanner
//!
//! Startup errors (`AmountError`, `CatalogError`, `ConfigError`) are fatal and
//! bubble up to `main`. `QuoteError` is per-leg: the scanner reports it and moves
//! on to the next candidate.

use std::path::PathBuf;
use thiserror::Error;

/// Amount parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount {0:?}: expected a non-empty base-10 digit string")]
    InvalidAmount(String),
}

/// Token list / bad-pair file errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("token list {path} unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token list {path} malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Quote service errors (recoverable, per candidate)
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid http status: {status}")]
    Upstream { status: u16 },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid quote endpoint {0:?}")]
    InvalidEndpoint(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown start token {0:?} (see `roundtrip presets`)")]
    UnknownPreset(String),

    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
