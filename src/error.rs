use thiserror::Error;

use crate::codec::AddressFamily;

/// Reasons a range or address is rejected by the filter.
///
/// The boolean filter API never surfaces these; they exist for diagnostics
/// (see [`Cidr::parse`](crate::codec::Cidr::parse)) and for logging skipped ranges.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Missing '/' separator in range: {0}")]
    MissingSeparator(String),

    #[error("Invalid prefix length: {0}")]
    InvalidPrefixLength(String),

    #[error("Prefix length {prefix} exceeds the {family} width")]
    PrefixTooLong { family: AddressFamily, prefix: u32 },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Reserved all-zero address: {0}")]
    ReservedAddress(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
