use bitmap_support::DecodeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SatIndexError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to fetch sat index page {page}: {reason}")]
    PageFetchFailed { page: usize, reason: String },

    #[error("sat index page {page} is in an unrecognized format: {reason}")]
    PageFormatUnrecognized { page: usize, reason: String },

    #[error("sat index page {0} does not exist")]
    PageOutOfRange(usize),

    #[error("district {0} is out of range (0..=839999)")]
    DistrictOutOfRange(i64),

    #[error("invalid district: {0}")]
    InvalidDistrict(String),

    #[error("district {0} has no recorded sat")]
    DistrictUnmapped(u32),

    #[error("inscription lookup failed for sat {sat} at offset {offset}: {reason}")]
    InscriptionLookupFailed { sat: u64, offset: u64, reason: String },

    #[error("metadata lookup failed for {inscription}: {reason}")]
    MetadataLookupFailed { inscription: String, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SatIndexError {
    fn from(err: serde_json::Error) -> Self {
        SatIndexError::Serialization(err.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<reqwest::Error> for SatIndexError {
    fn from(err: reqwest::Error) -> Self {
        SatIndexError::Network(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, SatIndexError>;
