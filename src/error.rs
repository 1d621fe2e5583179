use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while bringing a globe up
#[derive(Debug, Error)]
pub enum GlobeError {
    /// The land mask could not be fetched or decoded. Fatal to the globe.
    #[error("failed to load mask '{source_name}': {reason}")]
    AssetLoad { source_name: String, reason: String },

    #[error("invalid city data in {}: {source}", path.display())]
    CityData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("city dataset needs at least two cities, found {0}")]
    NotEnoughCities(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl GlobeError {
    pub(crate) fn asset(source_name: impl Into<String>, reason: impl ToString) -> Self {
        GlobeError::AssetLoad {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GlobeError>;
