use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, transforming or writing feature collections.
///
/// Degenerate geometry (an empty land polygon, an empty clip result) is never
/// reported through this type; stages count it in their reports instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GeoJSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("{} does not contain a FeatureCollection", path.display())]
    NotFeatureCollection { path: PathBuf },

    #[error("feature {index}: {message}")]
    Geometry { index: usize, message: String },

    #[error("unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to serialize GeoJSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
