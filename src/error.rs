use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of failures, as surfaced to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ImageLoadFailed,
    NoImageLoaded,
    ExportIoFailure,
    ShareUnavailable,
    Configuration,
}

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("cannot load image {}: {source}", .path.display())]
    ImageLoadFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no image loaded")]
    NoImageLoaded,

    #[error("cannot write {}: {source}", .path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode {}: {source}", .path.display())]
    ExportEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{source} ({} was already written)", .written.display())]
    PartialExport {
        written: PathBuf,
        #[source]
        source: Box<TaggerError>,
    },

    #[error("cannot render annotated image: {0}")]
    ExportRender(String),

    #[error("sharing is not available: {0}")]
    ShareUnavailable(String),

    #[error("class index {index} out of range (catalog has {len} classes)")]
    UnknownClass { index: usize, len: usize },

    #[error("invalid class catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("cannot read config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl TaggerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaggerError::PartialExport { source, .. } => source.kind(),
            TaggerError::ImageLoadFailed { .. } => ErrorKind::ImageLoadFailed,
            TaggerError::NoImageLoaded => ErrorKind::NoImageLoaded,
            TaggerError::ExportIo { .. }
            | TaggerError::ExportEncode { .. }
            | TaggerError::ExportRender(_) => ErrorKind::ExportIoFailure,
            TaggerError::ShareUnavailable(_) => ErrorKind::ShareUnavailable,
            TaggerError::UnknownClass { .. }
            | TaggerError::InvalidCatalog(_)
            | TaggerError::InvalidConfig(_)
            | TaggerError::Config { .. } => ErrorKind::Configuration,
        }
    }
}

pub type Result<T, E = TaggerError> = std::result::Result<T, E>;
