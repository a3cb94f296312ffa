use std::io;
use std::path::PathBuf;

use field_derive::FieldError;
use geometry_ops::GeometryError;
use hcl_colormap::ColormapError;

/// Errors from a mesh export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("color array not found on mesh: {name}")]
    MissingAttribute { name: String },

    #[error("invalid option {option}: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("failed to parse {path}: {source}")]
    Options {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Colormap(#[from] ColormapError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("failed to serialize mesh to {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: GeometryError,
    },

    #[error("malformed header in {path}: {reason}")]
    Header { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    /// True for errors raised before any file is touched: bad options,
    /// unknown attribute names, degenerate ranges.
    pub fn is_configuration(&self) -> bool {
        match self {
            ExportError::MissingAttribute { .. }
            | ExportError::InvalidOption { .. }
            | ExportError::Options { .. } => true,
            ExportError::Field(e) => matches!(
                e,
                FieldError::DegenerateRange { .. } | FieldError::ZeroObjectSize
            ),
            ExportError::Colormap(e) => matches!(
                e,
                ColormapError::ZeroSamples
                    | ColormapError::NonFiniteEndpoint { .. }
                    | ColormapError::UnknownFormat { .. }
            ),
            ExportError::Geometry(e) => matches!(e, GeometryError::MissingAttribute { .. }),
            _ => false,
        }
    }

    pub(crate) fn invalid(option: &'static str, reason: impl Into<String>) -> Self {
        ExportError::InvalidOption {
            option,
            reason: reason.into(),
        }
    }
}
