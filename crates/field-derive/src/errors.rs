use std::path::PathBuf;

use geometry_ops::GeometryError;
use mesh_types::MeshError;

/// Errors from field derivation and normalization.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("degenerate normalization range [{lo}, {hi}]")]
    DegenerateRange { lo: f64, hi: f64 },

    #[error("field length mismatch: {tensors} tensors, {normals} normals")]
    LengthMismatch { tensors: usize, normals: usize },

    #[error("vertices per object must be positive")]
    ZeroObjectSize,

    #[error("object {index} out of range: mesh holds {objects} objects of {per_object} vertices")]
    ObjectOutOfRange {
        index: usize,
        objects: usize,
        per_object: usize,
    },

    #[error("texture coordinate table {index} has {rows} rows, expected {expected}")]
    TableLength {
        index: usize,
        rows: usize,
        expected: usize,
    },

    #[error("no texture coordinate tables given")]
    NoTables,

    #[error("texture coordinate CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}
