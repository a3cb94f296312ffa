use std::io;
use std::path::PathBuf;

use mesh_types::MeshError;
use serde::{Deserialize, Serialize};

/// Errors from geometry operations.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("attribute not found: {name}")]
    MissingAttribute { name: String },

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid VTK data: {reason}")]
    Vtk { reason: String },

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },
}

/// Encoding of the PLY payload. The header is always text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyFormat {
    Ascii,
    #[default]
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyFormat {
    /// Value of the header's `format` line.
    pub fn header_name(self) -> &'static str {
        match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
            PlyFormat::BinaryBigEndian => "binary_big_endian",
        }
    }
}

/// Which point attributes the mesh writer should emit, by array name.
///
/// The writer always names a 2-component texcoord array `u`/`v` and a
/// 3-component color array `red`/`green`/`blue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeRequest {
    pub format: PlyFormat,
    /// 3-component float array written as `nx ny nz`.
    pub normals: Option<String>,
    /// 2-component float array written as `u v`.
    pub texcoords: Option<String>,
    /// 3-component array written as uchar `red green blue`.
    pub colors: Option<String>,
}

impl SerializeRequest {
    pub fn new(format: PlyFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_normals(mut self, name: impl Into<String>) -> Self {
        self.normals = Some(name.into());
        self
    }

    pub fn with_texcoords(mut self, name: impl Into<String>) -> Self {
        self.texcoords = Some(name.into());
        self
    }

    pub fn with_colors(mut self, name: impl Into<String>) -> Self {
        self.colors = Some(name.into());
        self
    }
}
