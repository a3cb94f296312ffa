//! Recording test double implementing GeometryOps.
//!
//! Delegates to the in-tree triangulator and PLY encoder so files it writes
//! are real, but logs every call and can be told to fail serialization.
//! Used by mesh-export to check step ordering and failure handling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mesh_types::Mesh;

use crate::ply::encode_ply;
use crate::traits::GeometryOps;
use crate::triangulate;
use crate::types::*;

/// A call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Triangulate { cells: usize },
    Serialize { path: PathBuf, request: SerializeRequest },
}

/// Deterministic test double for the geometry collaborator.
#[derive(Debug, Default)]
pub struct MockGeometry {
    calls: Vec<MockCall>,
    fail_serialize: bool,
}

impl MockGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every serialization fail with a permission error.
    pub fn failing_serialize() -> Self {
        Self {
            fail_serialize: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[MockCall] {
        &self.calls
    }

    pub fn triangulate_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, MockCall::Triangulate { .. }))
            .count()
    }

    /// The last serialization request, if any.
    pub fn last_request(&self) -> Option<&SerializeRequest> {
        self.calls.iter().rev().find_map(|c| match c {
            MockCall::Serialize { request, .. } => Some(request),
            _ => None,
        })
    }
}

impl GeometryOps for MockGeometry {
    fn triangulate(&mut self, mesh: &Mesh) -> Result<Mesh, GeometryError> {
        self.calls.push(MockCall::Triangulate {
            cells: mesh.poly_count() + mesh.strips.len(),
        });
        triangulate::triangulate(mesh)
    }

    fn serialize_binary_mesh(
        &mut self,
        mesh: &Mesh,
        request: &SerializeRequest,
        path: &Path,
    ) -> Result<(), GeometryError> {
        self.calls.push(MockCall::Serialize {
            path: path.to_path_buf(),
            request: request.clone(),
        });
        if self.fail_serialize {
            return Err(GeometryError::Write {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "mock: write refused"),
            });
        }
        let bytes = encode_ply(mesh, request)?;
        fs::write(path, bytes).map_err(|e| GeometryError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_triangulation() {
        let mut geometry = MockGeometry::new();
        let mesh = Mesh {
            points: vec![[0.0; 3]; 4],
            polys: vec![vec![0, 1, 2, 3]],
            ..Mesh::default()
        };
        let out = geometry.triangulate(&mesh).unwrap();
        assert_eq!(out.poly_count(), 2);
        assert_eq!(geometry.calls(), &[MockCall::Triangulate { cells: 1 }]);
    }

    #[test]
    fn failing_serialize_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ply");
        let mut geometry = MockGeometry::failing_serialize();
        let mesh = Mesh::from_triangles(vec![[0.0; 3]; 3], &[[0, 1, 2]]);
        let err = geometry
            .serialize_binary_mesh(&mesh, &SerializeRequest::default(), &path)
            .unwrap_err();
        assert!(matches!(err, GeometryError::Write { .. }));
        assert!(!path.exists());
        assert!(geometry.last_request().is_some());
    }
}
