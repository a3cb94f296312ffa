//! In-tree geometry collaborator.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use mesh_types::Mesh;
use tracing::{debug, instrument};

use crate::ply::PlyLayout;
use crate::traits::{GeometryOps, MeshSource};
use crate::types::*;
use crate::{triangulate, vtk};

/// Geometry collaborator backed by this crate's triangulator, the `ply-rs`
/// writer and the `vtkio` legacy reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeGeometry;

impl NativeGeometry {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryOps for NativeGeometry {
    fn triangulate(&mut self, mesh: &Mesh) -> Result<Mesh, GeometryError> {
        let out = triangulate::triangulate(mesh)?;
        debug!(
            cells_in = mesh.poly_count() + mesh.strips.len(),
            triangles = out.poly_count(),
            "triangulated mesh"
        );
        Ok(out)
    }

    #[instrument(skip(self, mesh, request), fields(format = ?request.format))]
    fn serialize_binary_mesh(
        &mut self,
        mesh: &Mesh,
        request: &SerializeRequest,
        path: &Path,
    ) -> Result<(), GeometryError> {
        let layout = PlyLayout::resolve(mesh, request)?;
        let write_err = |source| GeometryError::Write {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(write_err)?;
        layout.write(BufWriter::new(file)).map_err(write_err)?;
        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.poly_count(),
            "wrote mesh"
        );
        Ok(())
    }
}

impl MeshSource for NativeGeometry {
    #[instrument(skip(self))]
    fn read_mesh(&mut self, path: &Path) -> Result<Mesh, GeometryError> {
        let bytes = fs::read(path).map_err(|e| GeometryError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        vtk::parse_legacy_vtk(&bytes)
    }
}
