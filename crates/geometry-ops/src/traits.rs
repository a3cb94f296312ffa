use std::path::Path;

use mesh_types::{Mesh, PointArray, ScalarField, TensorField, VectorField};

use crate::types::*;

/// Geometry-processing collaborator. Provides the mesh operations the export
/// pipeline delegates rather than implements.
/// Implemented by NativeGeometry (in-tree) and MockGeometry (recording test double).
pub trait GeometryOps {
    /// Convert arbitrary polygons and strips to triangles. Point attributes pass through.
    fn triangulate(&mut self, mesh: &Mesh) -> Result<Mesh, GeometryError>;

    /// Write positions, faces and the requested point attributes to `path`.
    fn serialize_binary_mesh(
        &mut self,
        mesh: &Mesh,
        request: &SerializeRequest,
        path: &Path,
    ) -> Result<(), GeometryError>;

    /// Fetch a 1-component attribute by name.
    fn scalar_field(&self, mesh: &Mesh, name: &str) -> Result<ScalarField, GeometryError> {
        Ok(ScalarField::from_array(point_array(mesh, name)?)?)
    }

    /// Fetch a 3-component attribute by name.
    fn vector_field(&self, mesh: &Mesh, name: &str) -> Result<VectorField, GeometryError> {
        Ok(VectorField::from_array(point_array(mesh, name)?)?)
    }

    /// Fetch a 9-component (3x3 row-major) attribute by name.
    fn tensor_field(&self, mesh: &Mesh, name: &str) -> Result<TensorField, GeometryError> {
        Ok(TensorField::from_array(point_array(mesh, name)?)?)
    }
}

impl<G: GeometryOps + ?Sized> GeometryOps for &mut G {
    fn triangulate(&mut self, mesh: &Mesh) -> Result<Mesh, GeometryError> {
        (**self).triangulate(mesh)
    }

    fn serialize_binary_mesh(
        &mut self,
        mesh: &Mesh,
        request: &SerializeRequest,
        path: &Path,
    ) -> Result<(), GeometryError> {
        (**self).serialize_binary_mesh(mesh, request, path)
    }
}

/// Source of input meshes.
pub trait MeshSource {
    fn read_mesh(&mut self, path: &Path) -> Result<Mesh, GeometryError>;
}

/// Look up a point attribute, checking it covers every vertex.
pub fn point_array<'m>(mesh: &'m Mesh, name: &str) -> Result<&'m PointArray, GeometryError> {
    let array = mesh
        .point_data
        .get(name)
        .ok_or_else(|| GeometryError::MissingAttribute {
            name: name.to_string(),
        })?;
    if array.tuple_count() != mesh.vertex_count() {
        return Err(mesh_types::MeshError::AttributeLength {
            name: name.to_string(),
            tuples: array.tuple_count(),
            vertex_count: mesh.vertex_count(),
        }
        .into());
    }
    Ok(array)
}
