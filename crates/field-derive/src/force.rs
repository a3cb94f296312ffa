//! Force = strain tensor · surface normal.
//!
//! Tensors are 9 components in row-major order: row `i` dotted with the
//! normal gives force component `i`. Non-finite inputs propagate unchanged.

use geometry_ops::GeometryOps;
use mesh_types::{Mesh, ScalarField, TensorField, VectorField};
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::errors::FieldError;

/// Force vector and its Euclidean norm at one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Force {
    pub vector: [f64; 3],
    pub magnitude: f64,
}

impl Force {
    pub fn is_finite(&self) -> bool {
        self.magnitude.is_finite() && self.vector.iter().all(|c| c.is_finite())
    }
}

pub fn derive_force(tensor: &[f64; 9], normal: &[f64; 3]) -> Force {
    let t = Matrix3::from_row_slice(tensor);
    let n = Vector3::from_column_slice(normal);
    let f = t * n;
    Force {
        vector: [f.x, f.y, f.z],
        magnitude: f.norm(),
    }
}

/// Forces for a whole mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceField {
    pub forces: VectorField,
    pub magnitudes: ScalarField,
    /// Vertices whose force or magnitude is NaN or infinite.
    pub non_finite: usize,
}

pub fn derive_force_field(
    tensors: &TensorField,
    normals: &VectorField,
) -> Result<ForceField, FieldError> {
    if tensors.len() != normals.len() {
        return Err(FieldError::LengthMismatch {
            tensors: tensors.len(),
            normals: normals.len(),
        });
    }

    let per_vertex: Vec<Force> = tensors
        .0
        .par_iter()
        .zip(normals.0.par_iter())
        .map(|(t, n)| derive_force(t, n))
        .collect();

    let non_finite = per_vertex.iter().filter(|f| !f.is_finite()).count();
    let (forces, magnitudes) = per_vertex
        .into_iter()
        .map(|f| (f.vector, f.magnitude))
        .unzip();

    Ok(ForceField {
        forces: VectorField(forces),
        magnitudes: ScalarField(magnitudes),
        non_finite,
    })
}

/// Array names read and written by [`attach_force`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceArrays {
    pub tensor: String,
    pub normals: String,
    pub force: String,
    pub magnitude: String,
}

impl Default for ForceArrays {
    fn default() -> Self {
        Self {
            tensor: "Strain".to_string(),
            normals: "Normals".to_string(),
            force: "force".to_string(),
            magnitude: "forceMag".to_string(),
        }
    }
}

/// Derive forces from the mesh's tensor and normal arrays and attach the
/// force vector and magnitude as new point arrays.
///
/// Returns the number of vertices with non-finite results; those values are
/// written as-is.
#[instrument(skip(geometry, mesh), fields(vertices = mesh.vertex_count()))]
pub fn attach_force<G: GeometryOps + ?Sized>(
    geometry: &G,
    mesh: &mut Mesh,
    arrays: &ForceArrays,
) -> Result<usize, FieldError> {
    let tensors = geometry.tensor_field(mesh, &arrays.tensor)?;
    let normals = geometry.vector_field(mesh, &arrays.normals)?;
    let field = derive_force_field(&tensors, &normals)?;

    if field.non_finite > 0 {
        warn!(
            count = field.non_finite,
            "non-finite force values passed through"
        );
    }
    mesh.point_data.insert(field.forces.into_array(&*arrays.force));
    mesh.point_data
        .insert(field.magnitudes.into_array(&*arrays.magnitude));
    info!(force = %arrays.force, magnitude = %arrays.magnitude, "attached force field");
    Ok(field.non_finite)
}
