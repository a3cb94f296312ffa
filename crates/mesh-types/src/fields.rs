//! Typed per-vertex views over [`PointArray`]s.

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeValues, PointArray};
use crate::mesh::MeshError;

/// One float per vertex (force magnitude, velocity magnitude, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarField(pub Vec<f64>);

/// Three floats per vertex (normals, force vectors).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorField(pub Vec<[f64; 3]>);

/// A 3x3 tensor per vertex, nine components in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TensorField(pub Vec<[f64; 9]>);

/// `(s, t)` texture coordinates per vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TexCoordField(pub Vec<[f64; 2]>);

/// Byte RGB triple per vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByteColorField(pub Vec<[u8; 3]>);

fn tuples<const N: usize>(array: &PointArray) -> Result<Vec<[f64; N]>, MeshError> {
    if array.components != N {
        return Err(MeshError::ComponentMismatch {
            name: array.name.clone(),
            expected: N,
            found: array.components,
        });
    }
    let widened: Vec<f64> = match &array.values {
        AttributeValues::Float(v) => v.clone(),
        AttributeValues::UChar(v) => v.iter().map(|&b| b as f64).collect(),
    };
    Ok(widened
        .chunks_exact(N)
        .map(|chunk| {
            let mut tuple = [0.0; N];
            tuple.copy_from_slice(chunk);
            tuple
        })
        .collect())
}

fn flatten<const N: usize>(tuples: Vec<[f64; N]>) -> Vec<f64> {
    tuples.into_iter().flatten().collect()
}

impl ScalarField {
    pub fn from_array(array: &PointArray) -> Result<Self, MeshError> {
        Ok(Self(tuples::<1>(array)?.into_iter().map(|[v]| v).collect()))
    }

    pub fn into_array(self, name: impl Into<String>) -> PointArray {
        PointArray::float(name, 1, self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl VectorField {
    pub fn from_array(array: &PointArray) -> Result<Self, MeshError> {
        Ok(Self(tuples::<3>(array)?))
    }

    pub fn into_array(self, name: impl Into<String>) -> PointArray {
        PointArray::float(name, 3, flatten(self.0))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TensorField {
    pub fn from_array(array: &PointArray) -> Result<Self, MeshError> {
        Ok(Self(tuples::<9>(array)?))
    }

    pub fn into_array(self, name: impl Into<String>) -> PointArray {
        PointArray::float(name, 9, flatten(self.0))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TexCoordField {
    pub fn from_array(array: &PointArray) -> Result<Self, MeshError> {
        Ok(Self(tuples::<2>(array)?))
    }

    pub fn into_array(self, name: impl Into<String>) -> PointArray {
        PointArray::float(name, 2, flatten(self.0))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ByteColorField {
    pub fn into_array(self, name: impl Into<String>) -> PointArray {
        PointArray::uchar(name, 3, self.0.into_iter().flatten().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
