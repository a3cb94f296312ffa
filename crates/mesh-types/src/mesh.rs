use serde::{Deserialize, Serialize};

use crate::attributes::PointData;

/// Errors raised when a mesh or one of its attributes is structurally invalid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("cell {cell} references vertex {index} (vertex count = {vertex_count})")]
    IndexOutOfRange {
        cell: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("attribute {name} has {tuples} tuples, mesh has {vertex_count} vertices")]
    AttributeLength {
        name: String,
        tuples: usize,
        vertex_count: usize,
    },

    #[error("attribute {name} has {found} components, expected {expected}")]
    ComponentMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// A polygonal surface mesh with point-associated attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub points: Vec<[f32; 3]>,
    /// Polygonal cells as vertex index lists (triangles, quads, n-gons).
    pub polys: Vec<Vec<u32>>,
    /// Triangle strips. Only triangulation consumes these.
    pub strips: Vec<Vec<u32>>,
    /// Named per-vertex attribute arrays.
    pub point_data: PointData,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh directly from triangles.
    pub fn from_triangles(points: Vec<[f32; 3]>, triangles: &[[u32; 3]]) -> Self {
        Self {
            points,
            polys: triangles.iter().map(|t| t.to_vec()).collect(),
            strips: Vec::new(),
            point_data: PointData::default(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Number of polygonal cells (strips not included).
    pub fn poly_count(&self) -> usize {
        self.polys.len()
    }

    /// True when every cell is a triangle and no strips remain.
    pub fn is_triangulated(&self) -> bool {
        self.strips.is_empty() && !self.polys.is_empty() && self.polys.iter().all(|c| c.len() == 3)
    }

    /// Check that every cell index is in range and every attribute covers all vertices.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertex_count();
        for (cell, indices) in self.polys.iter().chain(self.strips.iter()).enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    cell,
                    index,
                    vertex_count,
                });
            }
        }
        for array in self.point_data.iter() {
            if array.tuple_count() != vertex_count {
                return Err(MeshError::AttributeLength {
                    name: array.name.clone(),
                    tuples: array.tuple_count(),
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds `(min, max)` of a contiguous vertex range.
    pub fn bounds_of(&self, range: std::ops::Range<usize>) -> Option<([f32; 3], [f32; 3])> {
        let points = self.points.get(range)?;
        let first = *points.first()?;
        Some(points.iter().fold((first, first), |(mut lo, mut hi), p| {
            for k in 0..3 {
                lo[k] = lo[k].min(p[k]);
                hi[k] = hi[k].max(p[k]);
            }
            (lo, hi)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::PointArray;

    fn quad() -> Mesh {
        Mesh {
            points: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            polys: vec![vec![0, 1, 2, 3]],
            ..Mesh::default()
        }
    }

    #[test]
    fn quad_is_not_triangulated() {
        assert!(!quad().is_triangulated());
        let tris = Mesh::from_triangles(quad().points, &[[0, 1, 2], [0, 2, 3]]);
        assert!(tris.is_triangulated());
    }

    #[test]
    fn empty_mesh_is_not_triangulated() {
        assert!(!Mesh::new().is_triangulated());
    }

    #[test]
    fn validate_rejects_bad_index() {
        let mut mesh = quad();
        mesh.polys[0][2] = 9;
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                cell: 0,
                index: 9,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn validate_rejects_short_attribute() {
        let mut mesh = quad();
        mesh.point_data
            .insert(PointArray::float("forceMag", 1, vec![1.0, 2.0]));
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::AttributeLength { tuples: 2, .. })
        ));
    }

    #[test]
    fn bounds_of_sub_range() {
        let mesh = quad();
        let (lo, hi) = mesh.bounds_of(1..3).unwrap();
        assert_eq!(lo, [1.0, 0.0, 0.0]);
        assert_eq!(hi, [1.0, 1.0, 0.0]);
        assert!(mesh.bounds_of(3..9).is_none());
    }
}
