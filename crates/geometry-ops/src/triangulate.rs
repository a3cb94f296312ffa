//! Polygon and strip triangulation.

use mesh_types::Mesh;

use crate::types::GeometryError;

/// Split every cell into triangles.
///
/// Polygons are fan-triangulated from their first vertex (exact for convex
/// cells). Strips alternate winding so every output triangle keeps the
/// strip's orientation. Cells with fewer than three vertices and strip
/// triangles with repeated vertices are dropped.
pub fn triangulate(mesh: &Mesh) -> Result<Mesh, GeometryError> {
    mesh.validate()?;

    let mut polys: Vec<Vec<u32>> = Vec::with_capacity(mesh.polys.len());

    for poly in &mesh.polys {
        if poly.len() < 3 {
            continue;
        }
        for i in 1..(poly.len() - 1) {
            polys.push(vec![poly[0], poly[i], poly[i + 1]]);
        }
    }

    for strip in &mesh.strips {
        for i in 0..strip.len().saturating_sub(2) {
            let (a, b, c) = if i % 2 == 0 {
                (strip[i], strip[i + 1], strip[i + 2])
            } else {
                (strip[i + 1], strip[i], strip[i + 2])
            };
            if a == b || b == c || a == c {
                continue;
            }
            polys.push(vec![a, b, c]);
        }
    }

    Ok(Mesh {
        points: mesh.points.clone(),
        polys,
        strips: Vec::new(),
        point_data: mesh.point_data.clone(),
    })
}
