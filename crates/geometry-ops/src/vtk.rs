//! Legacy VTK `POLYDATA` reading through `vtkio`.
//!
//! Points, polygons and triangle strips become a [`Mesh`]; vertex and line
//! cells are dropped. Every point attribute (scalars, vectors, normals,
//! tensors, texture coordinates and field arrays) becomes a [`PointArray`]
//! under its own name. Cell data is ignored.

use mesh_types::{Mesh, PointArray};
use tracing::debug;
use vtkio::model::{Attribute, DataSet, ElementType, IOBuffer, Piece, VertexNumbers};
use vtkio::Vtk;

use crate::types::GeometryError;

fn vtk_error(reason: impl Into<String>) -> GeometryError {
    GeometryError::Vtk {
        reason: reason.into(),
    }
}

fn components(elem: &ElementType) -> usize {
    match *elem {
        ElementType::Scalars { num_comp, .. } => num_comp as usize,
        ElementType::ColorScalars(n) | ElementType::TCoords(n) | ElementType::Generic(n) => {
            n as usize
        }
        ElementType::Vectors | ElementType::Normals => 3,
        ElementType::Tensors => 9,
        ElementType::LookupTable => 4,
    }
}

fn to_array(name: String, components: usize, data: IOBuffer) -> Result<PointArray, GeometryError> {
    let array = if matches!(data, IOBuffer::U8(_)) {
        data.cast_into::<u8>()
            .map(|values| PointArray::uchar(name.as_str(), components, values))
    } else {
        data.cast_into::<f64>()
            .map(|values| PointArray::float(name.as_str(), components, values))
    };
    array.ok_or_else(|| vtk_error(format!("array {} has no numeric values", name)))
}

/// Split count-prefixed (legacy) or offset-delimited (XML) cell lists.
fn cells(numbers: VertexNumbers) -> Result<Vec<Vec<u32>>, GeometryError> {
    match numbers {
        VertexNumbers::Legacy {
            num_cells,
            vertices,
        } => {
            let mut out = Vec::with_capacity(num_cells as usize);
            let mut rest = vertices.as_slice();
            while let Some((&n, tail)) = rest.split_first() {
                let n = n as usize;
                if tail.len() < n {
                    return Err(vtk_error(format!(
                        "cell {} declares {} vertices, {} remain",
                        out.len(),
                        n,
                        tail.len()
                    )));
                }
                out.push(tail[..n].to_vec());
                rest = &tail[n..];
            }
            if out.len() != num_cells as usize {
                return Err(vtk_error(format!(
                    "found {} cells, header declares {}",
                    out.len(),
                    num_cells
                )));
            }
            Ok(out)
        }
        VertexNumbers::XML {
            connectivity,
            offsets,
        } => {
            let mut start = 0usize;
            offsets
                .iter()
                .map(|&end| -> Result<Vec<u32>, GeometryError> {
                    let end = end as usize;
                    let cell = connectivity
                        .get(start..end)
                        .ok_or_else(|| vtk_error(format!("cell offset {} out of range", end)))?
                        .iter()
                        .map(|&i| i as u32)
                        .collect();
                    start = end;
                    Ok(cell)
                })
                .collect()
        }
    }
}

/// Convert a parsed VTK document into a mesh.
pub fn mesh_from_vtk(vtk: Vtk) -> Result<Mesh, GeometryError> {
    let DataSet::PolyData { pieces, .. } = vtk.data else {
        return Err(GeometryError::NotSupported {
            operation: "VTK datasets other than POLYDATA".to_string(),
        });
    };

    let mut mesh = Mesh::new();
    for piece in pieces {
        let Piece::Inline(piece) = piece else {
            return Err(GeometryError::NotSupported {
                operation: "VTK pieces stored outside the file".to_string(),
            });
        };
        let piece = *piece;
        if !mesh.points.is_empty() {
            return Err(GeometryError::NotSupported {
                operation: "multi-piece VTK polydata".to_string(),
            });
        }

        let coords = piece
            .points
            .cast_into::<f32>()
            .ok_or_else(|| vtk_error("POINTS are not numeric"))?;
        if coords.len() % 3 != 0 {
            return Err(vtk_error(format!(
                "{} point coordinates is not a multiple of 3",
                coords.len()
            )));
        }
        mesh.points = coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        if let Some(polys) = piece.polys {
            mesh.polys = cells(polys)?;
        }
        if let Some(strips) = piece.strips {
            mesh.strips = cells(strips)?;
        }

        for attribute in piece.data.point {
            match attribute {
                Attribute::DataArray(array) => {
                    let n = components(&array.elem);
                    mesh.point_data.insert(to_array(array.name, n, array.data)?);
                }
                Attribute::Field { data_array, .. } => {
                    for array in data_array {
                        let n = array.elem as usize;
                        mesh.point_data.insert(to_array(array.name, n, array.data)?);
                    }
                }
            }
        }
    }

    mesh.validate()?;
    debug!(
        points = mesh.vertex_count(),
        polys = mesh.poly_count(),
        strips = mesh.strips.len(),
        arrays = mesh.point_data.len(),
        "read VTK polydata"
    );
    Ok(mesh)
}

/// Parse the bytes of a legacy VTK polydata file (ASCII or big-endian binary).
pub fn parse_legacy_vtk(bytes: &[u8]) -> Result<Mesh, GeometryError> {
    let vtk = Vtk::parse_legacy_be(bytes).map_err(|e| vtk_error(format!("{:?}", e)))?;
    mesh_from_vtk(vtk)
}
