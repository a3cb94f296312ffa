//! Per-object 3-D texture coordinates.
//!
//! Meshes holding many identical objects (one cell model repeated, a fixed
//! number of vertices each) get a solid-texture lookup coordinate per vertex.
//! Coordinates for a handful of reference objects are saved as `s,t,r` CSV
//! tables, then assigned round-robin across all objects and stored as bytes
//! so a PLY consumer reads them as vertex colors.

use std::path::{Path, PathBuf};

use mesh_types::{ByteColorField, Mesh};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::FieldError;

/// Point array holding the byte-encoded coordinates.
pub const TEXCOORDS3D_ARRAY: &str = "texCoords3dAsColor";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TexRow {
    s: f64,
    t: f64,
    r: f64,
}

fn object_count(mesh: &Mesh, per_object: usize) -> Result<usize, FieldError> {
    if per_object == 0 {
        return Err(FieldError::ZeroObjectSize);
    }
    Ok(mesh.vertex_count() / per_object)
}

/// Normalized coordinates of object `index`: its bounding box is centered on
/// the origin, scaled by the longest side and shifted by 0.5, then clamped
/// to [0, 1].
pub fn object_texcoords(
    mesh: &Mesh,
    index: usize,
    per_object: usize,
) -> Result<Vec<[f64; 3]>, FieldError> {
    let objects = object_count(mesh, per_object)?;
    if index >= objects {
        return Err(FieldError::ObjectOutOfRange {
            index,
            objects,
            per_object,
        });
    }
    let range = index * per_object..(index + 1) * per_object;
    let Some((lo, hi)) = mesh.bounds_of(range.clone()) else {
        return Err(FieldError::ObjectOutOfRange {
            index,
            objects,
            per_object,
        });
    };

    let center: [f64; 3] = std::array::from_fn(|k| (lo[k] as f64 + hi[k] as f64) / 2.0);
    let longest = (0..3)
        .map(|k| hi[k] as f64 - lo[k] as f64)
        .fold(0.0, f64::max);

    Ok(mesh.points[range]
        .iter()
        .map(|p| {
            std::array::from_fn(|k| {
                if longest > 0.0 {
                    ((p[k] as f64 - center[k]) / longest + 0.5).clamp(0.0, 1.0)
                } else {
                    0.5
                }
            })
        })
        .collect())
}

/// Objects a quarter, half and three quarters of the way through the mesh.
pub fn reference_objects(objects: usize) -> [usize; 3] {
    [objects / 4, objects / 2, 3 * objects / 4]
}

pub fn write_texcoord_csv(path: &Path, coords: &[[f64; 3]]) -> Result<(), FieldError> {
    let csv_err = |source| FieldError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for &[s, t, r] in coords {
        writer.serialize(TexRow { s, t, r }).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| csv_err(e.into()))?;
    Ok(())
}

/// Read an `s,t,r` table as bytes `floor(255 * v + 0.5)`.
pub fn read_texcoord_csv(path: &Path) -> Result<Vec<[u8; 3]>, FieldError> {
    let csv_err = |source| FieldError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize::<TexRow>()
        .map(|row| {
            let row = row.map_err(csv_err)?;
            Ok([row.s, row.t, row.r].map(to_byte))
        })
        .collect()
}

fn to_byte(v: f64) -> u8 {
    (255.0 * v + 0.5).floor() as u8
}

/// Write tables for the reference objects as `<prefix>_tex_<i>.csv` in `dir`.
#[instrument(skip(mesh), fields(vertices = mesh.vertex_count()))]
pub fn write_reference_tables(
    mesh: &Mesh,
    per_object: usize,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, FieldError> {
    let objects = object_count(mesh, per_object)?;
    reference_objects(objects)
        .iter()
        .enumerate()
        .map(|(i, &object)| {
            let coords = object_texcoords(mesh, object, per_object)?;
            let path = dir.join(format!("{}_tex_{}.csv", prefix, i));
            write_texcoord_csv(&path, &coords)?;
            debug!(object, path = %path.display(), "wrote texcoord table");
            Ok(path)
        })
        .collect()
}

/// Store `tables` on consecutive objects, cycling through the tables, as the
/// 3-component uchar array [`TEXCOORDS3D_ARRAY`].
pub fn assign_round_robin(
    mesh: &mut Mesh,
    per_object: usize,
    tables: &[Vec<[u8; 3]>],
) -> Result<(), FieldError> {
    if per_object == 0 {
        return Err(FieldError::ZeroObjectSize);
    }
    if tables.is_empty() {
        return Err(FieldError::NoTables);
    }
    if let Some((index, table)) = tables
        .iter()
        .enumerate()
        .find(|(_, t)| t.len() < per_object)
    {
        return Err(FieldError::TableLength {
            index,
            rows: table.len(),
            expected: per_object,
        });
    }

    let colors = (0..mesh.vertex_count())
        .map(|i| {
            let object = i / per_object;
            tables[object % tables.len()][i % per_object]
        })
        .collect();
    mesh.point_data
        .insert(ByteColorField(colors).into_array(TEXCOORDS3D_ARRAY));
    Ok(())
}
