//! Mesh + colormap export.
//!
//! Steps run strictly in order: validate → triangulate → normalize →
//! colormap → serialize → header rename. Nothing touches the disk until
//! every option and attribute name has been checked.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use field_derive::ObservedRange;
use geometry_ops::{point_array, GeometryError, GeometryOps, SerializeRequest};
use hcl_colormap::{generate_ramp, write_colormap, ColorImage};
use mesh_types::{ByteColorField, Mesh};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::errors::ExportError;
use crate::header::{rename_header_fields, TEXCOORD_RENAMES};
use crate::options::WriteOptions;

/// Point array holding the normalized `(s, 0.5)` texture coordinates.
pub const TEXCOORD_ARRAY: &str = "texCoords";

/// Point array holding colors sampled from the ramp.
pub const BAKED_COLOR_ARRAY: &str = "rampColors";

/// What an export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub output: PathBuf,
    pub colormap: Option<PathBuf>,
    pub vertices: usize,
    pub triangles: usize,
    /// Whether the mesh had to be triangulated first.
    pub triangulated: bool,
    /// True `[min, max]` of the color array.
    pub observed: Option<ObservedRange>,
    /// `name: [min, max]` line for operators tuning the range.
    pub diagnostic: String,
    /// Vertices whose color value was NaN.
    pub nan_values: usize,
    pub gamut_warnings: usize,
    pub baked_colors: bool,
    /// Header lines renamed from `u`/`v` to `s`/`t`.
    pub renamed_fields: usize,
}

/// Writes meshes through a geometry collaborator.
#[derive(Debug, Default)]
pub struct MeshAttributeWriter<G> {
    geometry: G,
}

impl<G: GeometryOps> MeshAttributeWriter<G> {
    pub fn new(geometry: G) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn into_inner(self) -> G {
        self.geometry
    }

    /// Export `mesh` to `output`, and the colormap image if requested.
    ///
    /// The texture-coordinate array is attached to `mesh`; it is otherwise
    /// left untouched.
    #[instrument(skip(self, mesh, options), fields(vertices = mesh.vertex_count()))]
    pub fn write(
        &mut self,
        mesh: &mut Mesh,
        options: &WriteOptions,
        output: &Path,
    ) -> Result<ExportReport, ExportError> {
        options.validate()?;
        check_attributes(mesh, options)?;
        let normalizer = options.normalizer()?;

        let triangulated = if mesh.is_triangulated() {
            None
        } else {
            debug!(polys = mesh.poly_count(), strips = mesh.strips.len(), "triangulating");
            Some(self.geometry.triangulate(mesh)?)
        };
        let was_triangulated = triangulated.is_some();

        let scalars = self.geometry.scalar_field(
            triangulated.as_ref().unwrap_or(&*mesh),
            &options.color_array_name,
        )?;
        let normalized = normalizer.normalize_field(&scalars);
        let diagnostic = normalized.diagnostic(&options.color_array_name);
        info!(
            array = %options.color_array_name,
            min = normalized.observed.map(|r| r.min),
            max = normalized.observed.map(|r| r.max),
            "{}",
            diagnostic
        );
        if normalized.nan_count > 0 {
            warn!(count = normalized.nan_count, "NaN color values passed through");
        }

        let texcoords = normalized.texcoords().into_array(TEXCOORD_ARRAY);
        mesh.point_data.insert(texcoords.clone());
        let mut working: Cow<'_, Mesh> = match triangulated {
            Some(mut t) => {
                t.point_data.insert(texcoords);
                Cow::Owned(t)
            }
            None => Cow::Borrowed(&*mesh),
        };

        ensure_dir_writable(output)?;

        let ramp = if options.write_colormap_png || options.bakes_colors() {
            Some(generate_ramp(&options.ramp_spec())?)
        } else {
            None
        };
        let gamut_warnings = ramp.as_ref().map_or(0, |r| r.warnings.len());

        let mut colormap = None;
        if let (true, Some(ramp)) = (options.write_colormap_png, &ramp) {
            let (path, format) = options.colormap_target()?;
            write_colormap(ramp, path, format)?;
            colormap = Some(path.to_path_buf());
        }

        let baked_colors = match (&ramp, options.bakes_colors()) {
            (Some(ramp), true) => {
                let colors = bake_colors(ramp, &normalized.values);
                working.to_mut().point_data.insert(colors.into_array(BAKED_COLOR_ARRAY));
                true
            }
            _ => false,
        };
        if options.bake_vertex_colors && !baked_colors {
            debug!("texcoord colors exported, skipping baked colors");
        }

        let request = serialize_request(options, baked_colors);
        self.geometry
            .serialize_binary_mesh(&working, &request, output)
            .map_err(|e| ExportError::Serialization {
                path: output.to_path_buf(),
                source: e,
            })?;

        let renamed_fields = rename_header_fields(output, TEXCOORD_RENAMES)?;
        if renamed_fields != TEXCOORD_RENAMES.len() {
            warn!(renamed_fields, "texcoord header lines not all found");
        }

        let report = ExportReport {
            output: output.to_path_buf(),
            colormap,
            vertices: working.vertex_count(),
            triangles: working.poly_count(),
            triangulated: was_triangulated,
            observed: normalized.observed,
            diagnostic,
            nan_values: normalized.nan_count,
            gamut_warnings,
            baked_colors,
            renamed_fields,
        };
        info!(
            output = %output.display(),
            vertices = report.vertices,
            triangles = report.triangles,
            "export complete"
        );
        Ok(report)
    }
}

/// One-shot export through `geometry`.
pub fn write_mesh<G: GeometryOps>(
    geometry: &mut G,
    mesh: &mut Mesh,
    options: &WriteOptions,
    output: &Path,
) -> Result<ExportReport, ExportError> {
    MeshAttributeWriter::new(geometry).write(mesh, options, output)
}

/// Every attribute the export reads must exist with the right shape.
fn check_attributes(mesh: &Mesh, options: &WriteOptions) -> Result<(), ExportError> {
    let lookup = |name: &str, components: usize| -> Result<(), ExportError> {
        let array = point_array(mesh, name).map_err(|e| match e {
            GeometryError::MissingAttribute { name } => ExportError::MissingAttribute { name },
            other => other.into(),
        })?;
        if array.components != components {
            return Err(ExportError::InvalidOption {
                option: "point array",
                reason: format!(
                    "{} has {} components, expected {}",
                    name, array.components, components
                ),
            });
        }
        Ok(())
    };

    lookup(&options.color_array_name, 1)?;
    if options.write_texcoords {
        if let Some(name) = options.texcoord_name() {
            lookup(name, 3)?;
        }
    }
    if let Some(name) = &options.normals_array_name {
        lookup(name, 3)?;
    }
    Ok(())
}

/// Fail early with a serialization error if nothing can be created next to
/// `output`. The scratch file removes itself on drop.
fn ensure_dir_writable(output: &Path) -> Result<(), ExportError> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    NamedTempFile::new_in(dir)
        .map(drop)
        .map_err(|e| ExportError::Serialization {
            path: output.to_path_buf(),
            source: GeometryError::Write {
                path: output.to_path_buf(),
                source: e,
            },
        })
}

fn bake_colors(ramp: &ColorImage, values: &[f64]) -> ByteColorField {
    ByteColorField(values.iter().map(|&s| ramp.lookup(s)).collect())
}

fn serialize_request(options: &WriteOptions, baked_colors: bool) -> SerializeRequest {
    let mut request = SerializeRequest::new(options.format).with_texcoords(TEXCOORD_ARRAY);
    if let Some(normals) = &options.normals_array_name {
        request = request.with_normals(normals.as_str());
    }
    if options.write_texcoords {
        if let Some(name) = options.texcoord_name() {
            request = request.with_colors(name);
        }
    } else if baked_colors {
        request = request.with_colors(BAKED_COLOR_ARRAY);
    }
    request
}
