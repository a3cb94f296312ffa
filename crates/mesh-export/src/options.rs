use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use field_derive::Normalizer;
use geometry_ops::PlyFormat;
use hcl_colormap::{ColorRampSpec, ColormapError, ColormapFormat, Hcl, DEFAULT_SAMPLES};
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;

/// Options for one mesh export.
///
/// Every field has a default, so option files may name only what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Scalar point array normalized into texcoord `s`.
    pub color_array_name: String,
    pub color_array_min: f64,
    pub color_array_max: f64,
    /// Export `texcoord_array_name` as the vertex color triplet.
    pub write_texcoords: bool,
    /// 3-component array written as `red green blue`.
    pub texcoord_array_name: Option<String>,
    /// 3-component array written as `nx ny nz`.
    pub normals_array_name: Option<String>,
    #[serde(alias = "write_colormap_image")]
    pub write_colormap_png: bool,
    pub colormap_filename: Option<PathBuf>,
    /// Inferred from the `colormap_filename` extension when unset.
    pub colormap_format: Option<ColormapFormat>,
    pub colormap_samples: usize,
    pub colormap_hcl_start: Hcl,
    pub colormap_hcl_end: Hcl,
    /// Sample the ramp per vertex and write it as vertex colors. Ignored
    /// when `write_texcoords` already supplies the colors.
    pub bake_vertex_colors: bool,
    pub format: PlyFormat,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            color_array_name: "forceMag".to_string(),
            color_array_min: 0.0,
            color_array_max: 1.0,
            write_texcoords: false,
            texcoord_array_name: None,
            normals_array_name: None,
            write_colormap_png: false,
            colormap_filename: None,
            colormap_format: None,
            colormap_samples: DEFAULT_SAMPLES,
            colormap_hcl_start: Hcl::new(0.0, 0.0, 0.0),
            colormap_hcl_end: Hcl::new(0.0, 0.0, 100.0),
            bake_vertex_colors: false,
            format: PlyFormat::default(),
        }
    }
}

impl WriteOptions {
    /// Check every option that can be checked without touching the disk.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.color_array_name.trim().is_empty() {
            return Err(ExportError::invalid("color_array_name", "must not be empty"));
        }
        self.normalizer()?;
        if self.write_texcoords && self.texcoord_name().is_none() {
            return Err(ExportError::invalid(
                "texcoord_array_name",
                "required when write_texcoords is set",
            ));
        }
        if matches!(&self.normals_array_name, Some(n) if n.trim().is_empty()) {
            return Err(ExportError::invalid("normals_array_name", "must not be empty"));
        }
        if self.write_colormap_png {
            self.colormap_target()?;
        }
        if self.write_colormap_png || self.bake_vertex_colors {
            self.ramp_spec().validate()?;
        }
        Ok(())
    }

    pub fn normalizer(&self) -> Result<Normalizer, ExportError> {
        Ok(Normalizer::new(self.color_array_min, self.color_array_max)?)
    }

    pub fn ramp_spec(&self) -> ColorRampSpec {
        ColorRampSpec::new(self.colormap_hcl_start, self.colormap_hcl_end)
            .with_samples(self.colormap_samples)
    }

    /// Name of the exported color triplet when `write_texcoords` is set.
    pub fn texcoord_name(&self) -> Option<&str> {
        self.texcoord_array_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
    }

    /// Colormap path and its resolved format.
    pub fn colormap_target(&self) -> Result<(&Path, ColormapFormat), ExportError> {
        let path = self
            .colormap_filename
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                ExportError::invalid("colormap_filename", "required when write_colormap_png is set")
            })?;
        let format = match self.colormap_format {
            Some(f) => f,
            None => ColormapFormat::from_path(path).ok_or_else(|| ColormapError::UnknownFormat {
                path: path.to_path_buf(),
            })?,
        };
        Ok((path, format))
    }

    /// Whether the ramp is baked into vertex colors for this export.
    pub fn bakes_colors(&self) -> bool {
        self.bake_vertex_colors && !self.write_texcoords
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("WriteOptions serialization should never fail")
    }
}

/// Read options from a JSON file.
pub fn load_options(path: &Path) -> Result<WriteOptions, ExportError> {
    let text = fs::read_to_string(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| ExportError::Options {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Option sets for red blood cell, circulating tumor cell and streamline
/// exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Red blood cells: force magnitude, dark red-purple to gold.
    Rbc,
    /// Circulating tumor cells: force magnitude, dark teal to yellow-green.
    Ctc,
    /// Flow streamlines: velocity magnitude, dark purple to light blue.
    Streamline,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Rbc, Preset::Ctc, Preset::Streamline];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Rbc => "rbc",
            Preset::Ctc => "ctc",
            Preset::Streamline => "streamline",
        }
    }

    /// Preset options with the colormap written next to `output`.
    pub fn options_for(self, output: &Path) -> WriteOptions {
        let dir = output.parent().unwrap_or_else(|| Path::new(""));
        let colormap = dir.join(format!("{}_colormap.png", self.name()));
        let base = WriteOptions {
            write_colormap_png: true,
            colormap_filename: Some(colormap),
            colormap_format: Some(ColormapFormat::Png),
            ..WriteOptions::default()
        };
        match self {
            Preset::Rbc => WriteOptions {
                color_array_name: "forceMag".to_string(),
                color_array_max: 0.0018,
                write_texcoords: true,
                texcoord_array_name: Some("texCoords3dAsColor".to_string()),
                colormap_hcl_start: Hcl::new(5.2, 64.5, 22.0),
                colormap_hcl_end: Hcl::new(62.9, 97.2, 80.9),
                ..base
            },
            Preset::Ctc => WriteOptions {
                color_array_name: "forceMag".to_string(),
                color_array_max: 0.0010,
                write_texcoords: true,
                texcoord_array_name: Some("texCoords3dAsColor".to_string()),
                colormap_hcl_start: Hcl::new(177.0, 26.4, 22.2),
                colormap_hcl_end: Hcl::new(116.7, 116.7, 84.1),
                ..base
            },
            Preset::Streamline => WriteOptions {
                color_array_name: "velocityMag".to_string(),
                color_array_max: 0.025,
                colormap_hcl_start: Hcl::new(295.3, 61.0, 28.2),
                colormap_hcl_end: Hcl::new(239.8, 84.8, 55.6),
                ..base
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ExportError::invalid("preset", format!("unknown preset {:?} (rbc, ctc, streamline)", s))
            })
    }
}
