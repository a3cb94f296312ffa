//! Single-row colormap rasters.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ColormapError;
use crate::ramp::ColorImage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapFormat {
    #[default]
    Png,
    /// Binary `P6` portable pixmap, encoded by `image`'s PNM codec.
    Ppm,
}

impl ColormapFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ColormapFormat::Png),
            "ppm" => Some(ColormapFormat::Ppm),
            _ => None,
        }
    }
}

/// Write `ramp` as a `width x 1` raster at `path`.
#[instrument(skip(ramp), fields(width = ramp.width()))]
pub fn write_colormap(
    ramp: &ColorImage,
    path: &Path,
    format: ColormapFormat,
) -> Result<(), ColormapError> {
    let image_format = match format {
        ColormapFormat::Png => ImageFormat::Png,
        ColormapFormat::Ppm => ImageFormat::Pnm,
    };
    let raster = RgbImage::from_fn(ramp.width() as u32, 1, |x, _| {
        image::Rgb(ramp.pixels[x as usize])
    });
    raster
        .save_with_format(path, image_format)
        .map_err(|e| ColormapError::Encode {
            path: path.to_path_buf(),
            source: e,
        })?;
    info!(path = %path.display(), ?format, "wrote colormap");
    Ok(())
}
