use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::errors::ColormapError;
use crate::hcl::{Hcl, Rgb};

/// Default ramp width.
pub const DEFAULT_SAMPLES: usize = 1024;

/// Two HCL endpoints and a sample count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRampSpec {
    pub start: Hcl,
    pub end: Hcl,
    #[serde(default = "default_samples")]
    pub samples: usize,
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

impl ColorRampSpec {
    pub fn new(start: Hcl, end: Hcl) -> Self {
        Self {
            start,
            end,
            samples: DEFAULT_SAMPLES,
        }
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn validate(&self) -> Result<(), ColormapError> {
        if self.samples == 0 {
            return Err(ColormapError::ZeroSamples);
        }
        for c in [self.start, self.end] {
            if !c.is_finite() {
                return Err(ColormapError::NonFiniteEndpoint {
                    hue: c.hue,
                    chroma: c.chroma,
                    luminance: c.luminance,
                });
            }
        }
        Ok(())
    }

    /// Ramp position of sample `index`. A single-sample ramp sits at 0.
    pub fn position(&self, index: usize) -> f64 {
        if self.samples <= 1 {
            0.0
        } else {
            index as f64 / (self.samples - 1) as f64
        }
    }
}

/// A sample whose RGB fell outside [0, 1] before quantization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamutWarning {
    pub index: usize,
    pub t: f64,
    pub rgb: Rgb,
}

/// Quantized ramp samples plus any gamut warnings raised while building them.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorImage {
    pub pixels: Vec<[u8; 3]>,
    pub warnings: Vec<GamutWarning>,
}

impl ColorImage {
    pub fn width(&self) -> usize {
        self.pixels.len()
    }

    /// Color the texture would show at coordinate `s` (nearest sample).
    /// `s` is clamped to [0, 1]; NaN reads the first sample.
    pub fn lookup(&self, s: f64) -> [u8; 3] {
        let Some(last) = self.pixels.len().checked_sub(1) else {
            return [0, 0, 0];
        };
        let s = if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) };
        self.pixels[(s * last as f64).round() as usize]
    }

    /// Pixels flattened row-major as `r g b r g b ...`.
    pub fn as_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }
}

/// Sample `spec.samples` colors between the endpoints and quantize them.
///
/// Out-of-gamut samples are logged and recorded, then clamped.
#[instrument(skip(spec), fields(samples = spec.samples))]
pub fn generate_ramp(spec: &ColorRampSpec) -> Result<ColorImage, ColormapError> {
    spec.validate()?;

    let colors: Vec<Rgb> = (0..spec.samples)
        .into_par_iter()
        .map(|i| spec.start.lerp(&spec.end, spec.position(i)).to_rgb())
        .collect();

    let mut warnings = Vec::new();
    for (index, rgb) in colors.iter().enumerate() {
        if !rgb.in_gamut() {
            let t = spec.position(index);
            warn!(
                index,
                t,
                r = rgb.r,
                g = rgb.g,
                b = rgb.b,
                "colormap sample out of gamut, clamping"
            );
            warnings.push(GamutWarning {
                index,
                t,
                rgb: *rgb,
            });
        }
    }

    let pixels = colors.iter().map(Rgb::to_bytes).collect();
    debug!(out_of_gamut = warnings.len(), "generated color ramp");
    Ok(ColorImage { pixels, warnings })
}
