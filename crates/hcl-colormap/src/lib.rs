//! Perceptual color ramps for 1-D colormap textures.
//!
//! [`hcl_to_rgb`] converts a hue/chroma/luminance triple to gamma-encoded
//! RGB. [`generate_ramp`] samples a ramp between two HCL endpoints and
//! [`write_colormap`] persists the result as a single-row PNG or PPM raster.

pub mod errors;
pub mod hcl;
pub mod ramp;
pub mod raster;

pub use errors::ColormapError;
pub use hcl::{hcl_to_rgb, Hcl, Rgb};
pub use ramp::{generate_ramp, ColorImage, ColorRampSpec, GamutWarning, DEFAULT_SAMPLES};
pub use raster::{write_colormap, ColormapFormat};
