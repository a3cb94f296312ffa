//! HCL (polar CIE Luv) to gamma-encoded RGB.
//!
//! The conversion goes HCL → Luv → XYZ (D65 white) → linear RGB through the
//! Adobe RGB (1998) inverse matrix, then applies a 1/2.2 power law. Results
//! are not clamped; see [`Rgb::in_gamut`] and [`Rgb::to_bytes`].

use serde::{Deserialize, Serialize};

/// D65 reference white in XYZ.
const WHITE: [f64; 3] = [0.9504, 1.0, 1.0888];
const KAPPA: f64 = 903.3;
const EPSILON: f64 = 0.008856;
const GAMMA: f64 = 2.2;

/// XYZ → linear RGB, Adobe RGB (1998) primaries.
const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [2.0413690, -0.5649464, -0.3446944],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0134474, -0.1183897, 1.0154096],
];

/// A color in hue (degrees), chroma and luminance.
///
/// Serialized as a `[h, c, l]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Hcl {
    pub hue: f64,
    pub chroma: f64,
    pub luminance: f64,
}

impl Hcl {
    pub fn new(hue: f64, chroma: f64, luminance: f64) -> Self {
        Self {
            hue,
            chroma,
            luminance,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.hue.is_finite() && self.chroma.is_finite() && self.luminance.is_finite()
    }

    /// Componentwise linear interpolation; `t = 0` gives `self`.
    pub fn lerp(&self, other: &Hcl, t: f64) -> Hcl {
        let mix = |a: f64, b: f64| (1.0 - t) * a + t * b;
        Hcl {
            hue: mix(self.hue, other.hue),
            chroma: mix(self.chroma, other.chroma),
            luminance: mix(self.luminance, other.luminance),
        }
    }

    pub fn to_rgb(&self) -> Rgb {
        hcl_to_rgb(self.hue, self.chroma, self.luminance)
    }
}

impl From<[f64; 3]> for Hcl {
    fn from([hue, chroma, luminance]: [f64; 3]) -> Self {
        Hcl::new(hue, chroma, luminance)
    }
}

impl From<Hcl> for [f64; 3] {
    fn from(c: Hcl) -> Self {
        [c.hue, c.chroma, c.luminance]
    }
}

/// Gamma-encoded RGB, nominally in [0, 1] per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// True when every channel lies in [0, 1].
    pub fn in_gamut(&self) -> bool {
        self.channels().iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// Quantize with `round(255 * clamp(c, 0, 1))`. NaN maps to 0.
    pub fn to_bytes(&self) -> [u8; 3] {
        self.channels().map(quantize)
    }
}

fn quantize(c: f64) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (255.0 * c.clamp(0.0, 1.0)).round() as u8
}

fn encode_gamma(c: f64) -> f64 {
    c.signum() * c.abs().powf(1.0 / GAMMA)
}

/// Convert hue (degrees), chroma and luminance to gamma-encoded RGB.
///
/// Hue is taken modulo 360. Luminance at or below zero yields black.
/// Channels may fall outside [0, 1] for colors the RGB space cannot reach.
pub fn hcl_to_rgb(hue: f64, chroma: f64, luminance: f64) -> Rgb {
    let l = luminance;
    if l <= 0.0 {
        return Rgb {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        };
    }

    let mut h = hue.rem_euclid(360.0);
    if h >= 360.0 {
        h = 0.0;
    }
    let h = h.to_radians();
    let u = chroma * h.cos();
    let v = chroma * h.sin();

    let [wx, wy, wz] = WHITE;
    let denom = wx + 15.0 * wy + 3.0 * wz;
    let u0 = 4.0 * wx / denom;
    let v0 = 9.0 * wy / denom;

    let y = if l > KAPPA * EPSILON {
        ((l + 16.0) / 116.0).powi(3)
    } else {
        l / KAPPA
    };

    let a = (52.0 * l / (u + 13.0 * l * u0) - 1.0) / 3.0;
    let b = -5.0 * y;
    let c = -1.0 / 3.0;
    let d = y * (39.0 * l / (v + 13.0 * l * v0) - 5.0);
    let x = (d - b) / (a - c);
    let z = x * a + b;

    let [r, g, bl] = XYZ_TO_RGB.map(|m| x * m[0] + y * m[1] + z * m[2]);
    Rgb {
        r: encode_gamma(r),
        g: encode_gamma(g),
        b: encode_gamma(bl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn zero_luminance_is_black() {
        assert_eq!(hcl_to_rgb(120.0, 40.0, 0.0).to_bytes(), [0, 0, 0]);
        assert_eq!(hcl_to_rgb(0.0, 0.0, -5.0).to_bytes(), [0, 0, 0]);
    }

    #[test]
    fn mid_luminance_gray() {
        let rgb = hcl_to_rgb(0.0, 0.0, 50.0);
        for c in rgb.channels() {
            assert_relative_eq!(c, 0.4635, epsilon = 2e-3);
        }
        assert!(rgb.in_gamut());
        for byte in rgb.to_bytes() {
            assert!((117..=119).contains(&byte));
        }
    }

    #[test]
    fn full_luminance_is_white() {
        let rgb = hcl_to_rgb(0.0, 0.0, 100.0);
        for c in rgb.channels() {
            assert_relative_eq!(c, 1.0, epsilon = 1e-3);
        }
        assert_eq!(rgb.to_bytes(), [255, 255, 255]);
    }

    #[test]
    fn low_luminance_uses_linear_segment() {
        // L = 5 is below kappa * epsilon (about 8), so Y = L / kappa.
        let rgb = hcl_to_rgb(0.0, 0.0, 5.0);
        let expected = (5.0 / KAPPA).powf(1.0 / GAMMA);
        for c in rgb.channels() {
            assert_relative_eq!(c, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn negative_hue_wraps() {
        let a = hcl_to_rgb(-90.0, 30.0, 60.0);
        let b = hcl_to_rgb(270.0, 30.0, 60.0);
        assert_relative_eq!(a.r, b.r, epsilon = 1e-12);
        assert_relative_eq!(a.g, b.g, epsilon = 1e-12);
        assert_relative_eq!(a.b, b.b, epsilon = 1e-12);
    }

    #[test]
    fn saturated_color_leaves_gamut_and_clamps() {
        let rgb = hcl_to_rgb(0.0, 500.0, 50.0);
        assert!(!rgb.in_gamut());
        assert!(rgb.r > 1.0);
        assert!(rgb.g < 0.0);
        let bytes = rgb.to_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes[1], 0);
    }

    #[test]
    fn hcl_serializes_as_triple() {
        let c = Hcl::new(10.0, 20.0, 30.0);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[10.0,20.0,30.0]");
        let back: Hcl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    proptest! {
        #[test]
        fn hue_is_periodic(h in -720.0f64..720.0, c in 0.0f64..40.0, l in 20.0f64..100.0) {
            let a = hcl_to_rgb(h, c, l);
            let b = hcl_to_rgb(h + 360.0, c, l);
            prop_assert!((a.r - b.r).abs() < 1e-6);
            prop_assert!((a.g - b.g).abs() < 1e-6);
            prop_assert!((a.b - b.b).abs() < 1e-6);
        }

        #[test]
        fn zero_chroma_ignores_hue(h1 in 0.0f64..360.0, h2 in 0.0f64..360.0, l in 0.0f64..100.0) {
            let a = hcl_to_rgb(h1, 0.0, l);
            let b = hcl_to_rgb(h2, 0.0, l);
            prop_assert!((a.r - b.r).abs() < 1e-9);
            prop_assert!((a.g - b.g).abs() < 1e-9);
            prop_assert!((a.b - b.b).abs() < 1e-9);
        }
    }
}
