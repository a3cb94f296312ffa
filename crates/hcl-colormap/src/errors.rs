use std::path::PathBuf;

/// Errors from ramp generation and colormap output.
#[derive(Debug, thiserror::Error)]
pub enum ColormapError {
    #[error("colormap sample count must be at least 1")]
    ZeroSamples,

    #[error("non-finite HCL endpoint: [{hue}, {chroma}, {luminance}]")]
    NonFiniteEndpoint {
        hue: f64,
        chroma: f64,
        luminance: f64,
    },

    #[error("cannot infer colormap format from {path}")]
    UnknownFormat { path: PathBuf },

    #[error("failed to encode colormap {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
