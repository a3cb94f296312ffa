//! Per-vertex field derivation: forces from strain tensors, scalar
//! normalization into texture coordinates, and per-object 3-D texture
//! coordinates.

pub mod errors;
pub mod force;
pub mod normalize;
pub mod texcoords3d;

pub use errors::FieldError;
pub use force::{attach_force, derive_force, derive_force_field, Force, ForceArrays, ForceField};
pub use normalize::{normalize, NormalizedField, Normalizer, ObservedRange, TEXCOORD_T};
pub use texcoords3d::TEXCOORDS3D_ARRAY;
