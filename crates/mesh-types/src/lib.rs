//! Shared data model for the force-field export pipeline.
//!
//! A [`Mesh`] is a list of vertex positions, polygonal cells and a set of
//! named per-vertex attribute arrays ([`PointData`]). Typed views such as
//! [`ScalarField`] or [`TensorField`] are extracted from, and attached back
//! to, those arrays.

pub mod attributes;
pub mod fields;
pub mod mesh;

pub use attributes::*;
pub use fields::*;
pub use mesh::*;
