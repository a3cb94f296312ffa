//! Geometry-processing collaborator used by the export pipeline.
//!
//! The pipeline only talks to [`GeometryOps`]. [`NativeGeometry`] is the
//! in-tree implementation (fan triangulation, `ply-rs` writer, `vtkio` reader);
//! [`MockGeometry`] is a recording test double.

pub mod interp;
pub mod mock;
pub mod native;
pub mod ply;
pub mod traits;
pub mod triangulate;
pub mod types;
pub mod vtk;

pub use mock::{MockCall, MockGeometry};
pub use native::NativeGeometry;
pub use traits::*;
pub use types::*;
