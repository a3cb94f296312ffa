//! Colormap-driven mesh export.
//!
//! [`MeshAttributeWriter`] normalizes a scalar point array into texture
//! coordinates, writes the matching colormap image, serializes the mesh
//! through a [`geometry_ops::GeometryOps`] collaborator and finally renames
//! the generic `u`/`v` texcoord properties in the PLY header to `s`/`t`.

pub mod errors;
pub mod header;
pub mod options;
pub mod plan;
pub mod writer;

pub use errors::ExportError;
pub use header::{rename_header_fields, TEXCOORD_RENAMES};
pub use options::{load_options, Preset, WriteOptions};
pub use plan::{load_plan, run_job, run_plan, ExportJob, ExportPlan};
pub use writer::{write_mesh, ExportReport, MeshAttributeWriter, BAKED_COLOR_ARRAY, TEXCOORD_ARRAY};
