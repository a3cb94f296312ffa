//! Batch exports described in a JSON plan file.
//!
//! A plan is a JSON array of jobs:
//!
//! ```json
//! [
//!   { "input": "rbc.vtk", "output": "rbc.ply", "preset": "rbc", "derive_force": true },
//!   { "input": "flow.vtk", "output": "flow.ply", "options": { "color_array_name": "velocityMag" } }
//! ]
//! ```
//!
//! Relative paths are resolved against the plan file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use field_derive::{attach_force, ForceArrays};
use geometry_ops::{GeometryOps, MeshSource};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::ExportError;
use crate::options::{Preset, WriteOptions};
use crate::writer::{write_mesh, ExportReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Explicit options; take precedence over `preset`.
    #[serde(default)]
    pub options: Option<WriteOptions>,
    #[serde(default)]
    pub preset: Option<Preset>,
    /// Derive `force`/`forceMag` from `Strain` and `Normals` before export.
    #[serde(default)]
    pub derive_force: bool,
}

impl ExportJob {
    pub fn resolved_options(&self) -> WriteOptions {
        match (&self.options, self.preset) {
            (Some(options), _) => options.clone(),
            (None, Some(preset)) => preset.options_for(&self.output),
            (None, None) => WriteOptions::default(),
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.input);
        join(&mut self.output);
        if let Some(colormap) = self
            .options
            .as_mut()
            .and_then(|o| o.colormap_filename.as_mut())
        {
            join(colormap);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportPlan {
    pub jobs: Vec<ExportJob>,
}

pub fn load_plan(path: &Path) -> Result<ExportPlan, ExportError> {
    let text = fs::read_to_string(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut plan: ExportPlan = serde_json::from_str(&text).map_err(|e| ExportError::Options {
        path: path.to_path_buf(),
        source: e,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for job in &mut plan.jobs {
        job.resolve_paths(base);
    }
    Ok(plan)
}

/// Read the job's input mesh, optionally derive forces, and export it.
#[instrument(skip(geometry), fields(input = %job.input.display()))]
pub fn run_job<G: GeometryOps + MeshSource>(
    geometry: &mut G,
    job: &ExportJob,
) -> Result<ExportReport, ExportError> {
    let options = job.resolved_options();
    options.validate()?;

    let mut mesh = geometry.read_mesh(&job.input)?;
    if job.derive_force {
        let non_finite = attach_force(&*geometry, &mut mesh, &ForceArrays::default())?;
        if non_finite > 0 {
            warn!(non_finite, "force field has non-finite values");
        }
    }
    write_mesh(geometry, &mut mesh, &options, &job.output)
}

/// Run every job in order, stopping at the first failure.
pub fn run_plan<G: GeometryOps + MeshSource>(
    geometry: &mut G,
    plan: &ExportPlan,
) -> Result<Vec<ExportReport>, ExportError> {
    let reports = plan
        .jobs
        .iter()
        .map(|job| run_job(geometry, job))
        .collect::<Result<Vec<_>, _>>()?;
    info!(jobs = reports.len(), "plan complete");
    Ok(reports)
}
