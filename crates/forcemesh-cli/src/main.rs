//! `forcemesh`: export simulation meshes as colormapped PLY files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use field_derive::texcoords3d::{assign_round_robin, read_texcoord_csv, write_reference_tables};
use field_derive::{attach_force, ForceArrays};
use geometry_ops::interp::{interpolate_files, KeyframeBlend};
use geometry_ops::{MeshSource, NativeGeometry, PlyFormat};
use hcl_colormap::{generate_ramp, write_colormap, ColorRampSpec, ColormapFormat, Hcl};
use mesh_export::{load_options, load_plan, run_plan, write_mesh, ExportReport, Preset, WriteOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forcemesh")]
#[command(about = "Force-field derivation and colormapped PLY export", long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `mesh_export=trace`. Defaults to RUST_LOG, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a legacy VTK polydata file as PLY plus colormap
    Export {
        input: PathBuf,
        output: PathBuf,
        /// JSON options file
        #[arg(long, conflicts_with = "preset")]
        options: Option<PathBuf>,
        /// Built-in options: rbc, ctc or streamline
        #[arg(long, value_parser = parse_preset)]
        preset: Option<Preset>,
        /// Derive force/forceMag from the Strain and Normals arrays first
        #[arg(long)]
        derive_force: bool,
        /// Override the PLY encoding
        #[arg(long, value_parser = parse_ply_format)]
        format: Option<PlyFormat>,
        /// s,t,r texture coordinate tables assigned round-robin to objects
        #[arg(long = "tex-table")]
        tex_tables: Vec<PathBuf>,
        /// Vertices per object, required with --tex-table
        #[arg(long)]
        vertices_per_object: Option<usize>,
    },
    /// Run every export in a JSON plan file
    Plan { plan: PathBuf },
    /// Write only a colormap image
    Colormap {
        output: PathBuf,
        /// Start color as h,c,l
        #[arg(long, value_parser = parse_hcl)]
        start: Hcl,
        /// End color as h,c,l
        #[arg(long, value_parser = parse_hcl)]
        end: Hcl,
        #[arg(long, default_value_t = hcl_colormap::DEFAULT_SAMPLES)]
        samples: usize,
        /// png or ppm; inferred from the extension when omitted
        #[arg(long, value_parser = parse_colormap_format)]
        format: Option<ColormapFormat>,
    },
    /// Interpolate point positions between two key-frame VTK files
    Interp {
        frame0: PathBuf,
        frame1: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value_t = 0.5)]
        t: f64,
        /// Points that moved farther than this keep their first-frame position
        #[arg(long, default_value_t = 9.9e12)]
        max_distance: f64,
    },
    /// Write per-object 3-D texture coordinate tables for reference objects
    Texcoords {
        input: PathBuf,
        #[arg(long)]
        vertices_per_object: usize,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, default_value = "tex")]
        prefix: String,
    },
    /// Print a preset's options as JSON
    Preset {
        #[arg(value_parser = parse_preset)]
        name: Preset,
        /// Output path the colormap location is derived from
        #[arg(long, default_value = "out.ply")]
        output: PathBuf,
    },
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    s.parse().map_err(|e: mesh_export::ExportError| e.to_string())
}

fn parse_hcl(s: &str) -> Result<Hcl, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("expected h,c,l: {}", e))?;
    match parts.as_slice() {
        &[h, c, l] => Ok(Hcl::new(h, c, l)),
        _ => Err(format!("expected 3 comma-separated numbers, got {}", parts.len())),
    }
}

fn parse_ply_format(s: &str) -> Result<PlyFormat, String> {
    match s {
        "ascii" => Ok(PlyFormat::Ascii),
        "binary_little_endian" | "binary" => Ok(PlyFormat::BinaryLittleEndian),
        "binary_big_endian" => Ok(PlyFormat::BinaryBigEndian),
        other => Err(format!(
            "unknown PLY format {:?} (ascii, binary_little_endian, binary_big_endian)",
            other
        )),
    }
}

fn parse_colormap_format(s: &str) -> Result<ColormapFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "png" => Ok(ColormapFormat::Png),
        "ppm" => Ok(ColormapFormat::Ppm),
        other => Err(format!("unknown colormap format {:?} (png, ppm)", other)),
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_report(report: &ExportReport) {
    println!("{}", report.diagnostic);
    if report.gamut_warnings > 0 {
        warn!(
            samples = report.gamut_warnings,
            "colormap endpoints reach outside the RGB gamut"
        );
    }
    if report.nan_values > 0 {
        warn!(vertices = report.nan_values, "color array contains NaN");
    }
}

fn resolve_options(
    options: Option<&Path>,
    preset: Option<Preset>,
    output: &Path,
) -> Result<WriteOptions> {
    Ok(match (options, preset) {
        (Some(path), _) => load_options(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        (None, Some(preset)) => preset.options_for(output),
        (None, None) => WriteOptions::default(),
    })
}

#[allow(clippy::too_many_arguments)]
fn export(
    input: &Path,
    output: &Path,
    options: Option<&Path>,
    preset: Option<Preset>,
    derive_force: bool,
    format: Option<PlyFormat>,
    tex_tables: &[PathBuf],
    vertices_per_object: Option<usize>,
) -> Result<()> {
    let mut options = resolve_options(options, preset, output)?;
    if let Some(format) = format {
        options.format = format;
    }
    options.validate().context("invalid export options")?;

    let mut geometry = NativeGeometry::new();
    let mut mesh = geometry
        .read_mesh(input)
        .with_context(|| format!("reading {}", input.display()))?;

    if !tex_tables.is_empty() {
        let Some(per_object) = vertices_per_object else {
            bail!("--tex-table requires --vertices-per-object");
        };
        let tables = tex_tables
            .iter()
            .map(|p| read_texcoord_csv(p).with_context(|| format!("reading {}", p.display())))
            .collect::<Result<Vec<_>>>()?;
        assign_round_robin(&mut mesh, per_object, &tables)?;
    }

    if derive_force {
        let non_finite = attach_force(&geometry, &mut mesh, &ForceArrays::default())
            .context("deriving force field")?;
        if non_finite > 0 {
            warn!(vertices = non_finite, "force field has non-finite values");
        }
    }

    let report = write_mesh(&mut geometry, &mut mesh, &options, output)
        .with_context(|| format!("exporting {}", output.display()))?;
    print_report(&report);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Export {
            input,
            output,
            options,
            preset,
            derive_force,
            format,
            tex_tables,
            vertices_per_object,
        } => export(
            &input,
            &output,
            options.as_deref(),
            preset,
            derive_force,
            format,
            &tex_tables,
            vertices_per_object,
        )?,
        Commands::Plan { plan } => {
            let plan = load_plan(&plan).with_context(|| format!("loading plan {}", plan.display()))?;
            let reports = run_plan(&mut NativeGeometry::new(), &plan)?;
            for report in &reports {
                print_report(report);
            }
        }
        Commands::Colormap {
            output,
            start,
            end,
            samples,
            format,
        } => {
            let format = match format.or_else(|| ColormapFormat::from_path(&output)) {
                Some(f) => f,
                None => bail!("cannot infer colormap format from {}", output.display()),
            };
            let ramp = generate_ramp(&ColorRampSpec::new(start, end).with_samples(samples))?;
            write_colormap(&ramp, &output, format)?;
            if !ramp.warnings.is_empty() {
                warn!(samples = ramp.warnings.len(), "colormap samples clamped");
            }
        }
        Commands::Interp {
            frame0,
            frame1,
            output,
            t,
            max_distance,
        } => {
            let summary =
                interpolate_files(&frame0, &frame1, &output, KeyframeBlend { t, max_distance })?;
            println!("{} points, {} held", summary.points, summary.held);
        }
        Commands::Texcoords {
            input,
            vertices_per_object,
            out_dir,
            prefix,
        } => {
            let mesh = NativeGeometry::new()
                .read_mesh(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let paths = write_reference_tables(&mesh, vertices_per_object, &out_dir, &prefix)?;
            for path in paths {
                info!(path = %path.display(), "wrote texcoord table");
            }
        }
        Commands::Preset { name, output } => {
            println!("{}", name.options_for(&output).to_json());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn hcl_argument() {
        assert_eq!(parse_hcl("5.2, 64.5,22").unwrap(), Hcl::new(5.2, 64.5, 22.0));
        assert!(parse_hcl("1,2").is_err());
        assert!(parse_hcl("a,b,c").is_err());
    }

    #[test]
    fn export_arguments() {
        let cli = Cli::try_parse_from([
            "forcemesh",
            "export",
            "rbc.vtk",
            "rbc.ply",
            "--preset",
            "rbc",
            "--derive-force",
            "--tex-table",
            "a.csv",
            "--tex-table",
            "b.csv",
            "--vertices-per-object",
            "642",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                preset,
                derive_force,
                tex_tables,
                vertices_per_object,
                ..
            } => {
                assert_eq!(preset, Some(Preset::Rbc));
                assert!(derive_force);
                assert_eq!(tex_tables.len(), 2);
                assert_eq!(vertices_per_object, Some(642));
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn options_and_preset_conflict() {
        assert!(Cli::try_parse_from([
            "forcemesh",
            "export",
            "a.vtk",
            "a.ply",
            "--preset",
            "ctc",
            "--options",
            "o.json",
        ])
        .is_err());
    }
}
