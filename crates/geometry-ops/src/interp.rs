//! Key-frame interpolation between two legacy VTK text files.
//!
//! Both inputs must share their structure (same header, same point count,
//! same cells). File 0 is copied verbatim except for the `POINTS` block,
//! whose coordinates are blended toward file 1.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{info, instrument};

use crate::types::GeometryError;

/// Blend parameters.
#[derive(Debug, Clone, Copy)]
pub struct KeyframeBlend {
    /// Interpolation parameter; 0 keeps file 0, 1 moves to file 1.
    pub t: f64,
    /// Points that moved farther than this between frames keep their file-0 position.
    pub max_distance: f64,
}

impl Default for KeyframeBlend {
    fn default() -> Self {
        Self {
            t: 0.5,
            max_distance: 9.9e12,
        }
    }
}

/// Counts reported after interpolation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlendSummary {
    pub points: usize,
    /// Points left at their file-0 position because they jumped too far.
    pub held: usize,
}

#[derive(Clone, Copy)]
enum State {
    Header,
    Points { remaining: usize },
    Rest,
}

fn parse_coords(line: &str, line_no: usize) -> Result<Vec<f64>, GeometryError> {
    line.split_whitespace()
        .map(|t| {
            t.parse::<f64>().map_err(|_| GeometryError::Parse {
                line: line_no,
                reason: format!("expected coordinate, found {:?}", t),
            })
        })
        .collect()
}

/// Stream-interpolate `frame0` and `frame1` into `out`.
pub fn interpolate_legacy<R0: BufRead, R1: BufRead, W: Write>(
    frame0: R0,
    frame1: R1,
    blend: KeyframeBlend,
    mut out: W,
) -> Result<BlendSummary, GeometryError> {
    let write_err = |e: std::io::Error| GeometryError::Write {
        path: "<output>".into(),
        source: e,
    };
    let read_err = |e: std::io::Error| GeometryError::Read {
        path: "<input>".into(),
        source: e,
    };

    let mut lines1 = frame1.lines();
    let mut state = State::Header;
    let mut summary = BlendSummary::default();

    for (i, line0) in frame0.lines().enumerate() {
        let line_no = i + 1;
        let line0 = line0.map_err(read_err)?;
        let line1 = lines1.next().transpose().map_err(read_err)?;
        let line0 = line0.trim();

        match state {
            State::Header | State::Rest => {
                writeln!(out, "{}", line0).map_err(write_err)?;
                let mut cols = line0.split_whitespace();
                if matches!(state, State::Header) && cols.next() == Some("POINTS") {
                    let count = cols.next().and_then(|c| c.parse::<usize>().ok()).ok_or_else(
                        || GeometryError::Parse {
                            line: line_no,
                            reason: "POINTS without a count".to_string(),
                        },
                    )?;
                    state = if count == 0 {
                        State::Rest
                    } else {
                        State::Points { remaining: count }
                    };
                }
            }
            State::Points { remaining } => {
                let line1 = line1.ok_or_else(|| GeometryError::Parse {
                    line: line_no,
                    reason: "second frame ended inside the POINTS block".to_string(),
                })?;
                let p0 = parse_coords(line0, line_no)?;
                let p1 = parse_coords(&line1, line_no)?;
                if p0.len() != p1.len() || p0.len() % 3 != 0 {
                    return Err(GeometryError::Parse {
                        line: line_no,
                        reason: format!(
                            "coordinate counts differ or are not triples ({} vs {})",
                            p0.len(),
                            p1.len()
                        ),
                    });
                }
                let mut left = remaining;
                for (a, b) in p0.chunks_exact(3).zip(p1.chunks_exact(3)) {
                    let dist = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt();
                    let p = if dist <= blend.max_distance {
                        [
                            (1.0 - blend.t) * a[0] + blend.t * b[0],
                            (1.0 - blend.t) * a[1] + blend.t * b[1],
                            (1.0 - blend.t) * a[2] + blend.t * b[2],
                        ]
                    } else {
                        summary.held += 1;
                        [a[0], a[1], a[2]]
                    };
                    writeln!(out, "{:.4} {:.4} {:.4}", p[0], p[1], p[2]).map_err(write_err)?;
                    summary.points += 1;
                    left = left.saturating_sub(1);
                }
                state = if left == 0 {
                    State::Rest
                } else {
                    State::Points { remaining: left }
                };
            }
        }
    }

    out.flush().map_err(write_err)?;
    Ok(summary)
}

/// File-level wrapper around [`interpolate_legacy`].
#[instrument(skip(blend))]
pub fn interpolate_files(
    frame0: &Path,
    frame1: &Path,
    output: &Path,
    blend: KeyframeBlend,
) -> Result<BlendSummary, GeometryError> {
    let open = |p: &Path| {
        File::open(p)
            .map(BufReader::new)
            .map_err(|e| GeometryError::Read {
                path: p.to_path_buf(),
                source: e,
            })
    };
    let r0 = open(frame0)?;
    let r1 = open(frame1)?;
    let out = File::create(output).map_err(|e| GeometryError::Write {
        path: output.to_path_buf(),
        source: e,
    })?;
    let summary = interpolate_legacy(r0, r1, blend, BufWriter::new(out))?;
    info!(
        points = summary.points,
        held = summary.held,
        t = blend.t,
        "interpolated key frame"
    );
    Ok(summary)
}
