//! In-place rewrite of a PLY text header.
//!
//! Header lines are matched exactly (ignoring the line terminator) up to and
//! including `end_header`; the payload after it is copied byte for byte. The
//! result goes to a temporary file in the same directory that is renamed over
//! the original, so an interrupted rewrite leaves the original intact.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use geometry_ops::ply::END_HEADER;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::errors::ExportError;

/// Generic texcoord names emitted by the mesh writer, and their replacements.
pub const TEXCOORD_RENAMES: &[(&str, &str)] = &[
    ("property float u", "property float s"),
    ("property float v", "property float t"),
];

/// Split a raw line into its content and terminator (`\n`, `\r\n` or none).
fn split_terminator(line: &[u8]) -> (&[u8], &[u8]) {
    let content_len = line
        .strip_suffix(b"\r\n")
        .or_else(|| line.strip_suffix(b"\n"))
        .map_or(line.len(), <[u8]>::len);
    line.split_at(content_len)
}

/// Rewrite the header of `path`, replacing each line equal to a `from`
/// pattern with its `to`. Returns the number of lines replaced.
#[instrument(skip(renames))]
pub fn rename_header_fields(path: &Path, renames: &[(&str, &str)]) -> Result<usize, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let original = File::open(path).map_err(io_err)?;
    let permissions = original.metadata().map_err(io_err)?.permissions();
    let mut reader = BufReader::new(original);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut out = BufWriter::new(NamedTempFile::new_in(dir).map_err(io_err)?);

    let mut replaced = 0;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(io_err)? == 0 {
            return Err(ExportError::Header {
                path: path.to_path_buf(),
                reason: format!("no {} line", END_HEADER),
            });
        }
        let (content, terminator) = split_terminator(&line);
        match renames.iter().find(|(from, _)| from.as_bytes() == content) {
            Some((_, to)) => {
                out.write_all(to.as_bytes()).map_err(io_err)?;
                out.write_all(terminator).map_err(io_err)?;
                replaced += 1;
            }
            None => out.write_all(&line).map_err(io_err)?,
        }
        if content == END_HEADER.as_bytes() {
            break;
        }
    }

    let payload = io::copy(&mut reader, &mut out).map_err(io_err)?;
    let temp = out.into_inner().map_err(|e| io_err(e.into_error()))?;
    temp.as_file().set_permissions(permissions).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(replaced, payload_bytes = payload, "rewrote header");
    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators() {
        assert_eq!(split_terminator(b"abc\r\n"), (&b"abc"[..], &b"\r\n"[..]));
        assert_eq!(split_terminator(b"abc\n"), (&b"abc"[..], &b"\n"[..]));
        assert_eq!(split_terminator(b"abc"), (&b"abc"[..], &b""[..]));
    }
}
