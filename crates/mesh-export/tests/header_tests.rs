use std::fs;
use std::path::Path;

use mesh_export::{rename_header_fields, ExportError, TEXCOORD_RENAMES};

// ── Helper Functions ─────────────────────────────────────────────────────

const HEADER: &str = "ply
format binary_little_endian 1.0
element vertex 2
property float x
property float y
property float z
property float u
property float v
element face 0
property list uchar int vertex_indices
end_header
";

/// Payload bytes that include a newline, a NUL, and text that looks like a
/// header line; none of it may change.
fn payload() -> Vec<u8> {
    let mut bytes: Vec<u8> = (0u8..=255).collect();
    bytes.extend_from_slice(b"property float u\nend_header\n");
    bytes.extend_from_slice(&1.5f32.to_le_bytes());
    bytes
}

fn write_file(dir: &Path, header: &str, payload: &[u8]) -> std::path::PathBuf {
    let path = dir.join("mesh.ply");
    let mut bytes = header.as_bytes().to_vec();
    bytes.extend_from_slice(payload);
    fs::write(&path, bytes).unwrap();
    path
}

fn split_at_payload<'a>(bytes: &'a [u8], header_len: usize) -> (&'a str, &'a [u8]) {
    let (header, payload) = bytes.split_at(header_len);
    (std::str::from_utf8(header).unwrap(), payload)
}

// ── Renaming ─────────────────────────────────────────────────────────────

#[test]
fn renames_texcoord_lines_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), HEADER, &payload());

    let replaced = rename_header_fields(&path, TEXCOORD_RENAMES).unwrap();
    assert_eq!(replaced, 2);

    let bytes = fs::read(&path).unwrap();
    let (header, rest) = split_at_payload(&bytes, HEADER.len());
    let expected = HEADER
        .replace("property float u\n", "property float s\n")
        .replace("property float v\n", "property float t\n");
    assert_eq!(header, expected);
    let lines: Vec<&str> = header.lines().collect();
    assert_eq!(lines[6], "property float s");
    assert_eq!(lines[7], "property float t");
    assert_eq!(rest, payload().as_slice());
}

#[test]
fn crlf_terminators_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let header = HEADER.replace('\n', "\r\n");
    let path = write_file(dir.path(), &header, &payload());

    assert_eq!(rename_header_fields(&path, TEXCOORD_RENAMES).unwrap(), 2);

    let bytes = fs::read(&path).unwrap();
    let (out_header, rest) = split_at_payload(&bytes, header.len());
    assert!(out_header.contains("property float s\r\nproperty float t\r\n"));
    assert_eq!(rest, payload().as_slice());
}

#[test]
fn only_exact_lines_match() {
    let dir = tempfile::tempdir().unwrap();
    let header = HEADER
        .replace("property float u\n", "property float uv\n")
        .replace("property float v\n", "property double v\n");
    let path = write_file(dir.path(), &header, &payload());
    let before = fs::read(&path).unwrap();

    assert_eq!(rename_header_fields(&path, TEXCOORD_RENAMES).unwrap(), 0);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn custom_renames() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), HEADER, &payload());
    rename_header_fields(&path, &[("element face 0", "element face 0\ncomment patched")]).unwrap();
    let text = String::from_utf8_lossy(&fs::read(&path).unwrap()).into_owned();
    assert!(text.contains("element face 0\ncomment patched\nproperty list"));
}

// ── Failure handling ─────────────────────────────────────────────────────

#[test]
fn missing_sentinel_leaves_original_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let truncated = HEADER.replace("end_header\n", "");
    let path = write_file(dir.path(), &truncated, b"");
    let before = fs::read(&path).unwrap();

    let err = rename_header_fields(&path, TEXCOORD_RENAMES).unwrap_err();
    assert!(matches!(err, ExportError::Header { .. }));
    assert_eq!(fs::read(&path).unwrap(), before);
    // the temporary file is cleaned up
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = rename_header_fields(&dir.path().join("absent.ply"), TEXCOORD_RENAMES).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
    assert!(!err.is_configuration());
}
