//! Migration source reader.
//!
//! Turns a file on disk into a [`MigrationDescriptor`]. File names must follow
//! `V{version}__{description}.{up|down}.sql`; anything else is rejected with
//! [`CoreError::InvalidNaming`]. Read failures surface separately as
//! [`CoreError::IoWithPath`].

use crate::checksum::compute_fingerprint;
use crate::error::{CoreError, CoreResult};
use crate::migration::{Direction, MigrationDescriptor, SQL_EXTENSION, STEM_SEPARATOR, VERSION_MARKER};
use std::path::{Component, Path};

/// The `(version, description, direction)` triple encoded in a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    pub version: u32,
    pub description: String,
    pub direction: Direction,
}

/// Parse a bare migration file name (no directories).
///
/// Returns the reason for rejection on failure; callers attach the path.
pub fn parse_file_name(file_name: &str) -> Result<ParsedFileName, String> {
    let segments: Vec<&str> = file_name.split('.').collect();
    let [stem, tag, extension] = segments.as_slice() else {
        return Err(format!(
            "expected 3 dot-separated segments, found {}",
            segments.len()
        ));
    };

    if *extension != SQL_EXTENSION {
        return Err(format!("extension must be '.{SQL_EXTENSION}', found '.{extension}'"));
    }

    let direction = Direction::from_file_tag(tag)
        .ok_or_else(|| format!("direction tag must be 'up' or 'down', found '{tag}'"))?;

    let parts: Vec<&str> = stem.split(STEM_SEPARATOR).collect();
    let [version_token, description] = parts.as_slice() else {
        return Err(format!(
            "expected version and description separated by '{STEM_SEPARATOR}', found {} segment(s)",
            parts.len()
        ));
    };

    let digits = version_token.strip_prefix(VERSION_MARKER).ok_or_else(|| {
        format!("version '{version_token}' must start with '{VERSION_MARKER}'")
    })?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "version '{version_token}' must be '{VERSION_MARKER}' followed by a non-negative integer"
        ));
    }
    let version = digits
        .parse::<u32>()
        .map_err(|e| format!("version '{version_token}' is out of range: {e}"))?;

    Ok(ParsedFileName {
        version,
        description: description.to_string(),
        direction,
    })
}

/// Read and parse a migration file.
///
/// `source_path` is the ledger key recorded for the file; `path` is where it
/// lives on disk. The name is validated before the file is read.
pub fn read_migration(path: &Path, source_path: &str) -> CoreResult<MigrationDescriptor> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CoreError::invalid_naming(source_path, "file name is not valid UTF-8"))?;

    let parsed =
        parse_file_name(file_name).map_err(|reason| CoreError::invalid_naming(source_path, reason))?;

    let bytes = std::fs::read(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    let fingerprint = compute_fingerprint(&bytes);
    let content = String::from_utf8(bytes).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    Ok(MigrationDescriptor {
        version: parsed.version,
        description: parsed.description,
        direction: parsed.direction,
        source_path: source_path.to_string(),
        content,
        fingerprint,
    })
}

/// Ledger key for `path`: relative to `root`, joined with `/`.
///
/// Falls back to the full path when `path` is not under `root`.
pub fn relative_source_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;
