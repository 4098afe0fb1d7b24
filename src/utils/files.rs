use crate::avatar::{Identifier, Quality};
use crate::error::{AvatarError, Result};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Ensure a directory exists; succeeds if it is already there.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| AvatarError::io(path, e))?;
    tracing::debug!("Created directory: {}", path.display());
    Ok(())
}

/// Default save path in the working directory, e.g. `avatar_10001_hd.jpg`.
pub fn default_file_name(identifier: &Identifier, quality: Quality) -> PathBuf {
    PathBuf::from(format!("avatar_{}{}", identifier, quality.file_suffix()))
}

/// File name used for an avatar inside a batch output directory.
pub fn batch_file_path(output_dir: &Path, identifier: &Identifier, quality: Quality) -> PathBuf {
    output_dir.join(format!("{}{}", identifier, quality.file_suffix()))
}

/// Write `bytes` to `path` through a temporary file in the same directory,
/// then rename it into place. The destination is either untouched or complete.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<u64> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_directory(parent)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| AvatarError::io(parent, e))?;
    temp.write_all(bytes)
        .and_then(|_| temp.flush())
        .map_err(|e| AvatarError::io(temp.path(), e))?;

    temp.persist(path)
        .map_err(|e| AvatarError::io(path, e.error))?;

    Ok(bytes.len() as u64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListEntry {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<ListEntry> for Identifier {
    fn from(entry: ListEntry) -> Self {
        match entry {
            ListEntry::Text(text) => Identifier::from(text),
            ListEntry::Unsigned(n) => Identifier::from(n),
            ListEntry::Signed(n) => Identifier::from(n),
        }
    }
}

/// Parse a batch identifier list.
///
/// Accepts either a JSON array of strings/integers, or plain text with one
/// identifier per line (blank lines and `#` comments are skipped).
pub fn parse_identifier_list(content: &str) -> std::result::Result<Vec<Identifier>, String> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let entries: Vec<ListEntry> =
            serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse JSON: {}", e))?;
        return Ok(entries.into_iter().map(Identifier::from).collect());
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Identifier::from)
        .collect())
}

/// Read and parse a batch identifier list from disk.
pub fn read_identifier_list(path: &Path) -> Result<Vec<Identifier>> {
    let content = fs::read_to_string(path).map_err(|e| AvatarError::IdentifierList {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_identifier_list(&content).map_err(|message| AvatarError::IdentifierList {
        path: path.to_path_buf(),
        message,
    })
}
