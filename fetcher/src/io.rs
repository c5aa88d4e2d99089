use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::FetchError;

/// Creates the directory and its parents; an existing directory is fine.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path_ref = path.as_ref();
    fs::create_dir_all(path_ref)
        .with_context(|| format!("Failed to create directory: {}", path_ref.display()))
}

pub fn sanitize_filename(input: &str) -> String {
    // Replace characters that are problematic in filenames
    input
        .replace(&['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'][..], "_")
        .trim()
        .trim_matches('.')
        .to_string()
}

/// Local file name for a candidate href: its last path segment, without
/// query or fragment, with unsafe characters escaped.
pub fn candidate_filename(candidate: &str) -> Result<String, FetchError> {
    let reject = |reason| FetchError::UnsafeFilename {
        candidate: candidate.to_string(),
        reason,
    };

    let path = candidate
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let segment = path
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    match segment.trim() {
        "" => return Err(reject("no file name")),
        "." | ".." => return Err(reject("path traversal")),
        _ => {}
    }

    let name = sanitize_filename(segment);
    if name.is_empty() {
        return Err(reject("no usable characters in file name"));
    }
    Ok(name)
}
