use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use url::Url;

use crate::error::FetchError;
use crate::io::candidate_filename;

pub const CHUNK_SIZE: usize = 8192;

/// Where a selected candidate is fetched from and saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: Url,
    pub path: PathBuf,
}

impl DownloadTarget {
    /// Joins the candidate onto the listing URL (absolute candidates replace
    /// it) and places its file name under `save_dir`.
    pub fn resolve(
        listing_url: &Url,
        candidate: &str,
        save_dir: &Path,
    ) -> Result<Self, FetchError> {
        let url = listing_url
            .join(candidate)
            .map_err(|source| FetchError::Resolve {
                base: listing_url.to_string(),
                candidate: candidate.to_string(),
                source,
            })?;
        let path = save_dir.join(candidate_filename(candidate)?);
        Ok(DownloadTarget { url, path })
    }
}

enum CopyError {
    Read(std::io::Error),
    Write(std::io::Error),
}

/// Copies `reader` into `writer` one chunk at a time, in order, until EOF.
fn copy_in_chunks<R: Read + ?Sized, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> Result<u64, CopyError> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buffer[..n]).map_err(CopyError::Write)?;
        written += n as u64;
    }
    writer.flush().map_err(CopyError::Write)?;
    Ok(written)
}

/// Streams `body` into a temporary file next to the target and moves it into
/// place once the whole body has arrived. A failed copy leaves the target
/// path untouched; the temporary file is dropped with it.
pub fn save_body<R: Read + ?Sized>(
    body: &mut R,
    target: &DownloadTarget,
) -> Result<u64, FetchError> {
    let storage_error = |source| FetchError::Storage {
        path: target.path.clone(),
        source,
    };

    // Stage next to the target file
    let dir = match target.path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(storage_error)?;

    let written = match copy_in_chunks(body, staged.as_file_mut()) {
        Ok(written) => written,
        Err(CopyError::Read(source)) => {
            return Err(FetchError::Body {
                url: target.url.to_string(),
                source,
            })
        }
        Err(CopyError::Write(source)) => return Err(storage_error(source)),
    };

    // Replaces any file already at the target path
    staged
        .persist(&target.path)
        .map_err(|e| storage_error(e.error))?;
    Ok(written)
}
