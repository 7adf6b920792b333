//! Zip packaging of batch outputs.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use contentfactory_shared::{ContentFactoryError, Result};

/// Bundle `files` into a flat zip archive at `dest`.
///
/// Entries are named by file name only. Two inputs with the same file name
/// are rejected rather than silently shadowed.
#[instrument(skip_all, fields(dest = %dest.display(), files = files.len()))]
pub fn package(dest: &Path, files: &[PathBuf]) -> Result<PathBuf> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ContentFactoryError::Artifact(format!(
                    "cannot archive {}: no usable file name",
                    path.display()
                ))
            })?;
        if !seen.insert(name.to_string()) {
            return Err(ContentFactoryError::Artifact(format!(
                "duplicate archive entry '{name}'"
            )));
        }
        entries.push((name.to_string(), path));
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ContentFactoryError::io(parent, e))?;
    }
    let file = File::create(dest).map_err(|e| ContentFactoryError::io(dest, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in entries {
        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        let mut source = File::open(path).map_err(|e| ContentFactoryError::io(path, e))?;
        std::io::copy(&mut source, &mut zip).map_err(|e| ContentFactoryError::io(path, e))?;
    }
    zip.finish()
        .map_err(zip_err)?
        .flush()
        .map_err(|e| ContentFactoryError::io(dest, e))?;

    info!(entries = files.len(), "archive written");
    Ok(dest.to_path_buf())
}

fn zip_err(e: zip::result::ZipError) -> ContentFactoryError {
    ContentFactoryError::Artifact(format!("archive write failed: {e}"))
}
