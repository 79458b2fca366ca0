//! Opening startup artifacts from disk, plain or gzip-compressed.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Opens `path` for reading, transparently decompressing a `.gz` file.
pub fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let reader = BufReader::new(file);

    if is_gzip(path) {
        debug!(path = %path.display(), "Reading gzip artifact");
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Resolves `<dir>/<stem>.<ext>`, falling back to `<dir>/<stem>.<ext>.gz`.
///
/// Returns the plain path when neither exists so the caller's error names
/// the file it expected.
pub fn resolve(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let plain = dir.join(format!("{stem}.{ext}"));
    if plain.exists() {
        return plain;
    }
    let gz = dir.join(format!("{stem}.{ext}.gz"));
    if gz.exists() { gz } else { plain }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}
