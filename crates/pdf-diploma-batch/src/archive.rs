//! Zipping a batch work directory

use crate::types::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Deflate every file under `dir` into `zip_path`, named relative to `dir`.
///
/// Returns the number of files archived.
pub async fn write_zip(dir: impl AsRef<Path>, zip_path: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref().to_owned();
    let zip_path = zip_path.as_ref().to_owned();
    tokio::task::spawn_blocking(move || write_zip_sync(&dir, &zip_path)).await?
}

fn write_zip_sync(dir: &Path, zip_path: &Path) -> Result<usize> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut zip = zip::ZipWriter::new(BufWriter::new(File::create(zip_path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = archive_name(dir, path);
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(path)?)?;
    }

    zip.finish()?.flush()?;
    Ok(files.len())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// `/`-separated path of `path` relative to `dir`
fn archive_name(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
