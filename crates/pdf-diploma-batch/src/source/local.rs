use super::AssetSource;
use crate::signatures::{SignatureEntry, looks_like_image_filename};
use crate::types::{BatchError, Result};
use pdf_diploma::LayoutConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const LAYOUT_FILE: &str = "layout.json";
const TEMPLATE_FILE: &str = "template.pdf";
const SIGNATURES_DIR: &str = "signatures";
const SIGNATURE_INDEX_FILE: &str = "index.json";

/// Assets laid out in a directory:
///
/// ```text
/// assets/
///   layout.json
///   template.pdf
///   signatures/
///     index.json        (optional)
///     oscar_pimentel.gif
/// ```
///
/// Without `index.json`, every image in `signatures/` is registered under
/// its file name and under its stem with underscores read as spaces.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

/// `index.json` is either a bare list or the admin API's response shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexFile {
    List(Vec<SignatureEntry>),
    Wrapped { signatures: Vec<SignatureEntry> },
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn signatures_dir(&self) -> PathBuf {
        self.root.join(SIGNATURES_DIR)
    }

    async fn scan_signature_dir(&self) -> Result<Vec<SignatureEntry>> {
        let dir = self.signatures_dir();
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut reader = tokio::fs::read_dir(&dir).await?;
        while let Some(item) = reader.next_entry().await? {
            let file_name = item.file_name().to_string_lossy().into_owned();
            if item.file_type().await?.is_file() && looks_like_image_filename(&file_name) {
                files.push(file_name);
            }
        }
        files.sort();

        Ok(files
            .into_iter()
            .map(|file_name| {
                let stem = Path::new(&file_name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().replace('_', " "))
                    .unwrap_or_default();
                SignatureEntry {
                    name: stem,
                    professor_name: String::new(),
                    location: file_name,
                }
            })
            .collect())
    }
}

async fn read_asset(path: &Path) -> Result<Vec<u8>> {
    debug!(path = %path.display(), "Reading asset");
    tokio::fs::read(path)
        .await
        .map_err(|e| BatchError::Asset(format!("{}: {}", path.display(), e)))
}

impl AssetSource for LocalSource {
    async fn layout(&self) -> Result<LayoutConfig> {
        let bytes = read_asset(&self.root.join(LAYOUT_FILE)).await?;
        Ok(LayoutConfig::from_json(&bytes)?)
    }

    async fn template(&self) -> Result<Vec<u8>> {
        read_asset(&self.root.join(TEMPLATE_FILE)).await
    }

    async fn signatures(&self) -> Result<Vec<SignatureEntry>> {
        let index_path = self.signatures_dir().join(SIGNATURE_INDEX_FILE);
        if tokio::fs::try_exists(&index_path).await? {
            let bytes = read_asset(&index_path).await?;
            return Ok(match serde_json::from_slice(&bytes)? {
                IndexFile::List(entries) => entries,
                IndexFile::Wrapped { signatures } => signatures,
            });
        }
        self.scan_signature_dir().await
    }

    /// Relative locations are resolved against `signatures/`.
    async fn signature_bytes(&self, location: &str) -> Result<Vec<u8>> {
        let path = Path::new(location);
        if path.is_absolute() {
            read_asset(path).await
        } else {
            read_asset(&self.signatures_dir().join(path)).await
        }
    }

    async fn roster(&self, location: &str) -> Result<Vec<u8>> {
        read_asset(Path::new(location)).await
    }
}
