//! Batch driver
//!
//! Runs one roster end to end: load assets through the cache, compose a
//! diploma per row, write the result manifest, zip the work directory and
//! report the final status. A failing row is recorded and skipped; only
//! asset, roster or output failures interrupt the batch.

use crate::archive::write_zip;
use crate::cache::BatchCache;
use crate::roster::{Manifest, parse_roster};
use crate::source::AssetSource;
use crate::status::{BatchStatus, StatusReporter, StatusUpdate};
use crate::types::{BatchError, Result};
use pdf_diploma::{DiplomaRow, SignatureOutcome, clean_name, compose};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// =============================================================================
// Job Description
// =============================================================================

/// One queued batch, as sent by the admin panel
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchJob {
    #[serde(deserialize_with = "deserialize_id")]
    pub batch_id: String,
    /// URL or path of the roster CSV
    #[serde(rename = "csv_url")]
    pub csv_location: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl BatchJob {
    pub fn new(batch_id: impl Into<String>, csv_location: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            csv_location: csv_location.into(),
            created_by: None,
            file_name: None,
        }
    }
}

/// Batch ids arrive as numbers or strings
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Work directories and archives are created here
    pub output_dir: PathBuf,
}

impl BatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

/// Summary of a finished batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_id: String,
    pub status: BatchStatus,
    /// Non-blank roster rows
    pub total_records: usize,
    pub archive: PathBuf,
    pub manifest: PathBuf,
    pub row_errors: usize,
    pub generated: Vec<PathBuf>,
    pub process_folder: String,
}

/// The two path segments of a roster location the batch cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLocation {
    /// Parent directory name, used as the work directory name
    pub process_folder: String,
    /// Roster file name, used for the manifest and archive names
    pub file_name: String,
}

impl CsvLocation {
    /// Split a URL or path into its last two segments.
    ///
    /// `https://host/a/2025-12-26/proceso-2/datos.csv` gives `proceso-2` and
    /// `datos.csv`. Locations with fewer than two segments, or whose last two
    /// segments are `.` or `..`, are rejected. The folder name is cleaned so
    /// the work directory always stays inside the output directory.
    pub fn parse(location: &str) -> Result<Self> {
        let without_query = location.split(['?', '#']).next().unwrap_or(location);
        let path = match without_query.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
            None => without_query,
        };

        let segments: Vec<&str> = path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [.., folder, file] if !is_relative_segment(folder) && !is_relative_segment(file) => {
                Ok(Self {
                    process_folder: clean_name(folder),
                    file_name: (*file).to_string(),
                })
            }
            _ => Err(BatchError::Location(location.to_string())),
        }
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    pub fn manifest_name(&self) -> String {
        format!("{}-resultado.csv", self.stem())
    }

    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.file_name)
    }
}

fn is_relative_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

// =============================================================================
// Driver
// =============================================================================

/// Process one batch and report its final status.
///
/// On interruption the `error` status is reported (best effort) and the
/// original error returned.
pub async fn run_batch<S, R>(
    job: &BatchJob,
    source: &S,
    reporter: &R,
    cache: &BatchCache,
    options: &BatchOptions,
) -> Result<BatchReport>
where
    S: AssetSource,
    R: StatusReporter,
{
    info!(batch_id = %job.batch_id, csv = %job.csv_location, "Starting batch");

    let mut total_records = 0;
    match execute(job, source, reporter, cache, options, &mut total_records).await {
        Ok(report) => {
            info!(
                batch_id = %report.batch_id,
                total_records = report.total_records,
                generated = report.generated.len(),
                row_errors = report.row_errors,
                archive = %report.archive.display(),
                "Batch completed"
            );
            Ok(report)
        }
        Err(err) => {
            error!(batch_id = %job.batch_id, error = %err, "Batch processing interrupted");
            let update = StatusUpdate {
                status: BatchStatus::Error,
                total_records,
                zip_url: None,
            };
            if let Err(report_err) = reporter.report(&job.batch_id, &update).await {
                warn!(
                    batch_id = %job.batch_id,
                    error = %report_err,
                    "Failed to report batch error status"
                );
            }
            Err(err)
        }
    }
}

async fn execute<S, R>(
    job: &BatchJob,
    source: &S,
    reporter: &R,
    cache: &BatchCache,
    options: &BatchOptions,
    total_records: &mut usize,
) -> Result<BatchReport>
where
    S: AssetSource,
    R: StatusReporter,
{
    let location = CsvLocation::parse(&job.csv_location)?;

    let assets = Assets {
        layout: cache.layout(source).await?,
        template: cache.template(source).await?,
        signatures: cache.signatures(source).await?,
    };

    let roster = source.roster(&job.csv_location).await?;
    let rows = parse_roster(&roster)?;
    *total_records = rows.len();
    info!(rows = rows.len(), "Roster parsed");

    let work_dir = options.output_dir.join(&location.process_folder);
    tokio::fs::create_dir_all(&work_dir).await?;

    let mut manifest = Manifest::new();
    let mut generated = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        match render_row(row, &assets, source, cache, &work_dir).await {
            Ok(path) => {
                debug!(row = idx + 1, path = %path.display(), "Row written");
                manifest.record_success(row);
                generated.push(path);
            }
            Err(err) => {
                warn!(row = idx + 1, nombre = %row.nombre, error = %err, "Row failed");
                manifest.record_error(row, err.to_string());
            }
        }
    }

    let manifest_path = work_dir.join(location.manifest_name());
    tokio::fs::write(&manifest_path, manifest.to_csv_bytes()?).await?;

    let archive = options.output_dir.join(location.archive_name());
    let archived = write_zip(&work_dir, &archive).await?;
    debug!(files = archived, archive = %archive.display(), "Archive written");

    let update = StatusUpdate {
        status: BatchStatus::Completado,
        total_records: rows.len(),
        zip_url: Some(archive.display().to_string()),
    };
    reporter.report(&job.batch_id, &update).await?;

    Ok(BatchReport {
        batch_id: job.batch_id.clone(),
        status: BatchStatus::Completado,
        total_records: rows.len(),
        archive,
        manifest: manifest_path,
        row_errors: manifest.error_count(),
        generated,
        process_folder: location.process_folder,
    })
}

struct Assets {
    layout: Arc<pdf_diploma::LayoutConfig>,
    template: Arc<pdf_diploma::Template>,
    signatures: Arc<crate::signatures::SignatureIndex>,
}

/// Compose and write one diploma, returning its path
async fn render_row<S: AssetSource>(
    row: &DiplomaRow,
    assets: &Assets,
    source: &S,
    cache: &BatchCache,
    work_dir: &Path,
) -> Result<PathBuf> {
    let location = assets
        .signatures
        .resolve(&row.profesor)
        .ok_or_else(|| BatchError::SignatureNotFound(row.profesor.clone()))?;
    let signature = cache.signature_bytes(source, location).await?;

    let template = Arc::clone(&assets.template);
    let layout = Arc::clone(&assets.layout);
    let owned_row = row.clone();
    let composed = tokio::task::spawn_blocking(move || {
        compose(&template, &layout, &owned_row, Some(signature.as_slice()))
    })
    .await??;

    if let SignatureOutcome::Skipped(reason) = &composed.signature {
        warn!(profesor = %row.profesor, reason = ?reason, "Diploma written without signature");
    }

    let path = work_dir.join(diploma_file_name(row));
    tokio::fs::write(&path, &composed.bytes).await?;
    Ok(path)
}

/// `{nombre}_{curso}_{uuid}.pdf` with both names lowercased and cleaned
pub fn diploma_file_name(row: &DiplomaRow) -> String {
    format!(
        "{}_{}_{}.pdf",
        clean_name(&row.nombre.to_lowercase()),
        clean_name(&row.curso.to_lowercase()),
        Uuid::new_v4().simple()
    )
}

// =============================================================================
// Queue Events
// =============================================================================

#[derive(Deserialize)]
struct QueueEvent {
    #[serde(rename = "Records", default)]
    records: Vec<QueueRecord>,
}

#[derive(Deserialize)]
struct QueueRecord {
    #[serde(default)]
    body: String,
}

/// Parse a queue envelope into its jobs, in order
pub fn parse_event(event_json: &[u8]) -> Result<Vec<BatchJob>> {
    let event: QueueEvent = serde_json::from_slice(event_json)
        .map_err(|e| BatchError::Event(format!("malformed envelope: {}", e)))?;
    event
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            serde_json::from_str(&record.body)
                .map_err(|e| BatchError::Event(format!("record {}: {}", idx, e)))
        })
        .collect()
}

/// Run every job in a queue envelope in order, stopping at the first
/// interrupted batch.
pub async fn process_event<S, R>(
    event_json: &[u8],
    source: &S,
    reporter: &R,
    cache: &BatchCache,
    options: &BatchOptions,
) -> Result<Vec<BatchReport>>
where
    S: AssetSource,
    R: StatusReporter,
{
    let jobs = parse_event(event_json)?;
    info!(records = jobs.len(), "Event received");

    let mut reports = Vec::with_capacity(jobs.len());
    for job in &jobs {
        reports.push(run_batch(job, source, reporter, cache, options).await?);
    }
    Ok(reports)
}
