//! Roster CSV input and the per-row result manifest

use crate::types::Result;
use csv::StringRecord;
use pdf_diploma::DiplomaRow;

/// `resultado` value for a row whose diploma was written
pub const ROW_SUCCESS: &str = "exitosamente creado";

const MANIFEST_HEADER: [&str; 5] = ["nombre", "curso", "fecha", "profesor", "resultado"];

/// Parse roster bytes into rows.
///
/// Columns are matched by header name in any order; extra columns are
/// ignored and missing ones read as empty. Values are trimmed and rows with
/// every value blank are dropped.
pub fn parse_roster(bytes: &[u8]) -> Result<Vec<DiplomaRow>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let columns = [
        column("nombre"),
        column("curso"),
        column("fecha"),
        column("profesor"),
    ];

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let [nombre, curso, fecha, profesor] = columns.map(|idx| value_at(&record, idx));
        let row = DiplomaRow::new(nombre, curso, fecha, profesor);
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn value_at(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// One line of the result manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub row: DiplomaRow,
    pub resultado: String,
}

impl ManifestEntry {
    pub fn is_success(&self) -> bool {
        self.resultado == ROW_SUCCESS
    }
}

/// Per-row outcome table shipped alongside the diplomas
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, row: &DiplomaRow) {
        self.entries.push(ManifestEntry {
            row: row.clone(),
            resultado: ROW_SUCCESS.to_string(),
        });
    }

    pub fn record_error(&mut self, row: &DiplomaRow, message: impl Into<String>) {
        self.entries.push(ManifestEntry {
            row: row.clone(),
            resultado: message.into(),
        });
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_success()).count()
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(MANIFEST_HEADER)?;
        for entry in &self.entries {
            let row = &entry.row;
            writer.write_record([
                row.nombre.as_str(),
                row.curso.as_str(),
                row.fecha.as_str(),
                row.profesor.as_str(),
                entry.resultado.as_str(),
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}
