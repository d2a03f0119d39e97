pub mod archive;
pub mod batch;
pub mod cache;
pub mod roster;
pub mod signatures;
pub mod source;
pub mod status;
mod types;

pub use archive::write_zip;
pub use batch::{
    BatchJob, BatchOptions, BatchReport, CsvLocation, parse_event, process_event, run_batch,
};
pub use cache::{AssetCache, BatchCache};
pub use roster::{Manifest, ManifestEntry, ROW_SUCCESS, parse_roster};
pub use signatures::{SignatureEntry, SignatureIndex};
pub use source::{AdminApiConfig, AdminApiSource, AssetSource, LocalSource};
pub use status::{AdminApiReporter, BatchStatus, LogReporter, StatusReporter, StatusUpdate};
pub use types::*;
