//! Where a batch gets its assets from

mod admin_api;
mod local;

pub use admin_api::{
    API_TIMEOUT_SECS, AdminApiConfig, AdminApiSource, DEFAULT_API_KEY_HEADER,
    DOWNLOAD_TIMEOUT_SECS,
};
pub(crate) use admin_api::check_status;
pub use local::LocalSource;

use crate::signatures::SignatureEntry;
use crate::types::Result;
use pdf_diploma::LayoutConfig;
use std::future::Future;

/// Provider of the shared assets and the per-batch roster.
///
/// Implementations only fetch; caching is the job of
/// [`BatchCache`](crate::cache::BatchCache).
pub trait AssetSource: Send + Sync {
    /// Validated field layout
    fn layout(&self) -> impl Future<Output = Result<LayoutConfig>> + Send;

    /// Raw bytes of the active template PDF
    fn template(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Every registered signature
    fn signatures(&self) -> impl Future<Output = Result<Vec<SignatureEntry>>> + Send;

    /// Image bytes for a location taken from a [`SignatureEntry`]
    fn signature_bytes(&self, location: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Roster CSV bytes
    fn roster(&self, location: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
