//! Batch status reporting

use crate::source::AdminApiSource;
use crate::types::Result;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Final state of a batch.
///
/// Row failures do not make a batch `Error`; only a run that stopped before
/// reaching the end of the roster does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Completado,
    Error,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Completado => f.write_str("completado"),
            BatchStatus::Error => f.write_str("error"),
        }
    }
}

/// Body of a status update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: BatchStatus,
    pub total_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_url: Option<String>,
}

/// Receiver of batch status updates
pub trait StatusReporter: Send + Sync {
    fn report(
        &self,
        batch_id: &str,
        update: &StatusUpdate,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Reporter that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    async fn report(&self, batch_id: &str, update: &StatusUpdate) -> Result<()> {
        info!(
            batch_id,
            status = %update.status,
            total_records = update.total_records,
            archive = update.zip_url.as_deref().unwrap_or("-"),
            "Batch status"
        );
        Ok(())
    }
}

/// `PATCH {base}/diploma-batches/{id}` on the admin API
#[derive(Debug, Clone)]
pub struct AdminApiReporter {
    api: AdminApiSource,
}

impl AdminApiReporter {
    pub fn new(api: AdminApiSource) -> Self {
        Self { api }
    }
}

impl StatusReporter for AdminApiReporter {
    async fn report(&self, batch_id: &str, update: &StatusUpdate) -> Result<()> {
        let url = self.api.api_url(&format!("/diploma-batches/{}", batch_id));
        info!(url = %url, status = %update.status, "PATCH");
        let request = self
            .api
            .authorize(self.api.client().patch(&url))
            .timeout(Duration::from_secs(crate::source::API_TIMEOUT_SECS))
            .json(update);
        crate::source::check_status(request.send().await?).await?;
        Ok(())
    }
}
