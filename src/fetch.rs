// src/fetch.rs
// Monthly archive retrieval: URL templating and the retried HTTP download.

use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{ScanError, ScanResult};

/// PLACSP "sindicación 643" monthly archive of contracting-profile feeds.
pub const ZIP_URL_TEMPLATE: &str = "https://contrataciondelestado.es/sindicacion/sindicacion_643/licitacionesPerfilesContratanteCompleto3_{yyyymm}.zip";

const RETRIES: u32 = 3;
const BACKOFF_BASE_SECS: f64 = 1.5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Archive URL for the month containing the target date.
pub fn month_zip_url(target: NaiveDate) -> String {
    ZIP_URL_TEMPLATE.replace("{yyyymm}", &target.format("%Y%m").to_string())
}

/// Where the run gets its archive bytes. The CLI wires the HTTP source;
/// tests feed fixture bytes through the same seam.
#[async_trait]
pub trait ArchiveSource {
    async fn fetch(&self) -> ScanResult<Vec<u8>>;

    /// Human-readable origin for logs.
    fn origin(&self) -> &str;
}

/// One-shot download with bounded retries and exponential backoff.
/// Exhausting the retries is the only network failure that crosses the
/// pipeline boundary, carrying the last underlying cause.
pub struct HttpArchiveSource {
    url: String,
    client: reqwest::Client,
}

impl HttpArchiveSource {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub fn for_month(target: NaiveDate) -> Self {
        Self::new(month_zip_url(target))
    }

    async fn try_fetch(&self) -> anyhow::Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("sending archive request")?
            .error_for_status()
            .context("archive request status")?;
        let body = response.bytes().await.context("reading archive body")?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ArchiveSource for HttpArchiveSource {
    async fn fetch(&self) -> ScanResult<Vec<u8>> {
        let mut last_cause = None;
        for attempt in 0..RETRIES {
            if attempt > 0 {
                let delay = BACKOFF_BASE_SECS.powi(attempt as i32 - 1);
                tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            }
            match self.try_fetch().await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    tracing::warn!(error = ?e, url = %self.url, attempt, "archive download failed");
                    last_cause = Some(e);
                }
            }
        }
        Err(ScanError::Retrieval {
            url: self.url.clone(),
            attempts: RETRIES,
            source: last_cause
                .unwrap_or_else(|| anyhow!("no download attempts made"))
                .into(),
        })
    }

    fn origin(&self) -> &str {
        &self.url
    }
}
