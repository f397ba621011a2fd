use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::app::ports::{ReportPayload, ReportPort, ReportResponse};
use crate::error::Result;

/// POSTs report payloads as JSON. Any HTTP status is a response, not an error.
pub struct HttpReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpReporter {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReportPort for HttpReporter {
    async fn submit(&self, payload: &ReportPayload) -> Result<ReportResponse> {
        debug!(
            "HttpReporter: POST {} issues={}",
            self.endpoint,
            payload.tampering_issues.len()
        );
        let resp = self.client.post(&self.endpoint).json(payload).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        info!("Report endpoint answered status={}", status);
        Ok(ReportResponse { status, body })
    }
}
