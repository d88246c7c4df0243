use async_trait::async_trait;
use oxitel_core::AggregateRecord;
use reqwest::StatusCode;

use super::RecordSink;

#[derive(Debug, thiserror::Error)]
pub enum HttpSinkError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint returned status {0}")]
    Status(StatusCode),
}

/// Network sink: one POST per cycle with a compact JSON body.
///
/// Only HTTP 200 counts as delivered; any other status is a failure the
/// caller logs and moves on from.
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RecordSink for HttpSink {
    type Error = HttpSinkError;

    async fn deliver(&self, record: &AggregateRecord) -> Result<(), Self::Error> {
        let body = serde_json::json!({
            "hr": record.avg_heart_rate,
            "spo2": record.avg_spo2,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            other => Err(HttpSinkError::Status(other)),
        }
    }
}
