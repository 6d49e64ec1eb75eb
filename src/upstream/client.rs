use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, error};

use crate::error::TransportError;
use crate::metrics;
use crate::models::QueryResultEnvelope;

/// Anything that can answer an instant query.
#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<QueryResultEnvelope, TransportError>;

    /// Like [`fetch`](Self::fetch), but a transport failure is logged and
    /// reported as an envelope with no data.
    async fn fetch_or_empty(&self, query: &str) -> QueryResultEnvelope {
        match self.fetch(query).await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(query = %query, error = %e, "Error fetching data");
                QueryResultEnvelope::default()
            }
        }
    }
}

/// Client for a Prometheus-compatible `/api/v1/query` endpoint.
///
/// Certificate verification is off: the database usually sits behind a
/// self-signed or cluster-internal CA.
#[derive(Clone)]
pub struct MetricsClient {
    base_url: String,
    client: reqwest::Client,
}

impl MetricsClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn query_url(&self) -> String {
        format!("{}/api/v1/query", self.base_url)
    }

    async fn send(&self, query: &str) -> Result<QueryResultEnvelope, TransportError> {
        let response = self
            .client
            .get(self.query_url())
            .query(&[("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl QuerySource for MetricsClient {
    async fn fetch(&self, query: &str) -> Result<QueryResultEnvelope, TransportError> {
        let start = Instant::now();
        let result = self.send(query).await;
        let elapsed = start.elapsed().as_secs_f64();

        metrics::record_upstream_query(result.is_ok(), elapsed);
        debug!(query = %query, elapsed_secs = elapsed, ok = result.is_ok(), "Upstream query finished");

        result
    }
}
