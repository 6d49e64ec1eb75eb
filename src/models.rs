use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label value used whenever a sample lacks `instance`, `pod` or `phase`.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Top-level response of `/api/v1/query`.
///
/// Every level is optional: an envelope without `data` or `data.result`
/// simply means there is nothing to report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResultEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<QueryData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryData {
    #[serde(rename = "resultType", default)]
    pub result_type: Option<String>,
    #[serde(default)]
    pub result: Option<Vec<ResultSample>>,
}

/// One labelled series with its instantaneous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSample {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub value: Option<SamplePoint>,
}

/// `[timestamp, "value"]` as sent by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint(pub f64, pub String);

impl SamplePoint {
    pub fn timestamp(&self) -> f64 {
        self.0
    }

    pub fn raw_value(&self) -> &str {
        &self.1
    }
}

impl QueryResultEnvelope {
    /// The samples of `data.result`, or an empty slice when either level is absent.
    pub fn samples(&self) -> &[ResultSample] {
        self.data
            .as_ref()
            .and_then(|data| data.result.as_deref())
            .unwrap_or(&[])
    }
}

impl ResultSample {
    pub fn label(&self, name: &str) -> &str {
        self.metric.get(name).map(String::as_str).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn worker(&self) -> &str {
        self.label("instance")
    }

    pub fn pod(&self) -> &str {
        self.label("pod")
    }
}

/// `worker -> pod -> metric -> value`.
pub type MetricsByWorkerPod = HashMap<String, HashMap<String, HashMap<String, f64>>>;

/// Same shape as [`MetricsByWorkerPod`] with display strings as leaves.
pub type FormattedMetrics = HashMap<String, HashMap<String, HashMap<String, String>>>;

/// `pod -> phase`.
pub type PodStatuses = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSample {
    pub timestamp: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodList {
    pub pods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub namespace: String,
}
