use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::formatting::MetricKind;
use crate::models::{FormattedMetrics, MetricsByWorkerPod};
use crate::parser;
use crate::upstream::QuerySource;

/// Runs a set of named queries and folds them into one per-worker/per-pod view.
#[derive(Clone)]
pub struct MetricsAggregator {
    source: Arc<dyn QuerySource>,
}

impl MetricsAggregator {
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self { source }
    }

    /// Fetches every `(metric_key, query)` pair concurrently, merges the
    /// results and formats them for display.
    ///
    /// A query that fails in transport contributes nothing; a sample that
    /// cannot be parsed fails the whole collection.
    pub async fn collect(&self, queries: &[(String, String)]) -> Result<FormattedMetrics, ParseError> {
        let envelopes = join_all(
            queries
                .iter()
                .map(|(_, query)| self.source.fetch_or_empty(query)),
        )
        .await;

        let mut merged = MetricsByWorkerPod::new();
        for ((metric_key, _), envelope) in queries.iter().zip(envelopes) {
            let partial = parser::parse(&envelope, metric_key)?;
            debug!(metric = %metric_key, workers = partial.len(), "Parsed query result");
            merge_into(&mut merged, partial);
        }

        Ok(format_metrics(merged))
    }
}

/// Unions `partial` into `acc`, one metric key at a time.
pub fn merge_into(acc: &mut MetricsByWorkerPod, partial: MetricsByWorkerPod) {
    for (worker, pods) in partial {
        let acc_pods = acc.entry(worker).or_default();
        for (pod, values) in pods {
            acc_pods.entry(pod).or_default().extend(values);
        }
    }
}

/// Replaces each raw value with its display string. Unknown metric keys are
/// dropped with a warning.
pub fn format_metrics(metrics: MetricsByWorkerPod) -> FormattedMetrics {
    metrics
        .into_iter()
        .map(|(worker, pods)| {
            let pods: HashMap<String, HashMap<String, String>> = pods
                .into_iter()
                .map(|(pod, values)| {
                    let formatted: HashMap<String, String> = values
                        .into_iter()
                        .filter_map(|(key, value)| match MetricKind::from_key(&key) {
                            Some(kind) => Some((key, kind.format(value))),
                            None => {
                                warn!(metric = %key, "No formatter for metric, dropping it");
                                None
                            }
                        })
                        .collect();
                    (pod, formatted)
                })
                .collect();
            (worker, pods)
        })
        .collect()
}
