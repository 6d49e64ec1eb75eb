//! Reshapes flat query results into the views served by the API.

use tracing::warn;

use crate::error::ParseError;
use crate::metrics;
use crate::models::{
    MetricsByWorkerPod, NetworkSample, PodStatuses, QueryResultEnvelope, ResultSample,
};

/// Builds `worker -> pod -> metric_key -> value` from one query's result.
///
/// A sample whose value is missing or not a float fails the whole parse.
pub fn parse(envelope: &QueryResultEnvelope, metric_key: &str) -> Result<MetricsByWorkerPod, ParseError> {
    let mut result = MetricsByWorkerPod::new();

    for sample in envelope.samples() {
        let (_, value) = sample_value(sample, metric_key)?;
        result
            .entry(sample.worker().to_string())
            .or_default()
            .entry(sample.pod().to_string())
            .or_default()
            .insert(metric_key.to_string(), value);
    }

    Ok(result)
}

/// `pod -> phase`; a later sample for the same pod wins.
pub fn parse_pod_statuses(envelope: &QueryResultEnvelope) -> PodStatuses {
    envelope
        .samples()
        .iter()
        .map(|sample| (sample.pod().to_string(), sample.label("phase").to_string()))
        .collect()
}

/// Pod names in result order, duplicates included.
pub fn parse_pod_names(envelope: &QueryResultEnvelope) -> Vec<String> {
    envelope
        .samples()
        .iter()
        .map(|sample| sample.pod().to_string())
        .collect()
}

/// Network samples in result order.
///
/// `NaN` and infinite values have no JSON number form, so those samples are
/// skipped with a warning.
pub fn parse_network_samples(
    envelope: &QueryResultEnvelope,
    metric_key: &str,
) -> Result<Vec<NetworkSample>, ParseError> {
    let mut samples = Vec::new();

    for sample in envelope.samples() {
        let (timestamp, value) = sample_value(sample, metric_key)?;
        if !value.is_finite() {
            warn!(
                worker = %sample.worker(),
                pod = %sample.pod(),
                timestamp,
                value,
                "Skipping non-finite network sample"
            );
            continue;
        }
        samples.push(NetworkSample {
            timestamp: timestamp.to_string(),
            value,
        });
    }

    Ok(samples)
}

/// `(timestamp, value)` of a sample.
fn sample_value(sample: &ResultSample, metric_key: &str) -> Result<(f64, f64), ParseError> {
    let point = sample.value.as_ref().ok_or_else(|| {
        metrics::record_parse_failure();
        ParseError::MissingValue {
            metric_key: metric_key.to_string(),
            worker: sample.worker().to_string(),
            pod: sample.pod().to_string(),
        }
    })?;

    let value = point.raw_value().trim().parse::<f64>().map_err(|source| {
        metrics::record_parse_failure();
        ParseError::InvalidValue {
            metric_key: metric_key.to_string(),
            worker: sample.worker().to_string(),
            pod: sample.pod().to_string(),
            raw: point.raw_value().to_string(),
            source,
        }
    })?;

    Ok((point.timestamp(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::bytes_to_human;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn envelope(body: serde_json::Value) -> QueryResultEnvelope {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_parse_nests_by_worker_and_pod() {
        let env = envelope(json!({
            "status": "success",
            "data": {"resultType": "vector", "result": [
                {"metric": {"instance": "node1", "pod": "podA"}, "value": [1700000000, "0.5"]},
                {"metric": {"instance": "node1", "pod": "podB"}, "value": [1700000000, "1.25"]},
                {"metric": {"instance": "node2", "pod": "podC"}, "value": [1700000000, "2"]}
            ]}
        }));

        let parsed = parse(&env, "cpu_usage").unwrap();

        let mut expected = MetricsByWorkerPod::new();
        expected.insert(
            "node1".to_string(),
            HashMap::from([
                ("podA".to_string(), HashMap::from([("cpu_usage".to_string(), 0.5)])),
                ("podB".to_string(), HashMap::from([("cpu_usage".to_string(), 1.25)])),
            ]),
        );
        expected.insert(
            "node2".to_string(),
            HashMap::from([("podC".to_string(), HashMap::from([("cpu_usage".to_string(), 2.0)]))]),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_without_result_is_empty() {
        for body in [
            json!({}),
            json!({"status": "error"}),
            json!({"data": {}}),
            json!({"data": {"resultType": "vector"}}),
            json!({"data": {"result": []}}),
        ] {
            assert!(parse(&envelope(body), "cpu_usage").unwrap().is_empty());
        }
    }

    #[test]
    fn test_parse_missing_labels_become_unknown() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {}, "value": [1700000000, "42"]}
        ]}}));

        let parsed = parse(&env, "disk_io").unwrap();
        assert_eq!(parsed["unknown"]["unknown"]["disk_io"], 42.0);
    }

    #[test]
    fn test_parse_end_to_end_memory() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {"instance": "node1", "pod": "podA"}, "value": [1700000000, "2097152"]}
        ]}}));

        let parsed = parse(&env, "memory_usage").unwrap();
        let leaf: HashMap<String, String> = parsed["node1"]["podA"]
            .iter()
            .map(|(k, v)| (k.clone(), bytes_to_human(*v)))
            .collect();
        assert_eq!(leaf, HashMap::from([("memory_usage".to_string(), "2.00 MB".to_string())]));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {"instance": "node1", "pod": "podA"}, "value": [1700000000, "12abc"]}
        ]}}));
        match parse(&env, "cpu_usage") {
            Err(ParseError::InvalidValue { raw, pod, .. }) => {
                assert_eq!(raw, "12abc");
                assert_eq!(pod, "podA");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }

        let env = envelope(json!({"data": {"result": [
            {"metric": {"instance": "node1", "pod": "podA"}}
        ]}}));
        assert!(matches!(
            parse(&env, "cpu_usage"),
            Err(ParseError::MissingValue { .. })
        ));
    }

    #[test]
    fn test_parse_accepts_special_floats() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {"instance": "n", "pod": "a"}, "value": [1, "NaN"]},
            {"metric": {"instance": "n", "pod": "b"}, "value": [1, "+Inf"]}
        ]}}));

        let parsed = parse(&env, "network_traffic").unwrap();
        assert!(parsed["n"]["a"]["network_traffic"].is_nan());
        assert_eq!(parsed["n"]["b"]["network_traffic"], f64::INFINITY);
    }

    #[test]
    fn test_pod_statuses() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {"pod": "podA", "phase": "Running"}, "value": [1, "1"]},
            {"metric": {"pod": "podB"}, "value": [1, "1"]},
            {"metric": {"pod": "podA", "phase": "Failed"}, "value": [1, "0"]}
        ]}}));

        let statuses = parse_pod_statuses(&env);
        assert_eq!(
            statuses,
            PodStatuses::from([
                ("podA".to_string(), "Failed".to_string()),
                ("podB".to_string(), "unknown".to_string()),
            ])
        );
        assert!(parse_pod_statuses(&envelope(json!({}))).is_empty());
    }

    #[test]
    fn test_pod_names_keep_order_and_duplicates() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {"pod": "web-2"}, "value": [1, "1"]},
            {"metric": {"pod": "web-1"}, "value": [1, "1"]},
            {"metric": {"pod": "web-2"}, "value": [1, "1"]},
            {"metric": {}, "value": [1, "1"]}
        ]}}));

        assert_eq!(parse_pod_names(&env), vec!["web-2", "web-1", "web-2", "unknown"]);
    }

    #[test]
    fn test_network_samples() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {"instance": "node1", "pod": "podA"}, "value": [1700000000.5, "1024"]},
            {"metric": {"instance": "node2", "pod": "podA"}, "value": [1700000001, "0.25"]}
        ]}}));

        let samples = parse_network_samples(&env, "network_traffic").unwrap();
        assert_eq!(
            samples,
            vec![
                NetworkSample { timestamp: "1700000000.5".to_string(), value: 1024.0 },
                NetworkSample { timestamp: "1700000001".to_string(), value: 0.25 },
            ]
        );
        assert!(parse_network_samples(&envelope(json!({})), "network_traffic")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_network_samples_skip_non_finite_values() {
        let env = envelope(json!({"data": {"result": [
            {"metric": {"instance": "node1", "pod": "podA"}, "value": [1700000000, "NaN"]},
            {"metric": {"instance": "node1", "pod": "podA"}, "value": [1700000001, "+Inf"]},
            {"metric": {"instance": "node2", "pod": "podA"}, "value": [1700000002, "-Inf"]},
            {"metric": {"instance": "node3", "pod": "podA"}, "value": [1700000003, "512"]}
        ]}}));

        let samples = parse_network_samples(&env, "network_traffic").unwrap();
        assert_eq!(
            serde_json::to_string(&samples).unwrap(),
            r#"[{"timestamp":"1700000003","value":512.0}]"#
        );
    }
}
