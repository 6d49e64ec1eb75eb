//! PromQL for every view the dashboard serves, scoped to one namespace.

use crate::formatting::MetricKind;

/// `(metric_key, query)` for each resource metric, in display order.
pub fn resource_queries(namespace: &str) -> Vec<(String, String)> {
    MetricKind::ALL
        .into_iter()
        .map(|kind| (kind.key().to_string(), resource_query(kind, namespace)))
        .collect()
}

pub fn resource_query(kind: MetricKind, namespace: &str) -> String {
    match kind {
        MetricKind::CpuUsage => format!(
            r#"sum(rate(container_cpu_usage_seconds_total{{namespace="{}"}}[5m])) by (instance, pod)"#,
            namespace
        ),
        MetricKind::MemoryUsage => format!(
            r#"sum(container_memory_usage_bytes{{namespace="{}"}}) by (instance, pod)"#,
            namespace
        ),
        MetricKind::DiskIo => format!(
            r#"sum(rate(container_disk_io_total{{namespace="{}"}}[5m])) by (instance, pod)"#,
            namespace
        ),
        MetricKind::NetworkTraffic => format!(
            r#"sum(rate(container_network_transmit_bytes_total{{namespace="{}"}}[5m])) by (instance, pod)"#,
            namespace
        ),
    }
}

pub fn status_query(namespace: &str) -> String {
    format!(r#"kube_pod_status_phase{{namespace="{}"}}"#, namespace)
}

pub fn pods_query(namespace: &str) -> String {
    format!(r#"kube_pod_info{{namespace="{}"}}"#, namespace)
}

/// Transmit rate for a single pod.
///
/// This is an instant query: callers asking for "the last 24 hours" get the
/// current 5m rate per series, one point each.
pub fn pod_network_query(namespace: &str, pod: &str) -> String {
    format!(
        r#"sum(rate(container_network_transmit_bytes_total{{namespace="{}", pod="{}"}}[5m])) by (instance, pod)"#,
        namespace,
        escape_label_value(pod)
    )
}

/// Pod names arrive from the URL path, so quotes and backslashes are escaped
/// before they land inside a label matcher.
fn escape_label_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
