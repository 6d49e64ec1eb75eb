//! Human-readable rendering of raw metric values.

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// The metrics the dashboard knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    CpuUsage,
    MemoryUsage,
    DiskIo,
    NetworkTraffic,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::CpuUsage,
        MetricKind::MemoryUsage,
        MetricKind::DiskIo,
        MetricKind::NetworkTraffic,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "cpu_usage",
            MetricKind::MemoryUsage => "memory_usage",
            MetricKind::DiskIo => "disk_io",
            MetricKind::NetworkTraffic => "network_traffic",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn format(self, value: f64) -> String {
        match self {
            MetricKind::CpuUsage => format_cpu_usage(value),
            MetricKind::MemoryUsage | MetricKind::NetworkTraffic => bytes_to_human(value),
            MetricKind::DiskIo => format_io(value),
        }
    }
}

pub fn format_cpu_usage(value: f64) -> String {
    format!("{:.2} cores", value)
}

/// Binary units, labelled B/KB/MB/GB.
pub fn bytes_to_human(value: f64) -> String {
    if value < KIB {
        format!("{:.2} B", value)
    } else if value < MIB {
        format!("{:.2} KB", value / KIB)
    } else if value < GIB {
        format!("{:.2} MB", value / MIB)
    } else {
        format!("{:.2} GB", value / GIB)
    }
}

pub fn format_io(value: f64) -> String {
    format!("{:.2} I/O", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_thresholds() {
        assert_eq!(bytes_to_human(0.0), "0.00 B");
        assert_eq!(bytes_to_human(1023.0), "1023.00 B");
        assert_eq!(bytes_to_human(1024.0), "1.00 KB");
        assert_eq!(bytes_to_human(1048575.0), "1024.00 KB");
        assert_eq!(bytes_to_human(1048576.0), "1.00 MB");
        assert_eq!(bytes_to_human(1073741824.0), "1.00 GB");
        assert_eq!(bytes_to_human(5.0 * 1073741824.0 * 1024.0), "5120.00 GB");
    }

    #[test]
    fn test_bytes_fractions() {
        assert_eq!(bytes_to_human(1536.0), "1.50 KB");
        assert_eq!(bytes_to_human(2097152.0), "2.00 MB");
        assert_eq!(bytes_to_human(12.5), "12.50 B");
    }

    #[test]
    fn test_cpu_and_io() {
        assert_eq!(format_cpu_usage(0.5), "0.50 cores");
        assert_eq!(format_cpu_usage(0.0), "0.00 cores");
        assert_eq!(format_cpu_usage(3.14159), "3.14 cores");
        assert_eq!(format_io(12.345), "12.35 I/O");
        assert_eq!(format_io(7.0), "7.00 I/O");
    }

    #[test]
    fn test_kind_dispatch() {
        assert_eq!(MetricKind::from_key("cpu_usage"), Some(MetricKind::CpuUsage));
        assert_eq!(MetricKind::from_key("bogus"), None);

        assert_eq!(MetricKind::CpuUsage.format(1.0), "1.00 cores");
        assert_eq!(MetricKind::MemoryUsage.format(2048.0), "2.00 KB");
        assert_eq!(MetricKind::NetworkTraffic.format(100.0), "100.00 B");
        assert_eq!(MetricKind::DiskIo.format(0.75), "0.75 I/O");
    }
}
