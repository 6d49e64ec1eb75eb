use tracing_subscriber::{
    fmt,
    EnvFilter,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "pod_metrics_dashboard=info,tower_http=info";

/// Sets up the logging subscriber for the application.
///
/// `RUST_LOG` overrides the default filter. Returns an error if a global
/// subscriber is already installed.
pub fn init_logger(format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_ansi(true)
                .compact();
            registry.with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_target(true)
                .json()
                .with_current_span(false);
            registry.with(fmt_layer).try_init()
        }
    }
}
