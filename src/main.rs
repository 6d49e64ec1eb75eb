use pod_metrics_dashboard::{api, logging, metrics, Config};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_logger(config.log_format) {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    metrics::init_metrics();

    if let Err(e) = api::start_dashboard(config).await {
        tracing::error!(error = %e, "Dashboard stopped");
        std::process::exit(1);
    }
}
