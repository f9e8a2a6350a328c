use std::sync::{Arc, Mutex};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::Settings;
use crate::interfaces::http::{add_log, start_server, LogEntry};

/// `RUST_LOG` wins over the configured filter when set
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load settings, set up logging and serve until shutdown
pub async fn setup() -> std::io::Result<()> {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            init_tracing("info");
            error!(error = %err, "Failed to load settings");
            return Err(std::io::Error::other(err.to_string()));
        }
    };
    init_tracing(&settings.log_filter);

    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let (host, port) = settings.bind_address();

    let server = start_server(Arc::new(settings), logs.clone()).map_err(|err| {
        error!(error = %err, host = %host, port, "Failed to bind HTTP server");
        err
    })?;

    add_log(
        &logs,
        "INFO",
        "Server",
        &format!("Listening on http://{}:{}", host, port),
    );
    info!(host = %host, port, "Device identifier extractor listening");

    server.await
}
