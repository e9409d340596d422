use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use tally_relay::config::Config;
use tally_relay::logsink::{FileLogSink, LogSink, NoopLogSink};
use tally_relay::mailer::{DisabledMailer, Mailer, SmtpMailer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env().expect("Failed to load configuration");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("Starting tally-relay");

    let mailer: Arc<dyn Mailer> = match config.smtp.as_ref() {
        Some(smtp) => {
            let mailer = SmtpMailer::new(smtp)?;
            tracing::info!("SMTP transport configured for {}", smtp.host);
            Arc::new(mailer)
        }
        None => {
            tracing::warn!("SMTP not configured; webhook deliveries will fail");
            Arc::new(DisabledMailer)
        }
    };

    let log_sink: Arc<dyn LogSink> = if config.debug_logging {
        tracing::info!("Debug logging to {}", config.log_dir.display());
        Arc::new(FileLogSink::new(config.log_dir.clone()))
    } else {
        Arc::new(NoopLogSink)
    };

    if config.recipients.is_empty() {
        tracing::warn!("No recipients configured; webhook deliveries will fail");
    }

    let addr = SocketAddr::new(config.host, config.port);
    let app = tally_relay::build_app(config, mailer, log_sink);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
