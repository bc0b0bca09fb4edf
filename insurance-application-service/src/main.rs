use std::sync::Arc;

use anyhow::Context;
use insurance_application_service::{create_app, create_app_state};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wizard_flow::HttpDeliverer;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "insurance_application_service=debug,wizard_flow=debug,tower_http=debug,axum=info".into()
    });

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let endpoint = match std::env::var("DELIVERY_ENDPOINT") {
        Ok(endpoint) => endpoint,
        Err(_) => {
            error!("DELIVERY_ENDPOINT is not set; nowhere to deliver submitted applications");
            std::process::exit(1);
        }
    };

    let deliverer = Arc::new(HttpDeliverer::new(endpoint));
    let app = create_app(create_app_state(deliverer));

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", port))?;

    info!("Insurance Application Service starting on port {}", port);
    info!(
        "Create a session: POST http://localhost:{}/applications",
        port
    );
    info!("Health check: GET http://localhost:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
