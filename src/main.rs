mod config;
mod dto;
mod handlers;
mod provider;
mod service;

use std::{env, sync::Arc};

use handlers::rest;
use service::EmailService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to locate or load config: {e}");
    });
    tracing::info!("Successfully loaded email relay config");

    // Provider is built once and shared by every request
    let provider = provider::from_config(&cfg.provider)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to set up email provider: {e}");
            panic!("failed to set up email provider: {e}");
        });

    let service = Arc::new(EmailService::new(provider));

    // Running inside AWS Lambda behind API Gateway
    if env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        tracing::info!("Lambda runtime detected, serving API Gateway events");
        if let Err(e) = lambda_http::run(rest::lambda_router(service)).await {
            tracing::error!("Lambda runtime error: {e}");
            panic!("lambda runtime failed: {e}");
        }
        return;
    }

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to port {}: {e}", cfg.port);
            panic!("failed to bind to port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Email relay starting, listening on {}", addr),
        Err(e) => tracing::warn!("Email relay starting, local address unavailable: {e}"),
    }

    if let Err(e) = axum::serve(listener, rest::router(service)).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}
