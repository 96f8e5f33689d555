pub mod config;
pub mod core;
pub mod distribution;
pub mod domain;
pub mod issuance;
pub mod storage;

use aws_config::BehaviorVersion;
use lambda_runtime::{LambdaEvent, service_fn};
use log::info;
use serde_json::Value;

use crate::core::{
    orchestrator::{Services, run_invocation},
    scratch::ScratchLayout,
};
use crate::distribution::notify::SnsPublisher;
use crate::issuance::certbot::{CertbotIssuer, DEFAULT_CERTBOT_BIN, ENV_CERTBOT_BIN};
use crate::storage::S3Store;

/// Lambda bootstrap: wires the AWS clients and certbot once, then serves events.
pub async fn run() -> Result<(), lambda_runtime::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let layout = ScratchLayout::default();
    let store = S3Store::new(&aws_config);
    let publisher = SnsPublisher::new(&aws_config);
    let certbot_bin = std::env::var(ENV_CERTBOT_BIN)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CERTBOT_BIN.to_string());
    let issuer = CertbotIssuer::new(certbot_bin, layout.clone());
    info!("[bootstrap] using certbot at {}", issuer.program());

    let services = Services {
        store: &store,
        issuer: &issuer,
        publisher: &publisher,
    };
    let services = &services;
    let layout = &layout;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_event(event, services, layout).await
    }))
    .await
}

async fn handle_event(
    event: LambdaEvent<Value>,
    services: &Services<'_>,
    layout: &ScratchLayout,
) -> Result<Value, lambda_runtime::Error> {
    // The triggering payload carries nothing this function reads.
    let (_payload, context) = event.into_parts();
    info!("[invocation] request {}", context.request_id);

    let mut stdout = std::io::stdout();
    let summary = run_invocation(
        |name| std::env::var(name).ok(),
        services,
        layout,
        &mut stdout,
    )
    .await?;
    Ok(serde_json::to_value(summary)?)
}
