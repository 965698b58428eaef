// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gatekeeper_operator::config::Config;
use gatekeeper_operator::injector::AnnotationMatcher;
use gatekeeper_operator::kubernetes::wait_for_gatekeeper_crd;
use gatekeeper_operator::reconcilers::GatekeeperReconciler;
use gatekeeper_operator::webhook::WebhookServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting gatekeeper operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: webhook_bind_address={}, tls={}, annotation_prefix={}",
        config.webhook_bind_address,
        config.webhook_tls.is_some(),
        config.annotation_prefix
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    if config.wait_for_crd {
        info!("Waiting for Gogatekeeper CRD to become available...");
        wait_for_gatekeeper_crd(&client).await?;
    }

    let webhook = WebhookServer::new(&config, AnnotationMatcher::new(config.annotation_prefix.clone()))?;
    let reconciler = GatekeeperReconciler::new(client);

    info!("Starting reconciler and admission webhook...");

    tokio::try_join!(reconciler.run(), webhook.run())?;

    // This should never be reached as both tasks run forever
    warn!("Reconciler and webhook stopped unexpectedly");
    Ok(())
}
