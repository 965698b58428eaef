// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::Gogatekeeper;
use kube::{Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the Gogatekeeper CRD to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_gatekeeper_crd(client: &Client) -> Result<()> {
    let api_version = Gogatekeeper::api_version(&());
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_gatekeeper_crd_exists(client).await {
            Ok(true) => {
                info!("Gogatekeeper CRD ({}) is available", api_version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "Gogatekeeper CRD ({}) not yet available, waiting {} seconds...",
                    api_version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for Gogatekeeper CRD: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if the Gogatekeeper CRD is served by listing its group version.
pub async fn check_gatekeeper_crd_exists(client: &Client) -> Result<bool> {
    let api_version = Gogatekeeper::api_version(&());
    let kind = Gogatekeeper::kind(&());

    match client.list_api_group_resources(&api_version).await {
        Ok(list) => Ok(list.resources.iter().any(|r| r.kind == kind)),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(e.into()),
    }
}
