// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Gogatekeeper reconciler - makes sure every gatekeeper has its config ConfigMap.

use crate::constants::{requeue, OPERATOR_NAME};
use crate::error::{GatekeeperError, Result};
use crate::gatekeeper_config::build_config_map;
use crate::types::Gogatekeeper;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    api::PostParams,
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// What a single reconcile pass found or did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The gatekeeper no longer exists
    ResourceMissing,
    /// The ConfigMap already exists; it is never updated
    ConfigPresent,
    ConfigCreated,
}

impl ReconcileOutcome {
    pub fn action(self) -> Action {
        match self {
            ReconcileOutcome::ConfigCreated => {
                Action::requeue(Duration::from_secs(requeue::AFTER_CREATE_SECS))
            }
            ReconcileOutcome::ResourceMissing | ReconcileOutcome::ConfigPresent => {
                Action::await_change()
            }
        }
    }
}

/// Create the gatekeeper's ConfigMap unless it already exists
#[instrument(skip(client))]
pub async fn ensure_config(client: &Client, namespace: &str, name: &str) -> Result<ReconcileOutcome> {
    let gatekeepers: Api<Gogatekeeper> = Api::namespaced(client.clone(), namespace);

    let Some(gatekeeper) = gatekeepers.get_opt(name).await? else {
        info!("Gogatekeeper {}/{} not found, ignoring", namespace, name);
        return Ok(ReconcileOutcome::ResourceMissing);
    };

    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);

    match config_maps.get(name).await {
        Ok(_) => {
            debug!("ConfigMap {}/{} already exists", namespace, name);
            Ok(ReconcileOutcome::ConfigPresent)
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            let config_map = build_config_map(&gatekeeper)?;
            info!("Creating gatekeeper ConfigMap {}/{}", namespace, name);

            let pp = PostParams {
                field_manager: Some(OPERATOR_NAME.to_string()),
                ..Default::default()
            };
            config_maps.create(&pp, &config_map).await.map_err(|e| {
                error!("Failed to create ConfigMap {}/{}: {}", namespace, name, e);
                e
            })?;

            info!("ConfigMap {}/{} created successfully", namespace, name);
            Ok(ReconcileOutcome::ConfigCreated)
        }
        Err(e) => {
            error!("Failed to get ConfigMap {}/{}: {}", namespace, name, e);
            Err(e.into())
        }
    }
}

pub struct GatekeeperReconciler {
    client: Client,
}

impl GatekeeperReconciler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let gatekeepers: Api<Gogatekeeper> = Api::all(self.client.clone());
        let config_maps: Api<ConfigMap> = Api::all(self.client.clone());
        let context = Arc::new(self);

        // Owned ConfigMaps map back to their gatekeeper, so deleting one recreates it
        Controller::new(gatekeepers, watcher::Config::default())
            .owns(config_maps, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled gatekeeper: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(gatekeeper: Arc<Gogatekeeper>, ctx: Arc<GatekeeperReconciler>) -> Result<Action> {
    let name = gatekeeper.name_any();
    let namespace = gatekeeper
        .namespace()
        .ok_or(GatekeeperError::MissingObjectKey("metadata.namespace"))?;

    debug!("Reconciling gatekeeper: {}/{}", namespace, name);

    let outcome = ensure_config(&ctx.client, &namespace, &name).await?;
    Ok(outcome.action())
}

fn error_policy(
    _gatekeeper: Arc<Gogatekeeper>,
    error: &GatekeeperError,
    _ctx: Arc<GatekeeperReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(requeue::ON_ERROR_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{config_map_json, gatekeeper_json, status_json, MockService};

    const GATEKEEPER_PATH: &str = "/apis/gatekeeper.adstein/v1alpha1/namespaces/ns1/gogatekeepers/demo";
    const CONFIG_MAP_PATH: &str = "/api/v1/namespaces/ns1/configmaps/demo";
    const CONFIG_MAPS_PATH: &str = "/api/v1/namespaces/ns1/configmaps";
    const OIDC: &str = "https://idp.example/.well-known";

    #[tokio::test]
    async fn test_creates_missing_config_map() {
        let mock = MockService::new()
            .on_get(GATEKEEPER_PATH, 200, &gatekeeper_json("demo", "ns1", OIDC, None))
            .on_post(CONFIG_MAPS_PATH, 201, &config_map_json("demo", "ns1"));

        let outcome = ensure_config(&mock.client(), "ns1", "demo").await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::ConfigCreated);
        assert_eq!(
            outcome.action(),
            Action::requeue(Duration::from_secs(requeue::AFTER_CREATE_SECS))
        );

        let posts = mock.requests_with_method("POST");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, CONFIG_MAPS_PATH);

        let created = posts[0].json();
        assert_eq!(created["metadata"]["name"], "demo");
        assert_eq!(created["metadata"]["namespace"], "ns1");
        assert_eq!(created["metadata"]["ownerReferences"][0]["uid"], "test-uid");
        assert_eq!(created["metadata"]["ownerReferences"][0]["kind"], "Gogatekeeper");

        let document = created["data"]["gatekeeper.yaml"].as_str().unwrap();
        let doc: serde_yaml::Mapping = serde_yaml::from_str(document).unwrap();
        assert_eq!(doc.get("discovery-url").and_then(|v| v.as_str()), Some(OIDC));
        for key in [
            "upstream-url",
            "listen",
            "listen-admin",
            "enable-refresh-tokens",
            "secure-cookie",
        ] {
            assert!(doc.contains_key(key), "missing default {}", key);
        }
    }

    #[tokio::test]
    async fn test_merges_user_config_on_create() {
        let mock = MockService::new()
            .on_get(
                GATEKEEPER_PATH,
                200,
                &gatekeeper_json("demo", "ns1", OIDC, Some("client-id: portal\n")),
            )
            .on_post(CONFIG_MAPS_PATH, 201, &config_map_json("demo", "ns1"));

        ensure_config(&mock.client(), "ns1", "demo").await.unwrap();

        let created = mock.requests_with_method("POST")[0].json();
        let document = created["data"]["gatekeeper.yaml"].as_str().unwrap();
        let doc: serde_yaml::Mapping = serde_yaml::from_str(document).unwrap();
        assert_eq!(doc.get("client-id").and_then(|v| v.as_str()), Some("portal"));
        assert_eq!(doc.get("discovery-url").and_then(|v| v.as_str()), Some(OIDC));
    }

    #[tokio::test]
    async fn test_existing_config_map_is_left_alone() {
        let mock = MockService::new()
            .on_get(GATEKEEPER_PATH, 200, &gatekeeper_json("demo", "ns1", OIDC, None))
            .on_get(CONFIG_MAP_PATH, 200, &config_map_json("demo", "ns1"));

        let outcome = ensure_config(&mock.client(), "ns1", "demo").await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::ConfigPresent);
        assert_eq!(outcome.action(), Action::await_change());
        assert!(mock.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_missing_gatekeeper_is_ignored() {
        let mock = MockService::new();

        let outcome = ensure_config(&mock.client(), "ns1", "demo").await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::ResourceMissing);
        assert_eq!(outcome.action(), Action::await_change());
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_gatekeeper_lookup_failure_is_returned() {
        let mock = MockService::new().on_get(
            GATEKEEPER_PATH,
            500,
            &status_json(500, "InternalError", "etcd unavailable"),
        );

        let err = ensure_config(&mock.client(), "ns1", "demo").await.unwrap_err();

        assert!(matches!(err, GatekeeperError::KubeError(kube::Error::Api(ref e)) if e.code == 500));
        assert_eq!(mock.requests().len(), 1);
        assert!(mock.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_config_map_lookup_failure_is_returned() {
        let mock = MockService::new()
            .on_get(GATEKEEPER_PATH, 200, &gatekeeper_json("demo", "ns1", OIDC, None))
            .on_get(
                CONFIG_MAP_PATH,
                403,
                &status_json(403, "Forbidden", "configmaps \"demo\" is forbidden"),
            );

        let err = ensure_config(&mock.client(), "ns1", "demo").await.unwrap_err();

        assert!(matches!(err, GatekeeperError::KubeError(kube::Error::Api(ref e)) if e.code == 403));
        assert!(mock.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_returned() {
        let mock = MockService::new()
            .on_get(GATEKEEPER_PATH, 200, &gatekeeper_json("demo", "ns1", OIDC, None))
            .on_post(
                CONFIG_MAPS_PATH,
                500,
                &status_json(500, "InternalError", "etcd unavailable"),
            );

        let err = ensure_config(&mock.client(), "ns1", "demo").await.unwrap_err();

        assert!(matches!(err, GatekeeperError::KubeError(_)));
    }
}
