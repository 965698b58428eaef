// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ConfigMap artifact generated for each Gogatekeeper.

use crate::constants::gatekeeper_config::{DATA_KEY, DISCOVERY_URL};
use crate::error::{GatekeeperError, Result};
use crate::gatekeeper_config::merge::merge_config;
use crate::types::Gogatekeeper;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{api::ObjectMeta, Resource, ResourceExt};
use std::collections::BTreeMap;

/// Build the ConfigMap for a gatekeeper: same name and namespace, controlled by
/// the gatekeeper so it is garbage collected together with it.
pub fn build_config_map(gatekeeper: &Gogatekeeper) -> Result<ConfigMap> {
    let namespace = gatekeeper
        .namespace()
        .ok_or(GatekeeperError::MissingObjectKey("metadata.namespace"))?;
    // Requires name and uid, both set on any object read back from the API server
    let owner = gatekeeper
        .controller_owner_ref(&())
        .ok_or(GatekeeperError::MissingObjectKey("metadata.uid"))?;

    let document = merge_config(
        &[(DISCOVERY_URL, gatekeeper.discovery_url())],
        gatekeeper.user_config(),
    )?;

    Ok(ConfigMap {
        metadata: ObjectMeta {
            name: Some(gatekeeper.name_any()),
            namespace: Some(namespace),
            owner_references: Some(vec![owner]),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(DATA_KEY.to_string(), document)])),
        ..Default::default()
    })
}
