// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Desired state of a gatekeeper deployment
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "gatekeeper.adstein",
    version = "v1alpha1",
    kind = "Gogatekeeper",
    plural = "gogatekeepers"
)]
#[kube(namespaced)]
#[kube(status = "GogatekeeperStatus")]
#[serde(rename_all = "camelCase")]
pub struct GogatekeeperSpec {
    /// OIDC discovery URL of the identity provider
    pub oidcurl: String,
    /// Free-form gatekeeper YAML merged into the generated config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct GogatekeeperStatus {}

impl Gogatekeeper {
    pub fn discovery_url(&self) -> &str {
        &self.spec.oidcurl
    }

    /// User supplied config, if any non-blank document was given
    pub fn user_config(&self) -> Option<&str> {
        self.spec
            .config
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}
