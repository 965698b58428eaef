// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Pod annotation keys recognised by the sidecar injector
pub mod annotations {
    /// Opt-in marker; the value names the ConfigMap holding the gatekeeper config.
    /// Suffixed keys (`gatekeeper.gogatekeeper/<suffix>`) carry per-pod overrides.
    pub const PREFIX: &str = "gatekeeper.gogatekeeper";
    /// Suffix importing a ConfigMap as `envFrom`
    pub const EXISTING_ENV: &str = "existingEnv";
    /// Suffix importing a Secret as `envFrom`
    pub const EXISTING_SECRET_ENV: &str = "existingSecretEnv";
}

/// Injected sidecar container settings
pub mod sidecar {
    pub const IMAGE: &str = "quay.io/gogatekeeper/gatekeeper:1.3.4";
    pub const CONTAINER_NAME: &str = "gogatekeeper";
    pub const PORT_NAME: &str = "gatekeeper";
    pub const PORT: i32 = 3000;
    pub const VOLUME_NAME: &str = "gatekeeper-config";
    pub const MOUNT_PATH: &str = "/etc/gatekeeperConfig/";
    /// Path of the config file inside the mounted volume
    pub const CONFIG_PATH: &str = "/etc/gatekeeperConfig/gatekeeper.yaml";
}

/// Generated gatekeeper configuration
pub mod gatekeeper_config {
    /// ConfigMap data key holding the YAML document
    pub const DATA_KEY: &str = "gatekeeper.yaml";
    /// Key derived from `spec.oidcurl`
    pub const DISCOVERY_URL: &str = "discovery-url";

    /// Entries present in every generated config unless the user overrides them
    pub const DEFAULTS: &[(&str, &str)] = &[
        ("upstream-url", "http://127.0.0.1:80"),
        ("listen", ":3000"),
        ("listen-admin", ":4000"),
        ("enable-refresh-tokens", "true"),
        ("secure-cookie", "false"),
    ];
}

/// The operator name used as field manager and in log output
pub const OPERATOR_NAME: &str = "gatekeeper-operator";

/// Reconcile requeue intervals
pub mod requeue {
    /// Requeue after creating a ConfigMap so the controller observes it
    pub const AFTER_CREATE_SECS: u64 = 5;
    /// Requeue after a failed reconcile
    pub const ON_ERROR_SECS: u64 = 60;
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Admission webhook routes
pub mod webhook {
    pub const MUTATE_PATH: &str = "/mutate-v1-pod";
    pub const HEALTH_PATH: &str = "/healthz";
    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9443";
    /// Largest AdmissionReview body accepted
    pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
}
