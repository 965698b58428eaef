// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builds the gatekeeper sidecar and appends it to a pod.

use crate::constants::sidecar;
use crate::injector::annotations::{AnnotationDirective, AnnotationMatcher, EnvBundle, EnvBundleKind};
use k8s_openapi::api::core::v1::{
    ConfigMapEnvSource, ConfigMapVolumeSource, Container, ContainerPort, EnvFromSource, Pod,
    SecretEnvSource, Volume, VolumeMount,
};
use tracing::debug;

/// Result of running the injector over a pod
#[derive(Debug, Clone, PartialEq)]
pub enum Injection {
    /// No opt-in marker, pod returned untouched
    Skipped(Pod),
    Mutated(Pod),
}

impl Injection {
    pub fn is_mutated(&self) -> bool {
        matches!(self, Injection::Mutated(_))
    }

    pub fn into_pod(self) -> Pod {
        match self {
            Injection::Skipped(pod) | Injection::Mutated(pod) => pod,
        }
    }
}

/// Inject the gatekeeper sidecar if the pod carries the opt-in marker.
/// Existing containers, volumes and metadata are never modified.
pub fn inject(mut pod: Pod, matcher: &AnnotationMatcher) -> Injection {
    let Some(annotations) = pod.metadata.annotations.as_ref() else {
        return Injection::Skipped(pod);
    };
    let Some(config_map) = matcher.marker(annotations).map(str::to_string) else {
        return Injection::Skipped(pod);
    };

    let directive = matcher.interpret(annotations);
    debug!(
        "Injecting gatekeeper with {} flags and {} env bundles",
        directive.cli_flags.len(),
        directive.env_bundles.len()
    );

    let spec = pod.spec.get_or_insert_with(Default::default);
    spec.containers.push(build_container(&directive));
    spec.volumes
        .get_or_insert_with(Vec::new)
        .push(build_config_volume(&config_map));

    Injection::Mutated(pod)
}

/// Container args: `--config <path>` followed by every flag from the directive
pub fn container_args(directive: &AnnotationDirective) -> Vec<String> {
    let mut args = vec!["--config".to_string(), sidecar::CONFIG_PATH.to_string()];
    for (flag, value) in &directive.cli_flags {
        args.push(format!("--{}", flag));
        args.push(value.clone());
    }
    args
}

fn env_from(bundle: &EnvBundle) -> EnvFromSource {
    match bundle.kind {
        EnvBundleKind::ConfigMap => EnvFromSource {
            config_map_ref: Some(ConfigMapEnvSource {
                name: bundle.name.clone(),
                ..Default::default()
            }),
            ..Default::default()
        },
        EnvBundleKind::Secret => EnvFromSource {
            secret_ref: Some(SecretEnvSource {
                name: bundle.name.clone(),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

pub fn build_container(directive: &AnnotationDirective) -> Container {
    let env_from: Vec<EnvFromSource> = directive.env_bundles.iter().map(env_from).collect();

    Container {
        name: sidecar::CONTAINER_NAME.to_string(),
        image: Some(sidecar::IMAGE.to_string()),
        args: Some(container_args(directive)),
        env_from: (!env_from.is_empty()).then_some(env_from),
        ports: Some(vec![ContainerPort {
            name: Some(sidecar::PORT_NAME.to_string()),
            container_port: sidecar::PORT,
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: sidecar::VOLUME_NAME.to_string(),
            mount_path: sidecar::MOUNT_PATH.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

pub fn build_config_volume(config_map: &str) -> Volume {
    Volume {
        name: sidecar::VOLUME_NAME.to_string(),
        config_map: Some(ConfigMapVolumeSource {
            name: config_map.to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}
