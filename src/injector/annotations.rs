// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod annotation parsing for the sidecar injector.
//!
//! Supported annotations, for the default prefix `gatekeeper.gogatekeeper`:
//! - `gatekeeper.gogatekeeper: <configmap>` opts the pod in
//! - `gatekeeper.gogatekeeper/existingEnv: <configmap>` imports a ConfigMap as `envFrom`
//! - `gatekeeper.gogatekeeper/existingSecretEnv: <secret>` imports a Secret as `envFrom`
//! - `gatekeeper.gogatekeeper/<flag>: <value>` passes `--<flag> <value>` to gatekeeper

use crate::constants::annotations;
use std::collections::BTreeMap;

/// Source kind of an environment bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvBundleKind {
    ConfigMap,
    Secret,
}

/// A ConfigMap or Secret imported wholesale into the sidecar environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBundle {
    pub kind: EnvBundleKind,
    pub name: String,
}

/// Classification of a single annotation key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKey<'a> {
    /// The bare prefix
    Marker,
    EnvImport(EnvBundleKind),
    Flag(&'a str),
}

/// Everything the suffixed annotations of a pod ask for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationDirective {
    /// `(flag, value)` pairs, flag without leading dashes
    pub cli_flags: Vec<(String, String)>,
    pub env_bundles: Vec<EnvBundle>,
}

/// Matches annotation keys against a fixed prefix
#[derive(Debug, Clone)]
pub struct AnnotationMatcher {
    prefix: String,
}

impl Default for AnnotationMatcher {
    fn default() -> Self {
        Self::new(annotations::PREFIX)
    }
}

impl AnnotationMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn classify<'a>(&self, key: &'a str) -> Option<AnnotationKey<'a>> {
        let rest = key.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            return Some(AnnotationKey::Marker);
        }

        match rest.strip_prefix('/')? {
            "" => None,
            annotations::EXISTING_ENV => Some(AnnotationKey::EnvImport(EnvBundleKind::ConfigMap)),
            annotations::EXISTING_SECRET_ENV => Some(AnnotationKey::EnvImport(EnvBundleKind::Secret)),
            flag => Some(AnnotationKey::Flag(flag)),
        }
    }

    /// Value of the opt-in marker, if the pod carries it
    pub fn marker<'a>(&self, annotations: &'a BTreeMap<String, String>) -> Option<&'a str> {
        annotations.get(&self.prefix).map(String::as_str)
    }

    /// Collect the directive from all matching annotations; unrelated keys are ignored
    pub fn interpret(&self, annotations: &BTreeMap<String, String>) -> AnnotationDirective {
        let mut directive = AnnotationDirective::default();

        for (key, value) in annotations {
            match self.classify(key) {
                Some(AnnotationKey::EnvImport(kind)) => directive.env_bundles.push(EnvBundle {
                    kind,
                    name: value.clone(),
                }),
                Some(AnnotationKey::Flag(flag)) => {
                    directive.cli_flags.push((flag.to_string(), value.clone()))
                }
                Some(AnnotationKey::Marker) | None => {}
            }
        }

        directive
    }
}
