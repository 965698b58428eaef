// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Gatekeeper sidecar injection: annotation parsing and pod mutation.

pub mod annotations;
pub mod sidecar;

pub use annotations::{AnnotationDirective, AnnotationKey, AnnotationMatcher, EnvBundle, EnvBundleKind};
pub use sidecar::{inject, Injection};
