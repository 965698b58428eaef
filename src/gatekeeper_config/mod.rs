// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generation of the gatekeeper config ConfigMap.

pub mod configmap;
pub mod merge;

pub use configmap::build_config_map;
pub use merge::merge_config;
