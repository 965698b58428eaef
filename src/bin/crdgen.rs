// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Prints the Gogatekeeper CustomResourceDefinition as YAML.

use gatekeeper_operator::types::Gogatekeeper;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Gogatekeeper::crd())?);
    Ok(())
}
