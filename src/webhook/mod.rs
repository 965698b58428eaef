// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mutating admission webhook injecting the gatekeeper sidecar.

pub mod handler;
pub mod server;

pub use handler::{mutate, mutate_review};
pub use server::WebhookServer;
