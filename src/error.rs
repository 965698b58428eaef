// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatekeeperError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Object is missing {0}")]
    MissingObjectKey(&'static str),

    #[error("TLS setup failed: {0}")]
    Tls(String),
}

pub type Result<T> = std::result::Result<T, GatekeeperError>;
