// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::annotations;
use crate::constants::webhook::DEFAULT_BIND_ADDRESS;
use anyhow::{bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// PEM files used to terminate TLS on the webhook listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the admission webhook listens on
    pub webhook_bind_address: SocketAddr,
    /// Serve plain HTTP when unset
    pub webhook_tls: Option<TlsFiles>,
    /// Annotation prefix pods use to opt in to injection
    pub annotation_prefix: String,
    pub wait_for_crd: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("WEBHOOK_BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let webhook_bind_address: SocketAddr = bind
            .parse()
            .with_context(|| format!("WEBHOOK_BIND_ADDRESS is not a socket address: {}", bind))?;

        let webhook_tls = match (lookup("WEBHOOK_TLS_CERT"), lookup("WEBHOOK_TLS_KEY")) {
            (Some(cert), Some(key)) => Some(TlsFiles {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => bail!("WEBHOOK_TLS_CERT and WEBHOOK_TLS_KEY must be set together"),
        };

        let annotation_prefix = lookup("ANNOTATION_PREFIX")
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| annotations::PREFIX.to_string());

        let wait_for_crd: bool = lookup("WAIT_FOR_CRD")
            .unwrap_or("true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Config {
            webhook_bind_address,
            webhook_tls,
            annotation_prefix,
            wait_for_crd,
        })
    }
}
