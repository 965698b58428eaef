// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP(S) listener serving the mutating webhook.

use crate::config::{Config, TlsFiles};
use crate::constants::webhook::{HEALTH_PATH, MAX_BODY_BYTES, MUTATE_PATH};
use crate::error::{GatekeeperError, Result};
use crate::injector::AnnotationMatcher;
use crate::webhook::handler::mutate_review;
use bytes::Bytes;
use http::{header, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::rustls::{crypto::ring, ServerConfig};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, instrument, warn};

pub struct WebhookServer {
    bind_address: SocketAddr,
    tls: Option<TlsAcceptor>,
    matcher: Arc<AnnotationMatcher>,
}

impl WebhookServer {
    pub fn new(config: &Config, matcher: AnnotationMatcher) -> Result<Self> {
        let tls = config.webhook_tls.as_ref().map(load_tls).transpose()?;
        Ok(Self {
            bind_address: config.webhook_bind_address,
            tls,
            matcher: Arc::new(matcher),
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_address).await?;
        info!(
            "Admission webhook listening on {} ({})",
            self.bind_address,
            if self.tls.is_some() { "https" } else { "http" }
        );

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            let matcher = self.matcher.clone();
            let tls = self.tls.clone();

            tokio::spawn(async move {
                let result = match tls {
                    Some(acceptor) => match acceptor.accept(stream).await {
                        Ok(stream) => serve(stream, matcher).await,
                        Err(e) => {
                            warn!("TLS handshake with {} failed: {}", peer, e);
                            return;
                        }
                    },
                    None => serve(stream, matcher).await,
                };
                if let Err(e) = result {
                    debug!("Connection from {} closed with error: {}", peer, e);
                }
            });
        }
    }
}

async fn serve<I>(io: I, matcher: Arc<AnnotationMatcher>) -> std::result::Result<(), hyper::Error>
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |req| {
        let matcher = matcher.clone();
        async move { Ok::<_, Infallible>(route(req, &matcher).await) }
    });
    http1::Builder::new()
        .serve_connection(TokioIo::new(io), service)
        .await
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
pub async fn route<B>(req: Request<B>, matcher: &AnnotationMatcher) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match (req.method(), req.uri().path()) {
        (&Method::POST, MUTATE_PATH) => {
            let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) if e.is::<LengthLimitError>() => {
                    warn!("Request body exceeds {} bytes", MAX_BODY_BYTES);
                    return respond(StatusCode::PAYLOAD_TOO_LARGE, "text/plain", "body too large");
                }
                Err(e) => {
                    warn!("Failed to read request body: {}", e);
                    return respond(StatusCode::BAD_REQUEST, "text/plain", "unreadable body");
                }
            };

            let review = mutate_review(&body, matcher);
            match serde_json::to_vec(&review) {
                Ok(json) => respond(StatusCode::OK, "application/json", json),
                Err(e) => {
                    warn!("Failed to encode admission review: {}", e);
                    respond(StatusCode::INTERNAL_SERVER_ERROR, "text/plain", e.to_string())
                }
            }
        }
        (&Method::GET, HEALTH_PATH) => respond(StatusCode::OK, "text/plain", "ok"),
        _ => respond(StatusCode::NOT_FOUND, "text/plain", "not found"),
    }
}

/// Build a TLS acceptor from PEM encoded certificate chain and private key
pub fn load_tls(files: &TlsFiles) -> Result<TlsAcceptor> {
    let open = |path: &std::path::Path| {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| GatekeeperError::Tls(format!("Failed to open {}: {}", path.display(), e)))
    };

    let certs = rustls_pemfile::certs(&mut open(&files.cert_path)?)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| GatekeeperError::Tls(format!("Invalid certificate: {}", e)))?;
    if certs.is_empty() {
        return Err(GatekeeperError::Tls(format!(
            "No certificate found in {}",
            files.cert_path.display()
        )));
    }

    let key = rustls_pemfile::private_key(&mut open(&files.key_path)?)
        .map_err(|e| GatekeeperError::Tls(format!("Invalid private key: {}", e)))?
        .ok_or_else(|| {
            GatekeeperError::Tls(format!(
                "No private key found in {}",
                files.key_path.display()
            ))
        })?;

    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| GatekeeperError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| GatekeeperError::Tls(e.to_string()))?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}
