// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! AdmissionReview handling for the pod mutating webhook.

use crate::error::{GatekeeperError, Result};
use crate::injector::{inject, AnnotationMatcher, Injection};
use k8s_openapi::api::core::v1::Pod;
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview},
    DynamicObject, ResourceExt, Status,
};
use tracing::{debug, info, warn};

/// Message attached to responses for pods that did not opt in
pub const NOT_REQUESTED: &str = "No injection requested";

fn reject(res: AdmissionResponse, code: u16, reason: &str, message: impl ToString) -> AdmissionResponse {
    let mut res = res.deny(message.to_string());
    let mut status = Status::failure(&res.result.message, reason);
    status.code = code;
    res.result = status;
    res
}

/// JSON patch turning `original` into `mutated`
pub fn build_patch(original: &Pod, mutated: &Pod) -> Result<json_patch::Patch> {
    let before = serde_json::to_value(original)
        .map_err(|e| GatekeeperError::Serialization(e.to_string()))?;
    let after = serde_json::to_value(mutated)
        .map_err(|e| GatekeeperError::Serialization(e.to_string()))?;
    Ok(json_patch::diff(&before, &after))
}

/// Decide the response for a single admission request
pub fn mutate(req: &AdmissionRequest<Pod>, matcher: &AnnotationMatcher) -> AdmissionResponse {
    let res = AdmissionResponse::from(req);

    let Some(pod) = req.object.as_ref() else {
        warn!("Admission request {} carries no pod", req.uid);
        return reject(res, 400, "BadRequest", "request has no object");
    };
    // apiserver may not have generated a name yet
    let name = pod.name_any();

    match inject(pod.clone(), matcher) {
        Injection::Skipped(_) => {
            debug!("Pod {} did not request injection", name);
            let mut res = res;
            res.result.message = NOT_REQUESTED.to_string();
            res
        }
        Injection::Mutated(mutated) => {
            let patched = build_patch(pod, &mutated).and_then(|patch| {
                res.clone()
                    .with_patch(patch)
                    .map_err(|e| GatekeeperError::Serialization(e.to_string()))
            });
            match patched {
                Ok(res) => {
                    info!(
                        "Injecting gatekeeper container into pod {} with config map {}",
                        name,
                        matcher.marker(pod.annotations()).unwrap_or_default()
                    );
                    res
                }
                Err(e) => {
                    warn!("Failed to build patch for pod {}: {}", name, e);
                    reject(res, 500, "InternalError", e)
                }
            }
        }
    }
}

/// Decode a raw AdmissionReview body and produce the review to send back.
/// Undecodable input yields a rejection with code 400.
pub fn mutate_review(body: &[u8], matcher: &AnnotationMatcher) -> AdmissionReview<DynamicObject> {
    let review: AdmissionReview<Pod> = match serde_json::from_slice(body) {
        Ok(review) => review,
        Err(e) => {
            warn!("Invalid admission review: {}", e);
            return reject(AdmissionResponse::invalid(""), 400, "BadRequest", e).into_review();
        }
    };

    let req: AdmissionRequest<Pod> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            warn!("Invalid admission review: {}", e);
            return reject(AdmissionResponse::invalid(""), 400, "BadRequest", e).into_review();
        }
    };

    mutate(&req, matcher).into_review()
}
