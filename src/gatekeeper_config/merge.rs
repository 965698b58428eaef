// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Merging of the generated gatekeeper config with user supplied YAML.

use crate::constants::gatekeeper_config::DEFAULTS;
use crate::error::{GatekeeperError, Result};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

/// Parse a user document into a mapping. Anything unusable yields `None`.
fn parse_user_config(user: &str) -> Option<Mapping> {
    if user.trim().is_empty() {
        return None;
    }

    match serde_yaml::from_str::<Value>(user) {
        Ok(Value::Mapping(mapping)) => Some(mapping),
        Ok(Value::Null) => None,
        Ok(other) => {
            warn!(
                "User config is not a YAML mapping ({}), using generated config only",
                kind_of(&other)
            );
            None
        }
        Err(e) => {
            warn!("User config is not valid YAML, using generated config only: {}", e);
            None
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// `true`/`false` become YAML booleans so gatekeeper reads them as flags
fn scalar(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

/// Build the gatekeeper YAML document.
///
/// Precedence, lowest first: built-in defaults, the user document, `mandatory`.
/// Entries are keyed, so a key never appears twice in the output. A user
/// document that is empty or unparseable is ignored.
pub fn merge_config(mandatory: &[(&str, &str)], user: Option<&str>) -> Result<String> {
    let mut merged = Mapping::new();

    for (key, value) in DEFAULTS {
        merged.insert(Value::from(*key), scalar(value));
    }

    if let Some(user) = user.and_then(parse_user_config) {
        debug!("Merging {} user config entries", user.len());
        for (key, value) in user {
            merged.insert(key, value);
        }
    }

    for (key, value) in mandatory {
        merged.insert(Value::from(*key), scalar(value));
    }

    serde_yaml::to_string(&merged).map_err(|e| GatekeeperError::Serialization(e.to_string()))
}
