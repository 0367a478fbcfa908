//! Compatibility Shim between the registry and the two response contracts.
//!
//! The service historically shipped two backends with different response
//! conventions. A deployment picks one [`ResponseMode`] at startup and every
//! response goes through the projections here, so the registry itself never
//! looks at the mode.
//!
//! | operation | current                           | legacy                         |
//! |-----------|-----------------------------------|--------------------------------|
//! | create    | 201 `{clientname, uri, private_key}` | 201 payload + same fields   |
//! | update    | 200 `{uri}`                       | payload echo, 201 on rename    |
//! | read      | name, full_name, guid, assigned_at, clientname, org_type | name, full_name |

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use corral_core::models::organization::Organization;
use serde_json::{Map, Value, json};

/// Response contract selected for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Legacy,
    Current,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "current" => Ok(Self::Current),
            other => Err(format!("unknown response mode '{other}', expected legacy or current")),
        }
    }
}

/// Formats registry results for the configured contract.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityShim {
    mode: ResponseMode,
}

impl CompatibilityShim {
    pub fn new(mode: ResponseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    /// Response to a successful create. The private key appears here and
    /// nowhere else.
    pub fn created(
        &self,
        payload: &Map<String, Value>,
        org: &Organization,
        uri: String,
        private_key: String,
    ) -> (StatusCode, Value) {
        let mut body = match self.mode {
            ResponseMode::Current => Map::new(),
            ResponseMode::Legacy => payload.clone(),
        };
        body.insert("clientname".into(), json!(org.validator_client_name));
        body.insert("uri".into(), json!(uri));
        body.insert("private_key".into(), json!(private_key));
        (StatusCode::CREATED, Value::Object(body))
    }

    /// Response to a successful update. `renamed` is whether the unique
    /// name changed.
    pub fn updated(
        &self,
        payload: &Map<String, Value>,
        renamed: bool,
        uri: String,
    ) -> (StatusCode, Value) {
        match self.mode {
            ResponseMode::Current => (StatusCode::OK, json!({ "uri": uri })),
            ResponseMode::Legacy => {
                let status = if renamed {
                    StatusCode::CREATED
                } else {
                    StatusCode::OK
                };
                (status, Value::Object(payload.clone()))
            }
        }
    }

    /// Read projection of an organization.
    pub fn show(&self, org: &Organization) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(org.name));
        body.insert("full_name".into(), json!(org.full_name));

        if self.mode == ResponseMode::Current {
            body.insert("guid".into(), json!(org.guid));
            body.insert("assigned_at".into(), json!(org.assigned_at_display()));
            body.insert("clientname".into(), json!(org.validator_client_name));
            if let Some(org_type) = &org.org_type {
                body.insert("org_type".into(), json!(org_type));
            }
        }
        Value::Object(body)
    }

    /// Response to a successful delete: the removed organization.
    pub fn deleted(&self, org: &Organization) -> (StatusCode, Value) {
        (StatusCode::OK, self.show(org))
    }
}
