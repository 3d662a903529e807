use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ComposerError, Result};

/// Opaque session credential issued by the auth service.
///
/// Only presence matters to this service; the payload is handed to the
/// editor as-is, with the protocol flag `v2: true` added on issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCredential(Map<String, Value>);

impl SessionCredential {
    /// Wrap an auth service response body
    pub fn issue(response: Value) -> Result<Self> {
        match response {
            Value::Object(mut map) => {
                map.insert("v2".to_string(), Value::Bool(true));
                Ok(Self(map))
            }
            other => Err(ComposerError::Auth(format!(
                "expected a JSON object from the auth service, got {}",
                other
            ))),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
