//! Backend response envelope
//!
//! Every backend endpoint answers `{ success, data, message, error }`.

use crate::error::{BondError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Uniform backend response wrapper
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    pub data: Option<T>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, turning a failed envelope into [`BondError::Api`]
    pub fn into_result(self) -> Result<T> {
        if !self.success {
            let reason = self
                .message
                .or(self.error)
                .unwrap_or_else(|| "API request failed".to_string());
            tracing::debug!(%reason, "backend reported failure");
            return Err(BondError::Api(reason));
        }
        self.data
            .ok_or_else(|| BondError::Api("response carried no data".to_string()))
    }
}

/// Decode a snapshot that is either enveloped or a bare payload
pub fn decode_payload<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let enveloped = value
        .as_object()
        .map(|obj| obj.contains_key("success"))
        .unwrap_or(false);

    if enveloped {
        let response: ApiResponse<T> = serde_json::from_value(value)?;
        response.into_result()
    } else {
        Ok(serde_json::from_value(value)?)
    }
}
