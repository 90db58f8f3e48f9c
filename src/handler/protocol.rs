use serde::{Deserialize, Serialize};

use super::Handler;

/// Request read from stdin by `crush json`.
///
/// `{"input": "aabcccbbad"}`. A missing or `null` input is passed on as
/// absent and rejected by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct JsonRequest {
    #[serde(default)]
    pub input: Option<String>,
}

/// Response written to stdout by `crush json`.
///
/// Two shapes:
/// - **Success**: `{"output": "d", "removed": 9}`
/// - **Error**: `{"error": "no input string supplied"}`
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JsonResponse {
    Success { output: String, removed: usize },
    Error { error: String },
}

impl JsonResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

/// Parse a raw JSON payload, run it through the handler, and build the
/// response. Failures are reported in-band as [`JsonResponse::Error`].
///
/// Blank payloads count as an empty input string.
pub fn respond(handler: &Handler, raw: &str) -> JsonResponse {
    let request = if raw.trim().is_empty() {
        JsonRequest {
            input: Some(String::new()),
        }
    } else {
        match serde_json::from_str::<JsonRequest>(raw) {
            Ok(request) => request,
            Err(error) => return JsonResponse::error(format!("invalid request JSON: {error}")),
        }
    };

    match handler.handle(request.input.as_deref()) {
        Ok(response) => JsonResponse::Success {
            output: response.output,
            removed: response.removed_chars,
        },
        Err(error) => JsonResponse::error(error.to_string()),
    }
}
