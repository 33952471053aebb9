//! Response envelope middleware.
//!
//! Every JSON response under `/api` is rewritten into the uniform shape
//! `{success, data, error, code?, details?, duration, timestamp}`. Bodies
//! that already carry the envelope pass through byte-identical, as do
//! non-JSON success bodies (the CSV template).

use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// The standard response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Handler time in milliseconds.
    pub duration: u64,
    /// RFC 3339 time the envelope was built.
    pub timestamp: String,
}

impl Envelope {
    /// Wrap a parsed JSON body returned with `status`.
    ///
    /// On failure `error`, `code` and `details` are lifted out of an object
    /// body and whatever fields remain become `data`.
    pub fn wrap(status: StatusCode, body: Value, duration: u64) -> Self {
        let success = is_success(status);
        if success {
            return Self::build(true, body, None, None, None, duration);
        }

        match body {
            Value::Object(mut fields) => {
                let error = match fields.remove("error") {
                    Some(Value::String(s)) => s,
                    Some(Value::Null) | None => default_error(status),
                    Some(other) => other.to_string(),
                };
                let code = fields.remove("code");
                let details = fields.remove("details");
                fields.remove("success");
                let data = if fields.is_empty() {
                    Value::Null
                } else {
                    Value::Object(fields)
                };
                Self::build(false, data, Some(error), code, details, duration)
            }
            other => Self::build(false, other, Some(default_error(status)), None, None, duration),
        }
    }

    /// Wrap a plain-text error body.
    pub fn text_error(status: StatusCode, text: &str, duration: u64) -> Self {
        let text = text.trim();
        let error = if text.is_empty() {
            default_error(status)
        } else {
            text.to_string()
        };
        Self::build(false, Value::Null, Some(error), None, None, duration)
    }

    fn build(
        success: bool,
        data: Value,
        error: Option<String>,
        code: Option<Value>,
        details: Option<Value>,
        duration: u64,
    ) -> Self {
        Self {
            success,
            data,
            error,
            code,
            details,
            duration,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Whether a body already has the envelope shape.
pub fn is_enveloped(body: &Value) -> bool {
    body.get("success").is_some_and(Value::is_boolean) && body.get("timestamp").is_some()
}

fn is_success(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

fn default_error(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Middleware entry point, installed with `axum::middleware::from_fn`.
pub async fn envelope(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let response = next.run(request).await;
    let duration = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let json = is_json(&response);
    let status = response.status();
    if !json && is_success(status) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response body");
            parts.status = StatusCode::INTERNAL_SERVER_ERROR;
            let envelope = Envelope::text_error(parts.status, "", duration);
            return finish(parts, &envelope);
        }
    };

    let envelope = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) if json && is_enveloped(&value) => {
            return Response::from_parts(parts, Body::from(bytes));
        }
        Ok(value) if json => Envelope::wrap(status, value, duration),
        _ => Envelope::text_error(status, &String::from_utf8_lossy(&bytes), duration),
    };
    finish(parts, &envelope)
}

fn finish(mut parts: axum::http::response::Parts, envelope: &Envelope) -> Response {
    let body = match serde_json::to_vec(envelope) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response envelope");
            parts.status = StatusCode::INTERNAL_SERVER_ERROR;
            br#"{"success":false,"data":null,"error":"An internal error occurred"}"#.to_vec()
        }
    };
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(body))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
