//! Request body extractors.
//!
//! [`AppJson`] replaces `axum::Json` on the request side so that a body with
//! a wrong-typed or missing field is rejected as a field-level validation
//! error (`400`, `VALIDATION_ERROR`, `details`) instead of axum's plain-text
//! `422`.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use spiral_core::error::CoreError;
use spiral_core::validation::FieldError;

use crate::error::AppError;

/// JSON request body extractor with API-shaped rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(AppError::Rejected(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;
        parse_json(&bytes).map(AppJson)
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Deserialize a JSON body, tracking the path of the value that failed.
///
/// Malformed JSON is a `BAD_REQUEST`. A well-formed body whose values do not
/// fit the target type becomes [`CoreError::InvalidFields`] naming the field.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        match inner.classify() {
            Category::Data => {
                AppError::Core(CoreError::InvalidFields(vec![field_error(&path, &inner)]))
            }
            Category::Syntax | Category::Eof | Category::Io => {
                AppError::BadRequest(format!("Invalid JSON body: {inner}"))
            }
        }
    })
}

fn field_error(path: &str, err: &serde_json::Error) -> FieldError {
    let text = err.to_string();
    let message = text
        .rsplit_once(" at line ")
        .map_or(text.as_str(), |(message, _)| message);

    // A missing field is reported against its parent, so name the field.
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(name, _)| name);
    let field = match (path, missing) {
        (".", Some(name)) => name.to_string(),
        (parent, Some(name)) => format!("{parent}.{name}"),
        (".", None) => "body".to_string(),
        (path, None) => path.to_string(),
    };

    FieldError::new(field, message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
