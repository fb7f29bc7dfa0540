use std::collections::HashMap;

use axum::{
    Form, Json, async_trait,
    extract::{FromRequest, Request},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::domain::{BookInput, ValidationError};

use super::types::ErrorResponse;

/// Book request body, accepted as JSON or as an urlencoded form.
///
/// Values are kept untyped so that wrong-typed fields (e.g. a numeric
/// `genre`) reach the domain validation instead of failing deserialization.
/// Form values always arrive as strings, so a numeric-looking form field
/// such as `genre=15` is accepted as the text "15".
#[derive(Debug, Clone)]
pub struct BookPayload(pub BookInput);

/// The body could not be read as a JSON object or a form.
#[derive(Debug)]
pub struct PayloadRejection(pub String);

impl From<PayloadRejection> for ValidationError {
    fn from(rejection: PayloadRejection) -> Self {
        ValidationError::MalformedBody(rejection.0)
    }
}

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new("MALFORMED_BODY", self.0);
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<S> FromRequest<S> for BookPayload
where
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| PayloadRejection(e.body_text()))?;

            let input = fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(BookPayload(input));
        }

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| PayloadRejection(e.body_text()))?;

        match value {
            Value::Object(input) => Ok(BookPayload(input)),
            _ => Err(PayloadRejection(
                "request body must be a JSON object".to_string(),
            )),
        }
    }
}
