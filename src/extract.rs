use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::AppError;

/// JSON request body whose rejections go through `AppError`, so a malformed
/// body is a 400 with the usual error payload.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
