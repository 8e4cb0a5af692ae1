//! Request body extraction for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::web::error::ApiError;

/// A JSON body extractor whose rejections use the API error shape.
///
/// Malformed, mistyped or incomplete bodies are rejected with 400 and a
/// fixed message. The parser's own text is only logged.
///
/// # Example
///
/// ```ignore
/// async fn login(ApiJson(req): ApiJson<LoginRequest>) -> Result<..., ApiError> {
///     // req is fully deserialized
/// }
/// ```
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_api_error)?;

        Ok(ApiJson(value))
    }
}

fn rejection_to_api_error(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");

    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "expected a JSON request body",
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "request body does not match the expected fields",
        _ => "request body could not be read",
    };

    ApiError::bad_request(message)
}
