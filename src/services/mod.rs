pub mod error;
pub mod jobs;
pub mod quotes;
pub mod web;

use crate::patch::Payload;
use axum::{
    Json,
    async_trait,
    extract::{FromRequest, Request},
};
use error::ApiError;
use serde_json::Value;

/// JSON object request body. Rejections render through [`ApiError`].
pub(crate) struct JsonObject(pub Payload);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;
        match body {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}
