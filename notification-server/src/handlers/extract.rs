use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

/// Request body accepted as JSON or as an urlencoded form.
///
/// An empty body deserializes like `{}` so that missing fields are reported
/// by the handler's own validation rather than as a parse failure.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let form = is_form(&req);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid request body: {}", e)))?;

        let value = if form {
            serde_urlencoded::from_bytes(&bytes)
                .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid form body: {}", e)))?
        } else if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice(b"{}")
                .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", e)))?
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", e)))?
        };

        Ok(Payload(value))
    }
}
