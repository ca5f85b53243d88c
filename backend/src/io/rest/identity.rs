use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

/// The authenticated owner id for a request.
///
/// Authentication itself is an external concern; the auth layer in front of
/// this service resolves the session and forwards the opaque user id in the
/// `x-user-id` header. Handlers take this extractor instead of reading any
/// ambient identity state.
pub struct OwnerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| OwnerId(id.to_string()))
            .ok_or((StatusCode::UNAUTHORIZED, "Missing user identity"))
    }
}
