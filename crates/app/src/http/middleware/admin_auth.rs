use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("admin endpoints disabled (ENVIE_ADMIN_TOKEN not set)")]
    MissingConfig,
    #[error("admin token required")]
    MissingToken,
    #[error("admin token invalid")]
    InvalidToken,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Guards the admin routes with a static bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AdminAuthError> {
    let expected = state
        .config
        .admin_token
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(AdminAuthError::MissingConfig)?;
    let token = extract_bearer_token(&request).ok_or(AdminAuthError::MissingToken)?;
    if !tokens_match(expected, token) {
        warn!(path = %request.uri().path(), "admin token rejected");
        return Err(AdminAuthError::InvalidToken);
    }
    Ok(next.run(request).await)
}

fn extract_bearer_token<B>(request: &Request<B>) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let value = header.trim().strip_prefix("Bearer ")?.trim();
    if value.is_empty() { None } else { Some(value) }
}

fn tokens_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AdminAuthError::MissingConfig => StatusCode::SERVICE_UNAVAILABLE,
            AdminAuthError::MissingToken | AdminAuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::{extract_bearer_token, tokens_match};

    #[test]
    fn bearer_token_is_extracted_and_trimmed() {
        let request = Request::builder()
            .header("authorization", "Bearer  s3cret ")
            .body(())
            .unwrap();
        assert_eq!(extract_bearer_token(&request), Some("s3cret"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let request = Request::builder()
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        assert_eq!(extract_bearer_token(&request), None);
        let empty = Request::builder().header("authorization", "Bearer ").body(()).unwrap();
        assert_eq!(extract_bearer_token(&empty), None);
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("s3cret", "s3cret"));
        assert!(!tokens_match("s3cret", "s3creT"));
        assert!(!tokens_match("s3cret", "s3cre"));
        assert!(!tokens_match("s3cret", "s3cret-and-more"));
        assert!(!tokens_match("s3cret", ""));
    }
}
