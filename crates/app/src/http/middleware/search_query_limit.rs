use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

const MAX_SEARCH_QUERY_LEN: usize = 1024;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Rejects oversized query strings before they are decoded.
pub async fn enforce_search_query_length(req: Request, next: Next) -> Response {
    if is_query_too_long(req.uri().query()) {
        let body = ErrorBody {
            error: format!(
                "query string too long (max {} chars)",
                MAX_SEARCH_QUERY_LEN
            ),
        };
        return (StatusCode::URI_TOO_LONG, axum::Json(body)).into_response();
    }
    next.run(req).await
}

fn is_query_too_long(query: Option<&str>) -> bool {
    query.is_some_and(|value| value.len() > MAX_SEARCH_QUERY_LEN)
}
