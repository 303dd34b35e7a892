use axum::{
    body::Body,
    http::{Request, StatusCode, header::ORIGIN},
    middleware::Next,
    response::Response,
};

use crate::errors::HttpError;

/// Rejects browser requests whose `Origin` is not a loopback address.
/// Requests without an `Origin` header pass through.
pub async fn require_loopback_origin(req: Request<Body>, next: Next) -> Result<Response, HttpError> {
    if let Some(origin) = req.headers().get(ORIGIN) {
        let origin = origin.to_str().map_err(|_| {
            HttpError::new(
                StatusCode::BAD_REQUEST,
                "invalid Origin header",
                Some("invalid_origin".to_string()),
            )
        })?;
        if !is_loopback_origin(origin) {
            tracing::debug!(origin, "rejected cross-origin request");
            return Err(HttpError::new(
                StatusCode::FORBIDDEN,
                "invalid origin",
                Some("invalid_origin".to_string()),
            ));
        }
    }
    Ok(next.run(req).await)
}

fn is_loopback_origin(origin: &str) -> bool {
    let Some((scheme, rest)) = origin.split_once("://") else {
        return false;
    };
    if scheme != "http" && scheme != "https" {
        return false;
    }
    ["127.0.0.1", "localhost", "[::1]"].iter().any(|host| {
        rest.strip_prefix(host)
            .is_some_and(|tail| tail.is_empty() || tail.starts_with(':'))
    })
}
