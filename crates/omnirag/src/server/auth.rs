//! Shared-secret authentication middleware
//!
//! Every mutating or data-returning route requires the `x-api-key` header to
//! match the configured secret; the check runs before any handler side
//! effect. `/health` stays open.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;

/// Header carrying the caller's credential
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject the request with 401 unless the API key header matches.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::Unauthorized)?;

    if !keys_match(provided, &state.config().auth.api_key) {
        return Err(Error::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Constant-time comparison; unequal lengths compare unequal.
fn keys_match(provided: &str, expected: &str) -> bool {
    ring::constant_time::verify_slices_are_equal(provided.as_bytes(), expected.as_bytes()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_keys_pass() {
        assert!(keys_match("secret-key", "secret-key"));
    }

    #[test]
    fn wrong_or_truncated_keys_fail() {
        assert!(!keys_match("secret-kez", "secret-key"));
        assert!(!keys_match("secret", "secret-key"));
        assert!(!keys_match("", "secret-key"));
    }
}
