//! Caller identity extraction.
//!
//! Authentication itself lives upstream; the gateway trusts a verified
//! `x-user-id` header and resolves it to a full [`User`] before any
//! handler runs. Missing, malformed, or unknown ids are rejected with
//! 401 before authorization is even considered.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::{User, UserId};
use crate::error::ClubError;

/// Header carrying the upstream-verified caller id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, loaded fresh from the user store so role
/// and balance checks always see current data.
#[derive(Debug, Clone)]
pub struct Identity(pub User);

impl FromRequestParts<AppState> for Identity {
    type Rejection = ClubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ClubError::Unauthorized)?;

        let id: i64 = raw.parse().map_err(|_| ClubError::Unauthorized)?;

        let user = match state.accounts.get_user(UserId::new(id)).await {
            Ok(user) => user,
            // An unknown id is an identity problem, not a lookup miss.
            Err(ClubError::UserNotFound(_)) => return Err(ClubError::Unauthorized),
            Err(other) => return Err(other),
        };

        Ok(Self(user))
    }
}
