use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use dalryeok_core::Identity;

use crate::error::ApiError;
use crate::state::AppState;

/// The requester as seen through the identity header, and whether the access
/// policy lets them write.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
    pub is_admin: bool,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser::from_parts(parts, state))
    }
}

impl CurrentUser {
    fn from_parts(parts: &Parts, state: &AppState) -> Self {
        let email = parts
            .headers
            .get(&state.identity_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let identity = Identity { email };
        let is_admin = state.policy.is_authorized(&identity);
        CurrentUser { identity, is_admin }
    }
}

/// A requester the access policy allows to write. Rejects with 403 otherwise.
#[derive(Debug, Clone)]
pub struct Admin(pub Identity);

impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_parts(parts, state);
        if !user.is_admin {
            tracing::warn!(
                "Rejected write from {}",
                user.identity.email.as_deref().unwrap_or("anonymous")
            );
            return Err(ApiError::Forbidden);
        }
        Ok(Admin(user.identity))
    }
}
