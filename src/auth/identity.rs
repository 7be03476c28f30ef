use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{state::AppState, users::repo_types::User};

/// Who is making the request. Passed explicitly into every domain operation.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(User),
}

impl Identity {
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::User(u) => Some(u),
            Identity::Anonymous => None,
        }
    }
}

/// Accepts `JWT <token>` as well as `Bearer <token>`.
fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    match scheme {
        s if s.eq_ignore_ascii_case("jwt") || s.eq_ignore_ascii_case("bearer") => {
            Some(token.trim()).filter(|t| !t.is_empty())
        }
        _ => None,
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            return Ok(Identity::Anonymous);
        };

        // An unusable token degrades to Anonymous so that tokenAuth still works;
        // operations that need a user report the failure in the GraphQL response.
        let Some(token) = header.to_str().ok().and_then(token_from_header) else {
            warn!("malformed Authorization header; treating request as anonymous");
            return Ok(Identity::Anonymous);
        };

        let keys = JwtKeys::from_ref(state);
        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "rejected token; treating request as anonymous");
                return Ok(Identity::Anonymous);
            }
        };

        match state.repo.find_user_by_username(&claims.sub).await {
            Ok(Some(user)) => Ok(Identity::User(user)),
            Ok(None) => {
                warn!(username = %claims.sub, "token for unknown user; treating request as anonymous");
                Ok(Identity::Anonymous)
            }
            Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
        }
    }
}
