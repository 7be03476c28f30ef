use tracing::{info, instrument, warn};

use super::{claims::Claims, jwt::JwtKeys, password::verify_password};
use crate::{error::AppError, repo::Repository};

/// A signed token together with its decoded payload.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
    pub refresh_expires_in: i64,
}

#[instrument(skip(repo, keys, password))]
pub async fn token_auth(
    repo: &dyn Repository,
    keys: &JwtKeys,
    username: &str,
    password: &str,
) -> Result<IssuedToken, AppError> {
    let user = match repo.find_user_by_username(username).await? {
        Some(u) => u,
        None => {
            warn!(username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(username, user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let (token, claims) = keys.sign(&user.username)?;
    info!(user_id = user.id, username = %user.username, "token issued");
    Ok(IssuedToken {
        token,
        refresh_expires_in: keys.refresh_expires_at(claims.orig_iat),
        claims,
    })
}

#[instrument(skip_all)]
pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Claims, AppError> {
    keys.verify(token)
}

#[instrument(skip_all)]
pub fn refresh_token(keys: &JwtKeys, token: &str) -> Result<IssuedToken, AppError> {
    let (token, claims) = keys.refresh(token)?;
    info!(username = %claims.sub, "token refreshed");
    Ok(IssuedToken {
        token,
        refresh_expires_in: keys.refresh_expires_at(claims.orig_iat),
        claims,
    })
}
