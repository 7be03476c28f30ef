use async_graphql::{Context, ErrorExtensions, Object, Result, SimpleObject};

use super::{
    claims::Claims,
    jwt::JwtKeys,
    services::{self, IssuedToken},
};
use crate::repo::DynRepository;

/// Decoded token contents exposed to clients.
#[derive(SimpleObject, Debug, Clone)]
pub struct TokenPayload {
    pub username: String,
    pub exp: i64,
    pub orig_iat: i64,
}

impl From<Claims> for TokenPayload {
    fn from(c: Claims) -> Self {
        Self {
            username: c.sub,
            exp: c.exp,
            orig_iat: c.orig_iat,
        }
    }
}

#[derive(SimpleObject)]
pub struct ObtainJsonWebToken {
    pub token: String,
    pub payload: TokenPayload,
    pub refresh_expires_in: i64,
}

#[derive(SimpleObject)]
pub struct VerifyToken {
    pub payload: TokenPayload,
}

#[derive(SimpleObject)]
pub struct RefreshToken {
    pub token: String,
    pub payload: TokenPayload,
    pub refresh_expires_in: i64,
}

impl From<IssuedToken> for ObtainJsonWebToken {
    fn from(t: IssuedToken) -> Self {
        Self {
            token: t.token,
            payload: t.claims.into(),
            refresh_expires_in: t.refresh_expires_in,
        }
    }
}

impl From<IssuedToken> for RefreshToken {
    fn from(t: IssuedToken) -> Self {
        Self {
            token: t.token,
            payload: t.claims.into(),
            refresh_expires_in: t.refresh_expires_in,
        }
    }
}

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    /// Exchanges a username and password for a signed token.
    async fn token_auth(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<ObtainJsonWebToken> {
        let repo = ctx.data::<DynRepository>()?;
        let keys = ctx.data::<JwtKeys>()?;
        services::token_auth(repo.as_ref(), keys, &username, &password)
            .await
            .map(Into::into)
            .map_err(|e| e.extend())
    }

    async fn verify_token(&self, ctx: &Context<'_>, token: String) -> Result<VerifyToken> {
        let keys = ctx.data::<JwtKeys>()?;
        services::verify_token(keys, &token)
            .map(|claims| VerifyToken {
                payload: claims.into(),
            })
            .map_err(|e| e.extend())
    }

    async fn refresh_token(&self, ctx: &Context<'_>, token: String) -> Result<RefreshToken> {
        let keys = ctx.data::<JwtKeys>()?;
        services::refresh_token(keys, &token)
            .map(Into::into)
            .map_err(|e| e.extend())
    }
}
