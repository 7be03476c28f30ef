use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::claims::Claims;
use crate::{config::JwtConfig, error::AppError, state::AppState};

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl_secs: cfg.ttl_minutes * 60,
            refresh_ttl_secs: cfg.refresh_ttl_minutes * 60,
        }
    }

    /// Issues a fresh token, starting a new refresh chain.
    pub fn sign(&self, username: &str) -> Result<(String, Claims), AppError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.sign_with_origin(username, now, now)
    }

    fn sign_with_origin(
        &self,
        username: &str,
        now: i64,
        orig_iat: i64,
    ) -> Result<(String, Claims), AppError> {
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            orig_iat,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = self.encode(&claims)?;
        debug!(username, exp = claims.exp, "jwt signed");
        Ok((token, claims))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("jwt encode: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "jwt rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Token("Signature has expired".into()),
                _ => AppError::Token("Error decoding signature".into()),
            }
        })?;
        debug!(username = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Unix timestamp after which a chain started at `orig_iat` can no longer be refreshed.
    pub fn refresh_expires_at(&self, orig_iat: i64) -> i64 {
        orig_iat + self.refresh_ttl_secs
    }

    /// Exchanges a still-valid token for a new one in the same refresh chain.
    pub fn refresh(&self, token: &str) -> Result<(String, Claims), AppError> {
        let claims = self.verify(token)?;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if now > self.refresh_expires_at(claims.orig_iat) {
            warn!(username = %claims.sub, "refresh window elapsed");
            return Err(AppError::Token("Refresh has expired".into()));
        }
        self.sign_with_origin(&claims.sub, now, claims.orig_iat)
    }
}
