use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::repo_types::{NewUser, User};
use crate::{auth::password::hash_password, error::AppError, repo::Repository};

const USERNAME_MAX_LEN: usize = 150;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
    }
    username.chars().count() <= USERNAME_MAX_LEN && USERNAME_RE.is_match(username)
}

/// Lowercases the domain part only; the local part is kept as given.
pub(crate) fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[instrument(skip(repo, input), fields(username = %input.username))]
pub async fn create_user(repo: &dyn Repository, input: CreateUserInput) -> Result<User, AppError> {
    let username = input.username.trim().to_string();
    let email = normalize_email(&input.email);

    if username.is_empty() || email.is_empty() || input.password.is_empty() {
        warn!("missing required field");
        return Err(AppError::Validation(
            "username, email and password are required".into(),
        ));
    }
    if !is_valid_username(&username) {
        warn!("invalid username");
        return Err(AppError::Validation(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::Validation("Enter a valid email address.".into()));
    }

    let password_hash = hash_password(&input.password)?;
    let user = repo
        .create_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .inspect_err(|e| warn!(error = %e, "create user failed"))?;

    info!(user_id = user.id, "user created");
    Ok(user)
}

pub async fn list_users(repo: &dyn Repository) -> Result<Vec<User>, AppError> {
    repo.list_users().await
}
