use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    links::repo_types::{Link, NewLink, Vote},
    users::repo_types::{NewUser, User},
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub type DynRepository = Arc<dyn Repository>;

/// Persistence seam for users, links and votes.
///
/// Deleting a user removes the links they posted and every vote they cast;
/// deleting a link removes its votes.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;

    async fn create_link(&self, link: NewLink) -> Result<Link, AppError>;
    async fn find_link(&self, id: i64) -> Result<Option<Link>, AppError>;
    async fn list_links(&self) -> Result<Vec<Link>, AppError>;
    async fn delete_link(&self, id: i64) -> Result<bool, AppError>;

    /// Returns the vote for `(user_id, link_id)`, inserting it if absent.
    /// The flag is `true` when this call created the row.
    async fn get_or_create_vote(&self, user_id: i64, link_id: i64)
        -> Result<(Vote, bool), AppError>;
    async fn list_votes(&self) -> Result<Vec<Vote>, AppError>;
    async fn list_votes_for_link(&self, link_id: i64) -> Result<Vec<Vote>, AppError>;
}
