use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub url: String,
    pub description: String,
    pub posted_by: Option<i64>, // NULL when posted anonymously
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub url: String,
    pub description: String,
    pub posted_by: Option<i64>,
}

/// One user's upvote of one link. Unique per (user_id, link_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Vote {
    pub id: i64,
    pub user_id: i64,
    pub link_id: i64,
    pub created_at: OffsetDateTime,
}
