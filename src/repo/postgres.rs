use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;

use super::Repository;
use crate::{
    config::AppConfig,
    error::AppError,
    links::repo_types::{Link, NewLink, Vote},
    users::repo_types::{NewUser, User},
};

// A concurrent insert committed after our snapshot makes both branches of the
// get-or-create statement come back empty; re-issuing sees the committed row.
const GET_OR_CREATE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, date_joined
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            AppError::from_constraint(
                e,
                "A user with that username already exists.",
                "Referenced record does not exist",
            )
        })
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, date_joined
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash, date_joined FROM users ORDER BY id"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_link(&self, link: NewLink) -> Result<Link, AppError> {
        sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (url, description, posted_by)
            VALUES ($1, $2, $3)
            RETURNING id, url, description, posted_by, created_at
            "#,
        )
        .bind(&link.url)
        .bind(&link.description)
        .bind(link.posted_by) // Option<i64> → NULL allowed
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_constraint(e, "Link already exists", "User not found"))
    }

    async fn find_link(&self, id: i64) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, url, description, posted_by, created_at
            FROM links
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(link)
    }

    async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, Link>(
            r#"SELECT id, url, description, posted_by, created_at FROM links ORDER BY id"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn delete_link(&self, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_or_create_vote(
        &self,
        user_id: i64,
        link_id: i64,
    ) -> Result<(Vote, bool), AppError> {
        for attempt in 1..=GET_OR_CREATE_ATTEMPTS {
            let row = sqlx::query_as::<_, (i64, i64, i64, time::OffsetDateTime, bool)>(
                r#"
                WITH inserted AS (
                    INSERT INTO votes (user_id, link_id)
                    VALUES ($1, $2)
                    ON CONFLICT (user_id, link_id) DO NOTHING
                    RETURNING id, user_id, link_id, created_at
                )
                SELECT id, user_id, link_id, created_at, TRUE AS created FROM inserted
                UNION ALL
                SELECT id, user_id, link_id, created_at, FALSE AS created
                  FROM votes
                 WHERE user_id = $1 AND link_id = $2
                LIMIT 1
                "#,
            )
            .bind(user_id)
            .bind(link_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::from_constraint(e, "Vote already exists", "Invalid Link!"))?;

            if let Some((id, user_id, link_id, created_at, created)) = row {
                let vote = Vote {
                    id,
                    user_id,
                    link_id,
                    created_at,
                };
                return Ok((vote, created));
            }
            debug!(user_id, link_id, attempt, "vote raced with concurrent insert; retrying");
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "get_or_create_vote({user_id}, {link_id}) found no row after {GET_OR_CREATE_ATTEMPTS} attempts"
        )))
    }

    async fn list_votes(&self) -> Result<Vec<Vote>, AppError> {
        let rows = sqlx::query_as::<_, Vote>(
            r#"SELECT id, user_id, link_id, created_at FROM votes ORDER BY id"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_votes_for_link(&self, link_id: i64) -> Result<Vec<Vote>, AppError> {
        let rows = sqlx::query_as::<_, Vote>(
            r#"
            SELECT id, user_id, link_id, created_at
              FROM votes
             WHERE link_id = $1
             ORDER BY id
            "#,
        )
        .bind(link_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
