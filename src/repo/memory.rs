use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::Repository;
use crate::{
    error::AppError,
    links::repo_types::{Link, NewLink, Vote},
    users::repo_types::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    links: Vec<Link>,
    votes: Vec<Vote>,
    next_user_id: i64,
    next_link_id: i64,
    next_vote_id: i64,
}

impl Tables {
    fn next(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Repository kept in process memory, with the same constraints as the SQL schema.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory repository poisoned")))
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut t = self.lock()?;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(
                "A user with that username already exists.".into(),
            ));
        }
        let row = User {
            id: Tables::next(&mut t.next_user_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            date_joined: OffsetDateTime::now_utc(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.lock()?.users.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.lock()?;
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Ok(false);
        }
        let dropped_links: Vec<i64> = t
            .links
            .iter()
            .filter(|l| l.posted_by == Some(id))
            .map(|l| l.id)
            .collect();
        t.links.retain(|l| l.posted_by != Some(id));
        t.votes
            .retain(|v| v.user_id != id && !dropped_links.contains(&v.link_id));
        Ok(true)
    }

    async fn create_link(&self, link: NewLink) -> Result<Link, AppError> {
        let mut t = self.lock()?;
        if let Some(user_id) = link.posted_by {
            if !t.users.iter().any(|u| u.id == user_id) {
                return Err(AppError::NotFound("User not found".into()));
            }
        }
        let row = Link {
            id: Tables::next(&mut t.next_link_id),
            url: link.url,
            description: link.description,
            posted_by: link.posted_by,
            created_at: OffsetDateTime::now_utc(),
        };
        t.links.push(row.clone());
        Ok(row)
    }

    async fn find_link(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.lock()?.links.iter().find(|l| l.id == id).cloned())
    }

    async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        Ok(self.lock()?.links.clone())
    }

    async fn delete_link(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.lock()?;
        let before = t.links.len();
        t.links.retain(|l| l.id != id);
        if t.links.len() == before {
            return Ok(false);
        }
        t.votes.retain(|v| v.link_id != id);
        Ok(true)
    }

    async fn get_or_create_vote(
        &self,
        user_id: i64,
        link_id: i64,
    ) -> Result<(Vote, bool), AppError> {
        let mut t = self.lock()?;
        if let Some(existing) = t
            .votes
            .iter()
            .find(|v| v.user_id == user_id && v.link_id == link_id)
        {
            return Ok((existing.clone(), false));
        }
        if !t.links.iter().any(|l| l.id == link_id) {
            return Err(AppError::NotFound("Invalid Link!".into()));
        }
        if !t.users.iter().any(|u| u.id == user_id) {
            return Err(AppError::NotFound("User not found".into()));
        }
        let vote = Vote {
            id: Tables::next(&mut t.next_vote_id),
            user_id,
            link_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.votes.push(vote.clone());
        Ok((vote, true))
    }

    async fn list_votes(&self) -> Result<Vec<Vote>, AppError> {
        Ok(self.lock()?.votes.clone())
    }

    async fn list_votes_for_link(&self, link_id: i64) -> Result<Vec<Vote>, AppError> {
        Ok(self
            .lock()?
            .votes
            .iter()
            .filter(|v| v.link_id == link_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: format!("{name}@example.com"),
            password_hash: "$argon2id$fake".into(),
        }
    }

    fn new_link(url: &str, posted_by: Option<i64>) -> NewLink {
        NewLink {
            url: url.into(),
            description: String::new(),
            posted_by,
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let repo = MemoryRepository::new();
        repo.create_user(new_user("alice")).await.unwrap();
        let err = repo.create_user(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_or_create_vote_is_idempotent() {
        let repo = MemoryRepository::new();
        let alice = repo.create_user(new_user("alice")).await.unwrap();
        let link = repo.create_link(new_link("http://x.test", None)).await.unwrap();

        let (first, created) = repo.get_or_create_vote(alice.id, link.id).await.unwrap();
        assert!(created);
        let (second, created) = repo.get_or_create_vote(alice.id, link.id).await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(repo.list_votes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_links_and_votes() {
        let repo = MemoryRepository::new();
        let alice = repo.create_user(new_user("alice")).await.unwrap();
        let bob = repo.create_user(new_user("bob")).await.unwrap();
        let alices = repo
            .create_link(new_link("http://a.test", Some(alice.id)))
            .await
            .unwrap();
        let bobs = repo
            .create_link(new_link("http://b.test", Some(bob.id)))
            .await
            .unwrap();
        repo.get_or_create_vote(bob.id, alices.id).await.unwrap();
        repo.get_or_create_vote(alice.id, bobs.id).await.unwrap();
        repo.get_or_create_vote(bob.id, bobs.id).await.unwrap();

        assert!(repo.delete_user(alice.id).await.unwrap());

        let links = repo.list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, bobs.id);
        let votes = repo.list_votes().await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!((votes[0].user_id, votes[0].link_id), (bob.id, bobs.id));
        assert!(!repo.delete_user(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_link_cascades_to_votes() {
        let repo = MemoryRepository::new();
        let alice = repo.create_user(new_user("alice")).await.unwrap();
        let keep = repo.create_link(new_link("http://keep.test", None)).await.unwrap();
        let gone = repo.create_link(new_link("http://gone.test", None)).await.unwrap();
        repo.get_or_create_vote(alice.id, keep.id).await.unwrap();
        repo.get_or_create_vote(alice.id, gone.id).await.unwrap();

        assert!(repo.delete_link(gone.id).await.unwrap());

        assert!(repo.list_votes_for_link(gone.id).await.unwrap().is_empty());
        assert_eq!(repo.list_votes_for_link(keep.id).await.unwrap().len(), 1);
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn vote_on_missing_link_is_not_found() {
        let repo = MemoryRepository::new();
        let alice = repo.create_user(new_user("alice")).await.unwrap();
        let err = repo.get_or_create_vote(alice.id, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(repo.list_votes().await.unwrap().is_empty());
    }
}
