use async_graphql::{Context, ErrorExtensions, Object, Result, ID};

use super::{
    repo_types::{Link, Vote},
    services::{self, VoteOutcome},
};
use crate::{repo::DynRepository, schema::current_identity, users::repo_types::User};

async fn load_user(ctx: &Context<'_>, id: Option<i64>) -> Result<Option<User>> {
    let Some(id) = id else {
        return Ok(None);
    };
    let repo = ctx.data::<DynRepository>()?;
    repo.find_user_by_id(id).await.map_err(|e| e.extend())
}

#[Object(name = "LinkType")]
impl Link {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn url(&self) -> &str {
        &self.url
    }

    async fn description(&self) -> &str {
        &self.description
    }

    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        load_user(ctx, self.posted_by).await
    }

    async fn votes(&self, ctx: &Context<'_>) -> Result<Vec<Vote>> {
        let repo = ctx.data::<DynRepository>()?;
        repo.list_votes_for_link(self.id)
            .await
            .map_err(|e| e.extend())
    }
}

#[Object(name = "VoteType")]
impl Vote {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        load_user(ctx, Some(self.user_id)).await
    }

    async fn link(&self, ctx: &Context<'_>) -> Result<Option<Link>> {
        let repo = ctx.data::<DynRepository>()?;
        repo.find_link(self.link_id).await.map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct LinkQuery;

#[Object]
impl LinkQuery {
    async fn links(&self, ctx: &Context<'_>) -> Result<Vec<Link>> {
        let repo = ctx.data::<DynRepository>()?;
        services::list_links(repo.as_ref())
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct VoteQuery;

#[Object]
impl VoteQuery {
    async fn votes(&self, ctx: &Context<'_>) -> Result<Vec<Vote>> {
        let repo = ctx.data::<DynRepository>()?;
        services::list_votes(repo.as_ref())
            .await
            .map_err(|e| e.extend())
    }
}

pub struct CreateLink(Link);

#[Object]
impl CreateLink {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn url(&self) -> &str {
        &self.0.url
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        load_user(ctx, self.0.posted_by).await
    }
}

pub struct CreateVote(VoteOutcome);

#[Object]
impl CreateVote {
    async fn user(&self) -> &User {
        &self.0.user
    }

    async fn link(&self) -> &Link {
        &self.0.link
    }
}

#[derive(Default)]
pub struct LinkMutation;

#[Object]
impl LinkMutation {
    /// Posts a link, attributed to the caller when authenticated.
    async fn create_link(
        &self,
        ctx: &Context<'_>,
        url: String,
        description: Option<String>,
    ) -> Result<CreateLink> {
        let repo = ctx.data::<DynRepository>()?;
        services::create_link(
            repo.as_ref(),
            current_identity(ctx),
            &url,
            description.as_deref(),
        )
        .await
        .map(CreateLink)
        .map_err(|e| e.extend())
    }

    /// Upvotes a link. Voting again for the same link returns the existing vote.
    async fn create_vote(&self, ctx: &Context<'_>, link_id: i64) -> Result<CreateVote> {
        let repo = ctx.data::<DynRepository>()?;
        services::create_vote(repo.as_ref(), current_identity(ctx), link_id)
            .await
            .map(CreateVote)
            .map_err(|e| e.extend())
    }
}
