//! Root GraphQL schema, composed from the per-resource field resolvers.

use async_graphql::{extensions::Tracing, Context, EmptySubscription, MergedObject, Schema};

use crate::{
    auth::{jwt::JwtKeys, schema::AuthMutation, Identity},
    links::schema::{LinkMutation, LinkQuery, VoteQuery},
    repo::DynRepository,
    users::schema::{UserMutation, UserQuery},
};

#[derive(MergedObject, Default)]
pub struct QueryRoot(UserQuery, LinkQuery, VoteQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(UserMutation, LinkMutation, AuthMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Builds the schema with the repository and token keys injected as context data.
/// The caller's [`Identity`] is attached per request.
pub fn build_schema(repo: DynRepository, keys: JwtKeys) -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(repo)
        .data(keys)
        .extension(Tracing)
        .finish()
}

static ANONYMOUS: Identity = Identity::Anonymous;

/// The identity attached to the executing request, anonymous when none was attached.
pub(crate) fn current_identity<'a>(ctx: &Context<'a>) -> &'a Identity {
    ctx.data_opt::<Identity>().unwrap_or(&ANONYMOUS)
}
