use async_graphql::{Context, ErrorExtensions, Object, Result, SimpleObject, ID};

use super::{
    repo_types::User,
    services::{self, CreateUserInput},
};
use crate::repo::DynRepository;

#[Object(name = "UserType")]
impl User {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn username(&self) -> &str {
        &self.username
    }

    async fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let repo = ctx.data::<DynRepository>()?;
        services::list_users(repo.as_ref())
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(SimpleObject)]
pub struct CreateUser {
    pub user: User,
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
        email: String,
    ) -> Result<CreateUser> {
        let repo = ctx.data::<DynRepository>()?;
        let input = CreateUserInput {
            username,
            email,
            password,
        };
        services::create_user(repo.as_ref(), input)
            .await
            .map(|user| CreateUser { user })
            .map_err(|e| e.extend())
    }
}
