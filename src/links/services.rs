use tracing::{info, instrument, warn};
use url::{Host, Url};

use super::repo_types::{Link, NewLink, Vote};
use crate::{auth::Identity, error::AppError, repo::Repository, users::repo_types::User};

const URL_MAX_LEN: usize = 200;
const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

pub(crate) fn validate_url(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    let invalid = || AppError::Validation("Enter a valid URL.".into());
    if raw.is_empty() || raw.chars().count() > URL_MAX_LEN {
        return Err(invalid());
    }
    // the parser would silently strip or escape these and we store the input as typed
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid());
    }
    let parsed = Url::parse(raw).map_err(|_| invalid())?;
    if !URL_SCHEMES.contains(&parsed.scheme()) {
        return Err(invalid());
    }
    match parsed.host() {
        Some(Host::Domain(d)) if d == "localhost" || is_dotted_domain(d) => Ok(raw.to_string()),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(raw.to_string()),
        _ => Err(invalid()),
    }
}

fn is_dotted_domain(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let mut labels = domain.split('.');
    domain.contains('.') && labels.all(|l| !l.is_empty())
}

/// Posts a link. Anonymous callers are allowed; the link is then unattributed.
#[instrument(skip(repo, identity, description))]
pub async fn create_link(
    repo: &dyn Repository,
    identity: &Identity,
    url: &str,
    description: Option<&str>,
) -> Result<Link, AppError> {
    let url = validate_url(url).inspect_err(|_| warn!("invalid url"))?;
    let posted_by = identity.user().map(|u| u.id);
    let link = repo
        .create_link(NewLink {
            url,
            description: description.unwrap_or_default().to_string(),
            posted_by,
        })
        .await?;
    info!(link_id = link.id, ?posted_by, "link created");
    Ok(link)
}

/// Result of an upvote: the voter, the link and the (possibly pre-existing) vote.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub user: User,
    pub link: Link,
    pub vote: Vote,
    pub created: bool,
}

#[instrument(skip(repo, identity))]
pub async fn create_vote(
    repo: &dyn Repository,
    identity: &Identity,
    link_id: i64,
) -> Result<VoteOutcome, AppError> {
    let Some(user) = identity.user() else {
        warn!("vote without identity");
        return Err(AppError::Unauthenticated("You must be logged to vote!".into()));
    };

    let Some(link) = repo.find_link(link_id).await? else {
        warn!(user_id = user.id, "vote for unknown link");
        return Err(AppError::NotFound("Invalid Link!".into()));
    };

    let (vote, created) = repo.get_or_create_vote(user.id, link.id).await?;
    if created {
        info!(user_id = user.id, link_id, vote_id = vote.id, "vote created");
    } else {
        info!(user_id = user.id, link_id, vote_id = vote.id, "vote already present");
    }

    Ok(VoteOutcome {
        user: user.clone(),
        link,
        vote,
        created,
    })
}

pub async fn list_links(repo: &dyn Repository) -> Result<Vec<Link>, AppError> {
    repo.list_links().await
}

pub async fn list_votes(repo: &dyn Repository) -> Result<Vec<Vote>, AppError> {
    repo.list_votes().await
}
