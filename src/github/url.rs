use crate::error::{ManagerError, ManagerResult};
use crate::model::credentials::{Credentials, RepoRef};
use crate::model::kind::{ListMode, ResourceKind};

pub const PER_PAGE: u32 = 20;

fn collection_url(creds: &Credentials, repo: &RepoRef, kind: ResourceKind) -> String {
    format!(
        "{}/repos/{}/{}/{}",
        creds.api_base.trim_end_matches('/'),
        repo.owner,
        repo.repo,
        kind.plural()
    )
}

/// Repository a listing reads from.
pub fn source_repo(creds: &Credentials, mode: ListMode) -> ManagerResult<&RepoRef> {
    match mode {
        ListMode::List => Ok(&creds.home),
        ListMode::Template => creds.template.as_ref().ok_or_else(|| {
            ManagerError::Config("no template repository configured".into())
        }),
    }
}

pub fn list_url(
    creds: &Credentials,
    kind: ResourceKind,
    page: u32,
    mode: ListMode,
) -> ManagerResult<String> {
    let repo = source_repo(creds, mode)?;
    let mut url = format!(
        "{}?per_page={PER_PAGE}&page={page}",
        collection_url(creds, repo, kind)
    );
    // Milestones default to open-only.
    if kind == ResourceKind::Milestone {
        url.push_str("&state=all");
    }
    Ok(url)
}

pub fn create_url(creds: &Credentials, kind: ResourceKind) -> String {
    collection_url(creds, &creds.home, kind)
}

pub fn mutate_url(creds: &Credentials, kind: ResourceKind, api_call_sign: &str) -> String {
    format!(
        "{}/{}",
        collection_url(creds, &creds.home, kind),
        urlencoding::encode(api_call_sign)
    )
}
