//! Request construction and the network seam.
//!
//! The `build_*` functions are pure: they turn credentials and a package into an
//! `ApiRequest`. A `Transport` performs exactly one round-trip per request and
//! hands back the raw status and body, leaving status interpretation to the caller.

use async_trait::async_trait;
use base64::Engine;
use tracing::debug;

use super::codec::EntryPackage;
use super::url::{create_url, list_url, mutate_url};
use crate::error::{ManagerError, ManagerResult};
use crate::model::credentials::Credentials;
use crate::model::kind::{ListMode, ResourceKind};

pub const ACCEPT: &str = "application/vnd.github.v3+json";
pub const USER_AGENT: &str = "repo-labels";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn headers(creds: &Credentials, with_body: bool) -> Vec<(String, String)> {
    let pair = format!("{}:{}", creds.username, creds.token);
    let encoded = base64::engine::general_purpose::STANDARD.encode(pair);
    let mut headers = vec![
        ("Authorization".to_string(), format!("Basic {encoded}")),
        ("Accept".to_string(), ACCEPT.to_string()),
        ("User-Agent".to_string(), USER_AGENT.to_string()),
    ];
    if with_body {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    headers
}

pub fn build_get(
    creds: &Credentials,
    kind: ResourceKind,
    page: u32,
    mode: ListMode,
) -> ManagerResult<ApiRequest> {
    Ok(ApiRequest {
        method: HttpMethod::Get,
        url: list_url(creds, kind, page, mode)?,
        headers: headers(creds, false),
        body: None,
    })
}

/// GET a single entry by its api call sign.
pub fn build_fetch(creds: &Credentials, kind: ResourceKind, api_call_sign: &str) -> ApiRequest {
    ApiRequest {
        method: HttpMethod::Get,
        url: mutate_url(creds, kind, api_call_sign),
        headers: headers(creds, false),
        body: None,
    }
}

pub fn build_create(creds: &Credentials, package: &EntryPackage) -> ManagerResult<ApiRequest> {
    Ok(ApiRequest {
        method: HttpMethod::Post,
        url: create_url(creds, package.kind),
        headers: headers(creds, true),
        body: Some(serde_json::to_string(&package.body)?),
    })
}

pub fn build_update(creds: &Credentials, package: &EntryPackage) -> ManagerResult<ApiRequest> {
    let sign = package.names.api_call_sign.as_deref().ok_or_else(|| {
        ManagerError::Validation(format!(
            "'{}' does not exist yet and cannot be updated",
            package.names.new_name
        ))
    })?;
    Ok(ApiRequest {
        method: HttpMethod::Patch,
        url: mutate_url(creds, package.kind, sign),
        headers: headers(creds, true),
        body: Some(serde_json::to_string(&package.body)?),
    })
}

pub fn build_delete(creds: &Credentials, kind: ResourceKind, api_call_sign: &str) -> ApiRequest {
    ApiRequest {
        method: HttpMethod::Delete,
        url: mutate_url(creds, kind, api_call_sign),
        headers: headers(creds, false),
        body: None,
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// One outbound request, no retries. Non-2xx statuses are returned, not raised.
    async fn send(&self, request: ApiRequest) -> ManagerResult<ApiResponse>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ManagerResult<ApiResponse> {
        debug!(method = ?request.method, url = %request.url, "sending request");

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Patch => self.client.patch(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(status, bytes = body.len(), "response received");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::codec::{pack, serialize};
    use crate::model::credentials::DEFAULT_API_BASE;
    use crate::model::entry::FormRecord;

    fn creds() -> Credentials {
        Credentials {
            username: "octocat".into(),
            token: "t0k3n".into(),
            home: "octo/home".parse().unwrap(),
            template: None,
            api_base: DEFAULT_API_BASE.into(),
        }
    }

    fn header<'a>(req: &'a ApiRequest, name: &str) -> Option<&'a str> {
        req.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn new_milestone() -> EntryPackage {
        let form = FormRecord {
            title: Some("v1".into()),
            ..Default::default()
        };
        pack(&serialize(&form, ResourceKind::Milestone).unwrap())
    }

    #[test]
    fn get_carries_auth_and_accept() {
        let req = build_get(&creds(), ResourceKind::Label, 1, ListMode::List).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        // base64("octocat:t0k3n")
        assert_eq!(header(&req, "Authorization"), Some("Basic b2N0b2NhdDp0MGszbg=="));
        assert_eq!(header(&req, "Accept"), Some(ACCEPT));
        assert_eq!(header(&req, "User-Agent"), Some(USER_AGENT));
        assert_eq!(header(&req, "Content-Type"), None);
    }

    #[test]
    fn create_posts_json_body() {
        let req = build_create(&creds(), &new_milestone()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://api.github.com/repos/octo/home/milestones");
        assert_eq!(header(&req, "Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "v1");
        assert_eq!(body["state"], "open");
    }

    #[test]
    fn update_patches_by_sign() {
        let form = FormRecord {
            name: Some("needs review".into()),
            original_name: Some("review me".into()),
            color: Some("00ff00".into()),
            ..Default::default()
        };
        let package = pack(&serialize(&form, ResourceKind::Label).unwrap());
        let req = build_update(&creds(), &package).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "https://api.github.com/repos/octo/home/labels/review%20me");
        assert!(req.body.is_some());
    }

    #[test]
    fn update_without_sign_is_rejected() {
        assert!(matches!(
            build_update(&creds(), &new_milestone()),
            Err(ManagerError::Validation(_))
        ));
    }

    #[test]
    fn delete_has_no_body() {
        let req = build_delete(&creds(), ResourceKind::Milestone, "9");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "https://api.github.com/repos/octo/home/milestones/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn fetch_reads_one_entry() {
        let req = build_fetch(&creds(), ResourceKind::Label, "help wanted");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.github.com/repos/octo/home/labels/help%20wanted");
        assert_eq!(header(&req, "Content-Type"), None);
        assert!(req.body.is_none());
    }

    #[test]
    fn success_range() {
        let ok = ApiResponse { status: 204, body: String::new() };
        let bad = ApiResponse { status: 301, body: String::new() };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
