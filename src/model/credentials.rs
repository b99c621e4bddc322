use std::fmt;
use std::str::FromStr;

use crate::error::ManagerError;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// An `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepoRef {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(RepoRef {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(ManagerError::Validation(format!(
                "expected OWNER/REPO, got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Everything a request needs to know about who is asking and where to.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
    pub home: RepoRef,
    pub template: Option<RepoRef>,
    pub api_base: String,
}

// Keep the token out of debug output.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"***")
            .field("home", &self.home)
            .field("template", &self.template)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repo_ref() {
        let r: RepoRef = "octo/hello".parse().unwrap();
        assert_eq!(r.owner, "octo");
        assert_eq!(r.repo, "hello");
        assert_eq!(r.to_string(), "octo/hello");
    }

    #[test]
    fn rejects_malformed_repo_ref() {
        assert!("octo".parse::<RepoRef>().is_err());
        assert!("/hello".parse::<RepoRef>().is_err());
        assert!("a/b/c".parse::<RepoRef>().is_err());
    }

    #[test]
    fn debug_hides_token() {
        let creds = Credentials {
            username: "u".into(),
            token: "secret-token".into(),
            home: "o/r".parse().unwrap(),
            template: None,
            api_base: DEFAULT_API_BASE.into(),
        };
        assert!(!format!("{creds:?}").contains("secret-token"));
    }
}
