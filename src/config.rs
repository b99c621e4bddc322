use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ManagerError;
use crate::model::credentials::{Credentials, RepoRef, DEFAULT_API_BASE};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub github: Option<GitHubConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GitHubConfig {
    pub username: Option<String>,
    pub token: Option<String>,
    pub home_owner: Option<String>,
    pub home_repo: Option<String>,
    pub template_owner: Option<String>,
    pub template_repo: Option<String>,
    pub api_base: Option<String>,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub home: Option<RepoRef>,
    pub template: Option<RepoRef>,
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".repo-labels")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

fn field(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn missing(name: &str) -> ManagerError {
    ManagerError::Config(format!(
        "missing github.{name} (set it in {})",
        config_path().display()
    ))
}

/// Merge the config file with command-line overrides into complete credentials.
pub fn resolve_credentials(
    config: &AppConfig,
    overrides: Overrides,
) -> Result<Credentials, ManagerError> {
    let gh = config.github.clone().unwrap_or_default();

    let username = field(&gh.username).ok_or_else(|| missing("username"))?;
    let token = match overrides.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => token,
        None => field(&gh.token).ok_or_else(|| missing("token"))?,
    };

    let home = match overrides.home {
        Some(home) => home,
        None => RepoRef {
            owner: field(&gh.home_owner).ok_or_else(|| missing("home_owner"))?,
            repo: field(&gh.home_repo).ok_or_else(|| missing("home_repo"))?,
        },
    };

    let template = match overrides.template {
        Some(template) => Some(template),
        None => match (field(&gh.template_owner), field(&gh.template_repo)) {
            (Some(owner), Some(repo)) => Some(RepoRef { owner, repo }),
            (None, None) => None,
            (Some(_), None) => return Err(missing("template_repo")),
            (None, Some(_)) => return Err(missing("template_owner")),
        },
    };

    Ok(Credentials {
        username,
        token,
        home,
        template,
        api_base: field(&gh.api_base).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
    })
}
