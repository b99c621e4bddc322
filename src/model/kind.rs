use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ManagerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Label,
    Milestone,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Label => "label",
            ResourceKind::Milestone => "milestone",
        }
    }

    /// Path segment used by the REST API.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Label => "labels",
            ResourceKind::Milestone => "milestones",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "label" | "labels" => Ok(ResourceKind::Label),
            "milestone" | "milestones" => Ok(ResourceKind::Milestone),
            other => Err(ManagerError::Validation(format!(
                "unsupported kind '{other}', expected label or milestone"
            ))),
        }
    }
}

/// Which configured repository a listing reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    #[default]
    List,
    Template,
}
