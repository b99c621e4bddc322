use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::kind::ResourceKind;
use crate::error::ManagerError;

/// Field values as typed into the edit form. Every field is optional; which ones
/// matter depends on the kind being submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormRecord {
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub color: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub number: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for MilestoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestoneState::Open => f.write_str("open"),
            MilestoneState::Closed => f.write_str("closed"),
        }
    }
}

impl FromStr for MilestoneState {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "open" => Ok(MilestoneState::Open),
            "closed" => Ok(MilestoneState::Closed),
            other => Err(ManagerError::Validation(format!(
                "milestone state must be open or closed, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    pub name: String,
    pub original_name: String,
    /// Six hex digits, no leading `#`.
    pub color: String,
    pub description: String,
}

/// A milestone that already exists on the server and is addressed by its number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneEntry {
    pub title: String,
    pub original_title: String,
    pub state: MilestoneState,
    pub description: String,
    pub due_on: Option<String>,
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMilestoneEntry {
    pub title: String,
    pub state: MilestoneState,
    pub description: String,
    pub due_on: Option<String>,
}

/// One entry ready to be packed into a request. A milestone's variant is decided
/// solely by whether it carries a server-assigned number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    Label(LabelEntry),
    ExistingMilestone(MilestoneEntry),
    NewMilestone(NewMilestoneEntry),
}

impl RawEntry {
    pub fn kind(&self) -> ResourceKind {
        match self {
            RawEntry::Label(_) => ResourceKind::Label,
            RawEntry::ExistingMilestone(_) | RawEntry::NewMilestone(_) => ResourceKind::Milestone,
        }
    }
}
