use serde::{Deserialize, Serialize};

use super::entry::{LabelEntry, MilestoneState, NewMilestoneEntry, RawEntry};

/// A label as returned by `GET /repos/{owner}/{repo}/labels`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteLabel {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A milestone as returned by `GET /repos/{owner}/{repo}/milestones`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteMilestone {
    pub number: u64,
    pub title: String,
    pub state: MilestoneState,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_on: Option<String>,
}

impl RemoteLabel {
    /// Turn a label read from another repository into one to create here.
    pub fn into_new_entry(self) -> RawEntry {
        RawEntry::Label(LabelEntry {
            original_name: self.name.clone(),
            name: self.name,
            color: self.color,
            description: self.description.unwrap_or_default(),
        })
    }
}

impl RemoteMilestone {
    /// Drops the number: the copy gets a fresh one from the target repository.
    pub fn into_new_entry(self) -> RawEntry {
        RawEntry::NewMilestone(NewMilestoneEntry {
            title: self.title,
            state: self.state,
            description: self.description.unwrap_or_default(),
            due_on: self.due_on,
        })
    }
}
