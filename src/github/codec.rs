//! Form record -> typed entry -> request package.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ManagerError, ManagerResult};
use crate::model::entry::{
    FormRecord, LabelEntry, MilestoneEntry, MilestoneState, NewMilestoneEntry, RawEntry,
};
use crate::model::kind::ResourceKind;
use crate::model::remote::{RemoteLabel, RemoteMilestone};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelBody {
    pub name: String,
    pub color: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneBody {
    pub title: String,
    pub state: MilestoneState,
    pub description: String,
    /// `None` omits the key, `Some(None)` sends an explicit `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<Option<String>>,
}

/// The JSON written by create and update calls. Never carries identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntryBody {
    Label(LabelBody),
    Milestone(MilestoneBody),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNames {
    pub original_name: String,
    pub new_name: String,
    /// Path identifier for update/delete: the original label name or the
    /// milestone number. Absent for milestones that do not exist yet.
    pub api_call_sign: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPackage {
    pub kind: ResourceKind,
    pub body: EntryBody,
    pub names: EntryNames,
}

/// Combine a `YYYY-MM-DD` date and an optional time into a UTC instant.
///
/// Returns `None` when no date was given. Time defaults to midnight and accepts
/// `HH:MM:SS` or `HH:MM`.
pub fn format_date(date: Option<&str>, time: Option<&str>) -> ManagerResult<Option<String>> {
    let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d,
        None => return Ok(None),
    };
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        ManagerError::Validation(format!("invalid date '{date}', expected YYYY-MM-DD"))
    })?;

    let clock = match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
            .map_err(|_| {
                ManagerError::Validation(format!("invalid time '{t}', expected HH:MM:SS"))
            })?,
        None => NaiveTime::MIN,
    };

    let instant = NaiveDateTime::new(day, clock);
    Ok(Some(instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()))
}

/// Split a GitHub timestamp back into the form's `(date, time)` pair.
pub fn split_date(due_on: &str) -> ManagerResult<(String, String)> {
    let instant = DateTime::parse_from_rfc3339(due_on)
        .map_err(|_| ManagerError::Validation(format!("invalid due date '{due_on}'")))?
        .naive_utc();
    Ok((
        instant.format("%Y-%m-%d").to_string(),
        instant.format("%H:%M:%S").to_string(),
    ))
}

/// The path identifier an update form points at, before any request is made.
pub fn update_sign(form: &FormRecord, kind: ResourceKind) -> ManagerResult<String> {
    match kind {
        ResourceKind::Label => non_empty(&form.original_name)
            .or_else(|| non_empty(&form.name))
            .ok_or_else(|| ManagerError::Validation("name is required".into())),
        ResourceKind::Milestone => form.number.map(|n| n.to_string()).ok_or_else(|| {
            let title = non_empty(&form.title).unwrap_or_default();
            ManagerError::Validation(format!("'{title}' does not exist yet and cannot be updated"))
        }),
    }
}

/// Fill the fields the form leaves unset from the entry as GitHub has it now.
///
/// Fields the form does set win, including empty strings, which clear a value.
pub fn prefill(form: &FormRecord, kind: ResourceKind, current: Value) -> ManagerResult<FormRecord> {
    let mut form = form.clone();
    match kind {
        ResourceKind::Label => {
            let label: RemoteLabel = serde_json::from_value(current)?;
            form.original_name.get_or_insert_with(|| label.name.clone());
            form.name.get_or_insert(label.name);
            form.color.get_or_insert(label.color);
            form.description.get_or_insert(label.description.unwrap_or_default());
        }
        ResourceKind::Milestone => {
            let milestone: RemoteMilestone = serde_json::from_value(current)?;
            form.original_title.get_or_insert_with(|| milestone.title.clone());
            form.title.get_or_insert(milestone.title);
            form.state.get_or_insert_with(|| milestone.state.to_string());
            form.description.get_or_insert(milestone.description.unwrap_or_default());
            if form.due_date.is_none() && form.due_time.is_none() {
                if let Some(due_on) = milestone.due_on.as_deref() {
                    let (date, time) = split_date(due_on)?;
                    form.due_date = Some(date);
                    form.due_time = Some(time);
                }
            }
        }
    }
    Ok(form)
}

/// Read a form into a typed entry for `kind`.
pub fn serialize(form: &FormRecord, kind: ResourceKind) -> ManagerResult<RawEntry> {
    match kind {
        ResourceKind::Label => serialize_label(form).map(RawEntry::Label),
        ResourceKind::Milestone => serialize_milestone(form),
    }
}

fn serialize_label(form: &FormRecord) -> ManagerResult<LabelEntry> {
    let name = required(&form.name, "name")?;
    let original_name = non_empty(&form.original_name).unwrap_or_else(|| name.clone());
    let color = normalize_color(form.color.as_deref().unwrap_or_default())?;

    Ok(LabelEntry {
        name,
        original_name,
        color,
        description: form.description.clone().unwrap_or_default(),
    })
}

fn serialize_milestone(form: &FormRecord) -> ManagerResult<RawEntry> {
    let title = required(&form.title, "title")?;
    let state: MilestoneState = form.state.as_deref().unwrap_or_default().parse()?;
    let description = form.description.clone().unwrap_or_default();
    let due_on = format_date(form.due_date.as_deref(), form.due_time.as_deref())?;

    let entry = match form.number {
        Some(number) => RawEntry::ExistingMilestone(MilestoneEntry {
            original_title: non_empty(&form.original_title).unwrap_or_else(|| title.clone()),
            title,
            state,
            description,
            due_on,
            number,
        }),
        None => RawEntry::NewMilestone(NewMilestoneEntry {
            title,
            state,
            description,
            due_on,
        }),
    };
    Ok(entry)
}

/// Build the request body and bookkeeping names. The entry is left untouched.
pub fn pack(entry: &RawEntry) -> EntryPackage {
    match entry {
        RawEntry::Label(label) => EntryPackage {
            kind: ResourceKind::Label,
            body: EntryBody::Label(LabelBody {
                name: label.name.clone(),
                color: label.color.clone(),
                description: label.description.clone(),
            }),
            names: EntryNames {
                original_name: label.original_name.clone(),
                new_name: label.name.clone(),
                api_call_sign: Some(label.original_name.clone()),
            },
        },
        RawEntry::ExistingMilestone(milestone) => EntryPackage {
            kind: ResourceKind::Milestone,
            body: EntryBody::Milestone(MilestoneBody {
                title: milestone.title.clone(),
                state: milestone.state,
                description: milestone.description.clone(),
                due_on: Some(milestone.due_on.clone()),
            }),
            names: EntryNames {
                original_name: milestone.original_title.clone(),
                new_name: milestone.title.clone(),
                api_call_sign: Some(milestone.number.to_string()),
            },
        },
        RawEntry::NewMilestone(milestone) => EntryPackage {
            kind: ResourceKind::Milestone,
            body: EntryBody::Milestone(MilestoneBody {
                title: milestone.title.clone(),
                state: milestone.state,
                description: milestone.description.clone(),
                due_on: milestone.due_on.clone().map(Some),
            }),
            names: EntryNames {
                original_name: milestone.title.clone(),
                new_name: milestone.title.clone(),
                api_call_sign: None,
            },
        },
    }
}

fn normalize_color(raw: &str) -> ManagerResult<String> {
    let color = raw.trim().trim_start_matches('#');
    if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(color.to_lowercase())
    } else {
        Err(ManagerError::Validation(format!(
            "label color must be six hex digits, got '{raw}'"
        )))
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn required(field: &Option<String>, label: &str) -> ManagerResult<String> {
    non_empty(field).ok_or_else(|| ManagerError::Validation(format!("{label} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_form() -> FormRecord {
        FormRecord {
            name: Some("bug".into()),
            original_name: Some("defect".into()),
            color: Some("#D73A4A".into()),
            description: Some("Something is broken".into()),
            ..Default::default()
        }
    }

    fn milestone_form(number: Option<u64>) -> FormRecord {
        FormRecord {
            title: Some("v1.0".into()),
            original_title: Some("v0.9".into()),
            state: Some("closed".into()),
            description: Some("First release".into()),
            due_date: Some("2024-03-05".into()),
            number,
            ..Default::default()
        }
    }

    #[test]
    fn date_with_time() {
        let out = format_date(Some("2024-03-05"), Some("14:30:00")).unwrap();
        assert_eq!(out.as_deref(), Some("2024-03-05T14:30:00Z"));
    }

    #[test]
    fn date_defaults_to_midnight() {
        let out = format_date(Some("2024-03-05"), None).unwrap();
        assert_eq!(out.as_deref(), Some("2024-03-05T00:00:00Z"));
    }

    #[test]
    fn no_date_is_none() {
        assert_eq!(format_date(None, Some("10:00:00")).unwrap(), None);
        assert_eq!(format_date(Some("  "), None).unwrap(), None);
    }

    #[test]
    fn short_time_is_accepted() {
        let out = format_date(Some("2024-12-31"), Some("23:59")).unwrap();
        assert_eq!(out.as_deref(), Some("2024-12-31T23:59:00Z"));
    }

    #[test]
    fn bad_date_is_validation_error() {
        assert!(matches!(
            format_date(Some("2024-13-40"), None),
            Err(ManagerError::Validation(_))
        ));
        assert!(matches!(
            format_date(Some("2024-03-05"), Some("25:00:00")),
            Err(ManagerError::Validation(_))
        ));
    }

    #[test]
    fn label_color_is_normalized() {
        let entry = serialize(&label_form(), ResourceKind::Label).unwrap();
        match entry {
            RawEntry::Label(l) => {
                assert_eq!(l.color, "d73a4a");
                assert_eq!(l.original_name, "defect");
            }
            other => panic!("expected label, got {other:?}"),
        }
    }

    #[test]
    fn label_requires_name_and_valid_color() {
        let mut form = label_form();
        form.name = None;
        assert!(matches!(
            serialize(&form, ResourceKind::Label),
            Err(ManagerError::Validation(_))
        ));

        let mut form = label_form();
        form.color = Some("red".into());
        assert!(matches!(
            serialize(&form, ResourceKind::Label),
            Err(ManagerError::Validation(_))
        ));
    }

    #[test]
    fn label_without_original_name_uses_name() {
        let mut form = label_form();
        form.original_name = None;
        let package = pack(&serialize(&form, ResourceKind::Label).unwrap());
        assert_eq!(package.names.api_call_sign.as_deref(), Some("bug"));
    }

    #[test]
    fn number_decides_milestone_variant() {
        let existing = serialize(&milestone_form(Some(3)), ResourceKind::Milestone).unwrap();
        assert!(matches!(existing, RawEntry::ExistingMilestone(_)));

        let new = serialize(&milestone_form(None), ResourceKind::Milestone).unwrap();
        assert!(matches!(new, RawEntry::NewMilestone(_)));
    }

    #[test]
    fn packed_bodies_carry_no_identity_fields() {
        let forms = [
            (label_form(), ResourceKind::Label),
            (milestone_form(Some(3)), ResourceKind::Milestone),
            (milestone_form(None), ResourceKind::Milestone),
        ];
        for (form, kind) in forms {
            let package = pack(&serialize(&form, kind).unwrap());
            let body = serde_json::to_value(&package.body).unwrap();
            let obj = body.as_object().unwrap();
            for key in ["original_name", "originalName", "original_title", "originalTitle", "number"] {
                assert!(!obj.contains_key(key), "{key} leaked into {kind} body");
            }
        }
    }

    #[test]
    fn label_package() {
        let package = pack(&serialize(&label_form(), ResourceKind::Label).unwrap());
        assert_eq!(package.kind, ResourceKind::Label);
        assert_eq!(package.names.original_name, "defect");
        assert_eq!(package.names.new_name, "bug");
        assert_eq!(package.names.api_call_sign.as_deref(), Some("defect"));

        let body = serde_json::to_value(&package.body).unwrap();
        assert_eq!(body["name"], "bug");
        assert_eq!(body["color"], "d73a4a");
        assert_eq!(body["description"], "Something is broken");
    }

    #[test]
    fn existing_milestone_package() {
        let package = pack(&serialize(&milestone_form(Some(12)), ResourceKind::Milestone).unwrap());
        assert_eq!(package.names.api_call_sign.as_deref(), Some("12"));
        assert_eq!(package.names.original_name, "v0.9");

        let body = serde_json::to_value(&package.body).unwrap();
        assert_eq!(body["title"], "v1.0");
        assert_eq!(body["state"], "closed");
        assert_eq!(body["due_on"], "2024-03-05T00:00:00Z");
    }

    #[test]
    fn existing_milestone_without_date_sends_null() {
        let mut form = milestone_form(Some(12));
        form.due_date = None;
        let package = pack(&serialize(&form, ResourceKind::Milestone).unwrap());
        let body = serde_json::to_value(&package.body).unwrap();
        assert!(body.as_object().unwrap().contains_key("due_on"));
        assert!(body["due_on"].is_null());
    }

    #[test]
    fn new_milestone_omits_missing_date() {
        let mut form = milestone_form(None);
        form.due_date = None;
        let package = pack(&serialize(&form, ResourceKind::Milestone).unwrap());
        assert_eq!(package.names.api_call_sign, None);
        let body = serde_json::to_value(&package.body).unwrap();
        assert!(!body.as_object().unwrap().contains_key("due_on"));
    }

    #[test]
    fn pack_leaves_entry_untouched() {
        let entry = serialize(&label_form(), ResourceKind::Label).unwrap();
        let before = entry.clone();
        let _ = pack(&entry);
        assert_eq!(entry, before);
    }

    #[test]
    fn split_date_inverts_format_date() {
        let (date, time) = split_date("2024-03-05T14:30:00Z").unwrap();
        assert_eq!((date.as_str(), time.as_str()), ("2024-03-05", "14:30:00"));
        assert_eq!(
            format_date(Some(&date), Some(&time)).unwrap().as_deref(),
            Some("2024-03-05T14:30:00Z")
        );
        assert!(matches!(split_date("soon"), Err(ManagerError::Validation(_))));
    }

    #[test]
    fn update_sign_prefers_original_name() {
        let mut form = label_form();
        form.original_name = Some("bug".into());
        form.name = Some("defect".into());
        assert_eq!(update_sign(&form, ResourceKind::Label).unwrap(), "bug");

        form.original_name = None;
        assert_eq!(update_sign(&form, ResourceKind::Label).unwrap(), "defect");

        let unsaved = milestone_form(None);
        assert!(update_sign(&unsaved, ResourceKind::Milestone).is_err());
        assert_eq!(update_sign(&milestone_form(Some(3)), ResourceKind::Milestone).unwrap(), "3");
    }

    #[test]
    fn prefill_only_fills_unset_fields() {
        let current = serde_json::json!({
            "number": 3,
            "title": "v1",
            "state": "closed",
            "description": null,
            "due_on": "2024-01-02T00:00:00Z"
        });
        let form = FormRecord {
            title: Some("v1.1".into()),
            number: Some(3),
            ..Default::default()
        };
        let filled = prefill(&form, ResourceKind::Milestone, current).unwrap();
        assert_eq!(filled.title.as_deref(), Some("v1.1"));
        assert_eq!(filled.original_title.as_deref(), Some("v1"));
        assert_eq!(filled.state.as_deref(), Some("closed"));
        assert_eq!(filled.description.as_deref(), Some(""));
        assert_eq!(filled.due_date.as_deref(), Some("2024-01-02"));
        assert_eq!(filled.due_time.as_deref(), Some("00:00:00"));
    }

    #[test]
    fn prefill_keeps_a_new_due_date() {
        let current = serde_json::json!({
            "number": 3, "title": "v1", "state": "open", "due_on": "2024-01-02T00:00:00Z"
        });
        let mut form = milestone_form(Some(3));
        form.due_date = Some("2025-06-01".into());
        form.due_time = None;
        let filled = prefill(&form, ResourceKind::Milestone, current).unwrap();
        assert_eq!(filled.due_date.as_deref(), Some("2025-06-01"));
        assert_eq!(filled.due_time, None);
    }
}
