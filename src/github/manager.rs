//! Public operations. Each one parses its kind, talks to GitHub, and reports the
//! outcome (success or failure) to the status sink before returning it.

use serde_json::Value;
use tracing::{info, warn};

use super::codec::{pack, prefill, serialize, update_sign};
use super::collector::collect;
use super::status::{check, describe};
use super::transport::{
    build_create, build_delete, build_fetch, build_update, ApiRequest, Transport,
};
use super::url::source_repo;
use crate::activity::{new_event, StatusSink};
use crate::error::{ManagerError, ManagerResult};
use crate::model::credentials::Credentials;
use crate::model::entry::{FormRecord, RawEntry};
use crate::model::kind::{ListMode, ResourceKind};
use crate::model::remote::{RemoteLabel, RemoteMilestone};

/// Outcome of an operation applied to many entries one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Manager {
    creds: Credentials,
    transport: Box<dyn Transport>,
    sink: Box<dyn StatusSink>,
}

impl Manager {
    pub fn new(
        creds: Credentials,
        transport: Box<dyn Transport>,
        sink: Box<dyn StatusSink>,
    ) -> Self {
        Self {
            creds,
            transport,
            sink,
        }
    }

    /// All entries of `kind` in the home (`List`) or template repository.
    pub async fn list(&self, kind: &str, mode: ListMode) -> ManagerResult<Vec<Value>> {
        let kind = self.parse_kind("list", kind)?;
        let result = self.list_kind(kind, mode).await;
        if let Ok(records) = &result {
            let repo = source_repo(&self.creds, mode).map(|r| r.to_string()).unwrap_or_default();
            let msg = format!("Loaded {} {} from {repo}.", records.len(), kind.plural());
            self.report("list", Some(kind), None, &msg);
        }
        self.finish("list", Some(kind), None, result)
    }

    pub async fn create(&self, kind: &str, form: &FormRecord) -> ManagerResult<Value> {
        let kind = self.parse_kind("create", kind)?;
        let entry = match serialize(form, kind) {
            Ok(entry) => entry,
            Err(e) => return self.finish("create", Some(kind), None, Err(e)),
        };
        self.create_entry(&entry).await
    }

    /// Update an existing entry. Fields the form leaves unset keep their current
    /// value, which is read from GitHub first.
    pub async fn update(&self, kind: &str, form: &FormRecord) -> ManagerResult<Value> {
        let kind = self.parse_kind("update", kind)?;
        let sign = match update_sign(form, kind) {
            Ok(sign) => sign,
            Err(e) => return self.finish("update", Some(kind), None, Err(e)),
        };
        let current = self
            .round_trip(build_fetch(&self.creds, kind, &sign))
            .await
            .and_then(|(_, current)| prefill(form, kind, current))
            .and_then(|form| serialize(&form, kind));
        let entry = match current {
            Ok(entry) => entry,
            Err(e) => return self.finish("update", Some(kind), Some(&sign), Err(e)),
        };

        let package = pack(&entry);
        let names = &package.names;
        let result = match build_update(&self.creds, &package) {
            Ok(request) => self.round_trip(request).await,
            Err(e) => Err(e),
        };
        let result = result.map(|(status, record)| {
            let msg = if names.original_name == names.new_name {
                format!("Updated {kind} '{}'. {status}", names.new_name)
            } else {
                format!(
                    "Updated {kind} '{}' -> '{}'. {status}",
                    names.original_name, names.new_name
                )
            };
            self.report("update", Some(kind), Some(&names.new_name), &msg);
            record
        });
        self.finish("update", Some(kind), Some(&names.new_name), result)
    }

    /// Delete by label name or milestone number.
    pub async fn delete(&self, kind: &str, api_call_sign: &str) -> ManagerResult<()> {
        let kind = self.parse_kind("delete", kind)?;
        if kind == ResourceKind::Milestone && api_call_sign.parse::<u64>().is_err() {
            let err = ManagerError::Validation(format!(
                "milestones are deleted by number, got '{api_call_sign}'"
            ));
            return self.finish("delete", Some(kind), Some(api_call_sign), Err(err));
        }
        self.delete_entry(kind, api_call_sign).await
    }

    /// Create every template entry of `kind` in the home repository.
    pub async fn copy_from_template(&self, kind: &str) -> ManagerResult<BatchReport> {
        let kind = self.parse_kind("copy", kind)?;
        let records = self.finish(
            "copy",
            Some(kind),
            None,
            self.list_kind(kind, ListMode::Template).await,
        )?;

        let mut report = BatchReport::default();
        for record in records {
            let entry = match to_new_entry(kind, record) {
                Ok(entry) => entry,
                Err(e) => {
                    self.log_failure("copy", Some(kind), None, &e);
                    report.failed += 1;
                    continue;
                }
            };
            match self.create_entry(&entry).await {
                Ok(_) => report.succeeded += 1,
                Err(_) => report.failed += 1,
            }
        }

        let msg = format!(
            "Copied {} {} from template ({} failed).",
            report.succeeded,
            kind.plural(),
            report.failed
        );
        self.report("copy", Some(kind), None, &msg);
        Ok(report)
    }

    /// Delete every entry of `kind` in the home repository.
    pub async fn purge(&self, kind: &str) -> ManagerResult<BatchReport> {
        let kind = self.parse_kind("purge", kind)?;
        let records = self.finish(
            "purge",
            Some(kind),
            None,
            self.list_kind(kind, ListMode::List).await,
        )?;

        let mut report = BatchReport::default();
        for record in records {
            let sign = match api_call_sign_of(kind, record) {
                Ok(sign) => sign,
                Err(e) => {
                    self.log_failure("purge", Some(kind), None, &e);
                    report.failed += 1;
                    continue;
                }
            };
            match self.delete_entry(kind, &sign).await {
                Ok(()) => report.succeeded += 1,
                Err(_) => report.failed += 1,
            }
        }

        let msg = format!(
            "Deleted {} {} ({} failed).",
            report.succeeded,
            kind.plural(),
            report.failed
        );
        self.report("purge", Some(kind), None, &msg);
        Ok(report)
    }

    async fn list_kind(&self, kind: ResourceKind, mode: ListMode) -> ManagerResult<Vec<Value>> {
        collect(self.transport.as_ref(), &self.creds, kind, mode).await
    }

    async fn create_entry(&self, entry: &RawEntry) -> ManagerResult<Value> {
        let kind = entry.kind();
        let package = pack(entry);
        let name = package.names.new_name.as_str();
        let result = match build_create(&self.creds, &package) {
            Ok(request) => self.round_trip(request).await,
            Err(e) => Err(e),
        };
        let result = result.map(|(status, record)| {
            let msg = format!("Created {kind} '{name}'. {status}");
            self.report("create", Some(kind), Some(name), &msg);
            record
        });
        self.finish("create", Some(kind), Some(name), result)
    }

    async fn delete_entry(&self, kind: ResourceKind, sign: &str) -> ManagerResult<()> {
        let request = build_delete(&self.creds, kind, sign);
        let result = self.round_trip(request).await.map(|(status, _)| {
            let msg = format!("Deleted {kind} '{sign}'. {status}");
            self.report("delete", Some(kind), Some(sign), &msg);
        });
        self.finish("delete", Some(kind), Some(sign), result)
    }

    /// One request; yields the status description and the decoded body.
    async fn round_trip(&self, request: ApiRequest) -> ManagerResult<(String, Value)> {
        let response = self.transport.send(request).await?;
        check(&response)?;
        Ok((describe(&response), parse_body(&response.body)?))
    }

    fn parse_kind(&self, action: &str, kind: &str) -> ManagerResult<ResourceKind> {
        let parsed = kind.parse::<ResourceKind>();
        self.finish(action, None, None, parsed)
    }

    fn report(&self, action: &str, kind: Option<ResourceKind>, entry: Option<&str>, msg: &str) {
        info!(action, kind = ?kind, entry, "{msg}");
        self.sink.log(&new_event(action, kind, entry, msg));
    }

    /// Pass the result through, logging the failure if there is one.
    fn finish<T>(
        &self,
        action: &str,
        kind: Option<ResourceKind>,
        entry: Option<&str>,
        result: ManagerResult<T>,
    ) -> ManagerResult<T> {
        if let Err(e) = &result {
            self.log_failure(action, kind, entry, e);
        }
        result
    }

    fn log_failure(
        &self,
        action: &str,
        kind: Option<ResourceKind>,
        entry: Option<&str>,
        err: &ManagerError,
    ) {
        let target = match (kind, entry) {
            (Some(kind), Some(entry)) => format!(" {kind} '{entry}'"),
            (Some(kind), None) => format!(" {}", kind.plural()),
            _ => String::new(),
        };
        let msg = format!("Could not {action}{target}: {err}");
        warn!(action, kind = ?kind, entry, "{msg}");
        self.sink.log(&new_event(action, kind, entry, &msg));
    }
}

fn parse_body(body: &str) -> ManagerResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

fn to_new_entry(kind: ResourceKind, record: Value) -> ManagerResult<RawEntry> {
    let entry = match kind {
        ResourceKind::Label => serde_json::from_value::<RemoteLabel>(record)?.into_new_entry(),
        ResourceKind::Milestone => {
            serde_json::from_value::<RemoteMilestone>(record)?.into_new_entry()
        }
    };
    Ok(entry)
}

fn api_call_sign_of(kind: ResourceKind, record: Value) -> ManagerResult<String> {
    let sign = match kind {
        ResourceKind::Label => serde_json::from_value::<RemoteLabel>(record)?.name,
        ResourceKind::Milestone => serde_json::from_value::<RemoteMilestone>(record)?
            .number
            .to_string(),
    };
    Ok(sign)
}
