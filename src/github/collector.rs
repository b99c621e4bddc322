use serde_json::Value;
use tracing::debug;

use super::status::check;
use super::transport::{build_get, Transport};
use crate::error::{ManagerError, ManagerResult};
use crate::model::credentials::Credentials;
use crate::model::kind::{ListMode, ResourceKind};

/// Upper bound on pages fetched by one listing (1000 records at 20 per page).
pub const MAX_PAGES: u32 = 50;

/// Fetch every record of `kind`, page by page, until a page comes back empty.
///
/// Pages are requested strictly in order and records keep the server's order.
/// Any failure discards what was collected so far.
pub async fn collect(
    transport: &dyn Transport,
    creds: &Credentials,
    kind: ResourceKind,
    mode: ListMode,
) -> ManagerResult<Vec<Value>> {
    let mut records = Vec::new();

    for page in 1..=MAX_PAGES {
        let request = build_get(creds, kind, page, mode)?;
        let response = transport.send(request).await?;
        check(&response)?;

        let batch: Vec<Value> = serde_json::from_str(&response.body)?;
        debug!(%kind, page, count = batch.len(), "page fetched");

        if batch.is_empty() {
            if page == 1 {
                return Err(ManagerError::EmptyResult { kind });
            }
            return Ok(records);
        }
        records.extend(batch);
    }

    Err(ManagerError::PageLimit {
        kind,
        pages: MAX_PAGES,
    })
}
