//! Changeset upload orchestration
//!
//! Drives the three-step OSM API protocol strictly in sequence: create
//! changeset, upload diff, close changeset. There is no rollback: a step-1
//! failure has no side effects anywhere, while a step-2 failure leaves an
//! empty changeset open on the server and is reported with its id so the
//! caller can warn the user. The close step is dispatched as a background
//! task that the caller does not join; its failure is logged and swallowed
//! by design, since the server auto-closes idle changesets anyway.
//!
//! On success the caller receives the changeset id and is expected to clear
//! the upload queue; on failure the queue must be left intact for retry.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::services::ChangesetUpload;
use crate::way::OsmWay;
use crate::xml::{changeset_creation_document, osm_change_document, ChangesetMeta};

/// Upload a batch of finalized ways as one changeset.
///
/// Returns the changeset id on success. Errors from step 1 are returned
/// as-is; errors from step 2 are wrapped in `Error::ChangesetOrphaned`
/// carrying the open changeset id.
pub async fn upload_changes<A>(api: Arc<A>, ways: &[OsmWay], meta: &ChangesetMeta) -> Result<u64>
where
    A: ChangesetUpload + 'static,
{
    if ways.is_empty() {
        return Err(Error::InvalidInput("upload queue is empty".to_string()));
    }

    // Step 1: create the changeset. Nothing has been uploaded yet, so a
    // failure here is fully recoverable.
    let creation_body = changeset_creation_document(meta)?;
    let changeset = api.create_changeset(creation_body).await?;
    info!(changeset, ways = ways.len(), "Changeset created");

    // Step 2: upload the diff against the id from step 1.
    let diff_body = osm_change_document(ways, changeset)?;
    let diff_result = api
        .upload_diff(changeset, diff_body)
        .await
        .map_err(|source| Error::ChangesetOrphaned {
            changeset,
            source: Box::new(source),
        })?;
    info!(
        changeset,
        result_len = diff_result.len(),
        "Changeset diff applied"
    );

    // Step 3: close, fire-and-forget. The edits are already applied, so
    // success is reported without waiting for this call.
    let close_api = Arc::clone(&api);
    tokio::spawn(async move {
        if let Err(err) = close_api.close_changeset(changeset).await {
            warn!(changeset, error = %err, "Failed to close changeset; it will auto-close server-side");
        }
    });

    Ok(changeset)
}
