//! Waiting helpers for asynchronous extraction

use crate::common::InMemoryHost;
use pvr_extract::DownloadId;
use std::time::Duration;

/// Wait until the host has seen exactly `expected` ready-flag changes for `id`
///
/// Returns false on timeout.
pub async fn wait_for_ready_history(
    host: &InMemoryHost,
    id: &DownloadId,
    expected: &[bool],
    timeout: Duration,
) -> bool {
    tokio::time::timeout(timeout, async {
        while host.ready_history(id) != expected {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .is_ok()
}
