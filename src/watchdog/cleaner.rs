//! Best-effort removal of the marker record.

use std::sync::Arc;

use crate::observability::metrics;
use crate::watchdog::client::NodeApi;
use crate::watchdog::marker::MarkerRecord;

/// Deletes the marker so it does not linger in the node's service list.
pub struct MarkerCleaner<A> {
    api: Arc<A>,
    marker: MarkerRecord,
}

impl<A: NodeApi> MarkerCleaner<A> {
    pub fn new(api: Arc<A>, marker: MarkerRecord) -> Self {
        Self { api, marker }
    }

    /// Never fails; errors are logged and dropped.
    pub async fn cleanup(&self) {
        tracing::info!(
            service = %self.marker.service_name,
            "Deleting persistent marker instance to restore the service list"
        );

        match self.api.delete_marker(&self.marker).await {
            Ok(response) => tracing::info!(
                status = response.status,
                body = %response.body,
                "Marker deleted"
            ),
            Err(e) => {
                metrics::record_cleanup_failure();
                tracing::info!(error = %e, "Marker deletion failed, ignoring");
            }
        }
    }
}
