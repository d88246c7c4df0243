pub mod http;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use oxitel_core::AggregateRecord;

/// Output collaborator that durably stores or forwards one aggregate record.
///
/// Delivery is fire-and-forget at the call site: a failed delivery is
/// logged, the record is dropped, and the process still exits cleanly.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Error type specific to this sink implementation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one cycle's aggregate. No retry on failure.
    async fn deliver(&self, record: &AggregateRecord) -> Result<(), Self::Error>;
}
