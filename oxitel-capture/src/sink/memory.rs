use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use oxitel_core::AggregateRecord;

use super::RecordSink;

/// In-memory sink, primarily a test double and a reference implementation
/// of the [`RecordSink`] trait.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<AggregateRecord>>>,
}

#[derive(Debug)]
pub enum MemorySinkError {
    MutexPoisoned(String),
}

impl std::error::Error for MemorySinkError {}

impl fmt::Display for MemorySinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemorySinkError::MutexPoisoned(msg) => write!(f, "Mutex poisoned: {}", msg),
        }
    }
}

impl<T> From<PoisonError<T>> for MemorySinkError {
    fn from(err: PoisonError<T>) -> Self {
        MemorySinkError::MutexPoisoned(err.to_string())
    }
}

impl MemorySink {
    /// Records delivered so far, in delivery order.
    pub fn delivered(&self) -> Result<Vec<AggregateRecord>, MemorySinkError> {
        Ok(self.records.lock()?.clone())
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    type Error = MemorySinkError;

    async fn deliver(&self, record: &AggregateRecord) -> Result<(), Self::Error> {
        self.records.lock()?.push(record.clone());
        Ok(())
    }
}
