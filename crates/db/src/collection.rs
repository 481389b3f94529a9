use async_trait::async_trait;

use crate::error::StoreResult;
use crate::query::{Filter, Query};
use crate::record::{Record, RecordId};

/// Persistence operations over one record type.
///
/// Each write is atomic for the single record it touches. Nothing spans
/// records: callers enforcing cross-record rules do so with a read followed
/// by a write.
#[async_trait]
pub trait Collection<R: Record>: Send + Sync {
    async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<R>>;

    async fn find(&self, query: Query) -> StoreResult<Vec<R>>;

    async fn find_one(&self, query: Query) -> StoreResult<Option<R>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn count(&self, filter: Filter) -> StoreResult<usize>;

    async fn insert(&self, record: R) -> StoreResult<R>;

    /// Replace the record stored at `id`. Returns `None` when there is none.
    async fn replace(&self, id: &RecordId, record: R) -> StoreResult<Option<R>>;

    /// Remove the record stored at `id`, returning it if it existed.
    async fn delete(&self, id: &RecordId) -> StoreResult<Option<R>>;
}
