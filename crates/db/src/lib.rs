//! Document record store for the libris catalog.
//!
//! Records are serde documents addressed by [`RecordId`]. A [`Collection`]
//! offers find/sort/create/replace/delete over one record type; the bundled
//! [`MemoryCollection`] keeps documents in memory, maintains secondary
//! indexes for the fields a record declares, and can mirror every write to a
//! JSON snapshot on disk.

pub mod collection;
pub mod error;
pub mod memory;
pub mod query;
pub mod record;

pub use collection::Collection;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryCollection;
pub use query::{Direction, Filter, Query, Sort};
pub use record::{Record, RecordId};
