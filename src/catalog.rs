//! Handle on the four record collections.

use std::path::Path;
use std::sync::Arc;

use libris_db::{Collection, MemoryCollection, StoreResult};

use crate::modules::authors::models::Author;
use crate::modules::bookinstances::models::BookInstance;
use crate::modules::books::models::Book;
use crate::modules::genres::models::Genre;

/// The record store as seen by handlers. Cheap to clone; one per process,
/// passed to every request through router state.
#[derive(Clone)]
pub struct Catalog {
    pub books: Arc<dyn Collection<Book>>,
    pub authors: Arc<dyn Collection<Author>>,
    pub genres: Arc<dyn Collection<Genre>>,
    pub instances: Arc<dyn Collection<BookInstance>>,
}

impl Catalog {
    /// Empty catalog that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(MemoryCollection::<Book>::new()),
            authors: Arc::new(MemoryCollection::<Author>::new()),
            genres: Arc::new(MemoryCollection::<Genre>::new()),
            instances: Arc::new(MemoryCollection::<BookInstance>::new()),
        }
    }

    /// Open every collection, snapshotting to `data_dir` when one is given.
    pub async fn open(data_dir: Option<&Path>) -> StoreResult<Self> {
        let (books, authors, genres, instances) = tokio::try_join!(
            MemoryCollection::<Book>::open(data_dir),
            MemoryCollection::<Author>::open(data_dir),
            MemoryCollection::<Genre>::open(data_dir),
            MemoryCollection::<BookInstance>::open(data_dir),
        )?;

        Ok(Self {
            books: Arc::new(books),
            authors: Arc::new(authors),
            genres: Arc::new(genres),
            instances: Arc::new(instances),
        })
    }
}
