use libris_db::{Record, RecordId};
use serde::{Deserialize, Serialize};

/// A title in the catalog. Physical copies are `BookInstance`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    /// Author reference
    pub author: RecordId,
    pub summary: String,
    pub isbn: String,
    /// Genre references
    #[serde(default)]
    pub genre: Vec<RecordId>,
}

impl Book {
    pub fn url(&self) -> String {
        format!("/catalog/books/{}", self.id)
    }

    pub fn has_genre(&self, genre: &RecordId) -> bool {
        self.genre.contains(genre)
    }
}

impl Record for Book {
    const COLLECTION: &'static str = "books";
    const INDEXES: &'static [&'static str] = &["author", "genre"];

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field(&self, name: &str) -> Vec<&str> {
        match name {
            "title" => vec![self.title.as_str()],
            "author" => vec![self.author.as_str()],
            "isbn" => vec![self.isbn.as_str()],
            "genre" => self.genre.iter().map(RecordId::as_str).collect(),
            _ => Vec::new(),
        }
    }

    fn check(&self) -> Result<(), String> {
        for (field, empty) in [
            ("title", self.title.is_empty()),
            ("author", self.author.is_empty()),
            ("summary", self.summary.is_empty()),
            ("isbn", self.isbn.is_empty()),
        ] {
            if empty {
                return Err(format!("{field} is required"));
            }
        }
        Ok(())
    }
}
