use libris_db::{Record, RecordId};
use serde::{Deserialize, Serialize};

/// A genre books can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: RecordId,
    pub name: String,
}

impl Genre {
    pub const NAME_MIN: usize = 3;
    pub const NAME_MAX: usize = 100;

    /// A new, unsaved genre with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into(),
        }
    }

    pub fn url(&self) -> String {
        format!("/catalog/genres/{}", self.id)
    }
}

impl Record for Genre {
    const COLLECTION: &'static str = "genres";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field(&self, name: &str) -> Vec<&str> {
        match name {
            "name" => vec![self.name.as_str()],
            _ => Vec::new(),
        }
    }

    fn check(&self) -> Result<(), String> {
        let length = self.name.chars().count();
        if !(Self::NAME_MIN..=Self::NAME_MAX).contains(&length) {
            return Err(format!(
                "name must be {} to {} characters",
                Self::NAME_MIN,
                Self::NAME_MAX
            ));
        }
        Ok(())
    }
}
