use chrono::NaiveDate;
use libris_db::{Record, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: RecordId,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub const NAME_MAX: usize = 100;

    /// "Family, First", or empty when either part is missing.
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// "1920 - 1992" style span; unknown ends are left blank.
    pub fn lifespan(&self) -> String {
        let year = |date: Option<NaiveDate>| {
            date.map(|d| d.format("%Y").to_string())
                .unwrap_or_default()
        };
        format!("{} - {}", year(self.date_of_birth), year(self.date_of_death))
    }

    pub fn url(&self) -> String {
        format!("/catalog/authors/{}", self.id)
    }
}

impl Record for Author {
    const COLLECTION: &'static str = "authors";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field(&self, name: &str) -> Vec<&str> {
        match name {
            "first_name" => vec![self.first_name.as_str()],
            "family_name" => vec![self.family_name.as_str()],
            _ => Vec::new(),
        }
    }

    fn check(&self) -> Result<(), String> {
        for (field, value) in [
            ("first_name", &self.first_name),
            ("family_name", &self.family_name),
        ] {
            if value.is_empty() {
                return Err(format!("{field} is required"));
            }
            if value.chars().count() > Self::NAME_MAX {
                return Err(format!("{field} exceeds {} characters", Self::NAME_MAX));
            }
        }
        Ok(())
    }
}

/// Author plus the derived display fields templates need.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    #[serde(flatten)]
    pub author: Author,
    pub name: String,
    pub lifespan: String,
    pub url: String,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self {
            name: author.name(),
            lifespan: author.lifespan(),
            url: author.url(),
            author,
        }
    }
}
