//! Sample catalog used by `libris seed`.

use chrono::NaiveDate;
use libris_db::{Filter, RecordId};

use crate::catalog::Catalog;
use crate::modules::authors::models::Author;
use crate::modules::bookinstances::models::{BookInstance, LoanStatus};
use crate::modules::books::models::Book;
use crate::modules::genres::models::Genre;

/// Number of records written per collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SeedReport {
    pub authors: usize,
    pub genres: usize,
    pub books: usize,
    pub instances: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("catalog already holds {0} books; pass --force to seed anyway")]
    NotEmpty(usize),
    #[error(transparent)]
    Store(#[from] libris_db::StoreError),
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn author(first_name: &str, family_name: &str, born: Option<NaiveDate>, died: Option<NaiveDate>) -> Author {
    Author {
        id: RecordId::generate(),
        first_name: first_name.to_string(),
        family_name: family_name.to_string(),
        date_of_birth: born,
        date_of_death: died,
    }
}

fn book(title: &str, summary: &str, isbn: &str, author: &Author, genre: &[&Genre]) -> Book {
    Book {
        id: RecordId::generate(),
        title: title.to_string(),
        author: author.id.clone(),
        summary: summary.to_string(),
        isbn: isbn.to_string(),
        genre: genre.iter().map(|genre| genre.id.clone()).collect(),
    }
}

fn copy(book: &Book, imprint: &str, status: LoanStatus, due_back: Option<NaiveDate>) -> BookInstance {
    BookInstance {
        id: RecordId::generate(),
        book: book.id.clone(),
        imprint: imprint.to_string(),
        status: status.as_str().to_string(),
        due_back,
    }
}

/// Write the sample catalog. A catalog that already has books is left alone
/// unless `force` is set.
pub async fn seed(catalog: &Catalog, force: bool) -> Result<SeedReport, SeedError> {
    let existing = catalog.books.count(Filter::All).await?;
    if existing > 0 && !force {
        return Err(SeedError::NotEmpty(existing));
    }

    let rothfuss = author("Patrick", "Rothfuss", date(1973, 6, 6), None);
    let bova = author("Ben", "Bova", date(1932, 11, 8), None);
    let asimov = author("Isaac", "Asimov", date(1920, 1, 2), date(1992, 4, 6));
    let billings = author("Bob", "Billings", None, None);
    let jones = author("Jim", "Jones", date(1971, 12, 16), None);

    let fantasy = Genre::new("Fantasy");
    let scifi = Genre::new("Science Fiction");
    let poetry = Genre::new("French Poetry");

    let books = vec![
        book(
            "The Name of the Wind (The Kingkiller Chronicle, #1)",
            "I have stolen princesses back from sleeping barrow kings. I burned down the town of Trebon.",
            "9781473211896",
            &rothfuss,
            &[&fantasy],
        ),
        book(
            "The Wise Man's Fear (The Kingkiller Chronicle, #2)",
            "Picking up the tale of Kvothe Kingkiller once again, we follow him into exile.",
            "9788401352836",
            &rothfuss,
            &[&fantasy],
        ),
        book(
            "The Slow Regard of Silent Things (Kingkiller Chronicle)",
            "Deep below the University, there is a dark place.",
            "9780756411336",
            &rothfuss,
            &[&fantasy],
        ),
        book(
            "Apes and Angels",
            "Humankind headed out to the stars not for conquest, nor exploration, nor even for curiosity.",
            "9780765379528",
            &bova,
            &[&scifi],
        ),
        book(
            "Death Wave",
            "In Ben Bova's previous novel New Earth, Jordan Kell led the first human mission beyond the solar system.",
            "9780765379504",
            &bova,
            &[&scifi],
        ),
        book(
            "Test Book 1",
            "Summary of test book 1",
            "ISBN111111",
            &asimov,
            &[&fantasy, &scifi],
        ),
        book("Test Book 2", "Summary of test book 2", "ISBN222222", &billings, &[]),
    ];

    let instances = vec![
        copy(&books[0], "London Gollancz, 2014.", LoanStatus::Available, None),
        copy(&books[1], " Gollancz, 2011.", LoanStatus::Loaned, date(2026, 11, 20)),
        copy(&books[2], " Gollancz, 2015.", LoanStatus::Available, None),
        copy(&books[3], "New York Tom Doherty Associates, 2016.", LoanStatus::Available, None),
        copy(&books[3], "New York Tom Doherty Associates, 2016.", LoanStatus::Maintenance, None),
        copy(&books[4], "New York, NY Tom Doherty Associates, LLC, 2015.", LoanStatus::Reserved, None),
        copy(&books[5], "Imprint XXX2", LoanStatus::Available, None),
        copy(&books[6], "Imprint XXX3", LoanStatus::Loaned, date(2026, 12, 1)),
    ];

    let mut report = SeedReport::default();
    for record in [rothfuss, bova, asimov, billings, jones] {
        catalog.authors.insert(record).await?;
        report.authors += 1;
    }
    for record in [fantasy, scifi, poetry] {
        catalog.genres.insert(record).await?;
        report.genres += 1;
    }
    for record in books {
        catalog.books.insert(record).await?;
        report.books += 1;
    }
    for record in instances {
        catalog.instances.insert(record).await?;
        report.instances += 1;
    }

    tracing::info!(?report, "sample catalog written");
    Ok(report)
}
