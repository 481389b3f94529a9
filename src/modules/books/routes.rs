//! Book handlers.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use libris_db::{Direction, Filter, Query, RecordId};
use libris_http::{
    error::AppError,
    form::FormData,
    validation::{field, validate, FieldError, FieldRule, Validation},
};
use minijinja::context;
use serde::Serialize;

use super::models::Book;
use crate::catalog::Catalog;
use crate::modules::authors::models::{Author, AuthorView};
use crate::modules::genres::models::Genre;
use crate::state::AppState;

pub const BOOK_LIST_PATH: &str = "/catalog/books";

const NOT_FOUND: &str = "Book not found";

/// A genre checkbox on the book form.
#[derive(Debug, Serialize)]
struct GenreChoice {
    id: RecordId,
    name: String,
    checked: bool,
}

#[derive(Debug, Serialize)]
struct BookRow {
    book: Book,
    author: Option<AuthorView>,
}

fn book_rules() -> [FieldRule; 5] {
    [
        field("title")
            .message("Title must not be empty.")
            .trim()
            .min_length(1)
            .escape(),
        field("author")
            .message("Author must not be empty.")
            .trim()
            .min_length(1)
            .escape(),
        field("summary")
            .message("Summary must not be empty.")
            .trim()
            .min_length(1)
            .escape(),
        field("isbn")
            .message("ISBN must not be empty")
            .trim()
            .min_length(1)
            .escape(),
        field("genre").each().escape(),
    ]
}

fn candidate(id: RecordId, outcome: &Validation) -> Book {
    Book {
        id,
        title: outcome.text("title"),
        author: RecordId::from(outcome.text("author")),
        summary: outcome.text("summary"),
        isbn: outcome.text("isbn"),
        genre: outcome
            .list("genre")
            .into_iter()
            .filter(|genre| !genre.is_empty())
            .map(RecordId::from)
            .collect(),
    }
}

/// Authors sorted by family name and genres sorted by name, for the form.
async fn form_choices(catalog: &Catalog) -> Result<(Vec<Author>, Vec<Genre>), AppError> {
    let choices = tokio::try_join!(
        catalog
            .authors
            .find(Query::all().sort_by("family_name", Direction::Ascending)),
        catalog
            .genres
            .find(Query::all().sort_by("name", Direction::Ascending)),
    )?;
    Ok(choices)
}

fn render_form(
    state: &AppState,
    title: &str,
    (authors, genres): (Vec<Author>, Vec<Genre>),
    book: Option<&Book>,
    errors: &[FieldError],
) -> Result<Html<String>, AppError> {
    let authors: Vec<AuthorView> = authors.into_iter().map(AuthorView::from).collect();
    let genres: Vec<GenreChoice> = genres
        .into_iter()
        .map(|genre| GenreChoice {
            checked: book.is_some_and(|book| book.has_genre(&genre.id)),
            id: genre.id,
            name: genre.name,
        })
        .collect();

    state.views.render(
        "book_form",
        context! {
            title => title,
            authors => authors,
            genres => genres,
            book => book,
            errors => errors,
        },
    )
}

/// Display list of all books.
pub async fn book_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (books, authors) = tokio::try_join!(
        state
            .catalog
            .books
            .find(Query::all().sort_by("title", Direction::Ascending)),
        state.catalog.authors.find(Query::all()),
    )?;
    let authors: HashMap<RecordId, Author> = authors
        .into_iter()
        .map(|author| (author.id.clone(), author))
        .collect();

    let rows: Vec<BookRow> = books
        .into_iter()
        .map(|book| BookRow {
            author: authors.get(&book.author).cloned().map(AuthorView::from),
            book,
        })
        .collect();

    state.views.render(
        "book_list",
        context! { title => "Book List", book_list => rows },
    )
}

/// Display detail page for a specific book.
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Html<String>, AppError> {
    let (book, instances) = tokio::try_join!(
        state.catalog.books.find_by_id(&id),
        state
            .catalog
            .instances
            .find(Query::filter(Filter::eq("book", id.as_str()))),
    )?;
    let book = book.ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let author = state
        .catalog
        .authors
        .find_by_id(&book.author)
        .await?
        .map(AuthorView::from);
    let mut genres = Vec::with_capacity(book.genre.len());
    for genre_id in &book.genre {
        if let Some(genre) = state.catalog.genres.find_by_id(genre_id).await? {
            genres.push(genre);
        }
    }

    state.views.render(
        "book_detail",
        context! {
            title => book.title.clone(),
            book => book,
            author => author,
            genres => genres,
            book_instances => instances,
        },
    )
}

/// Display book create form on GET.
pub async fn book_create_get(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let choices = form_choices(&state.catalog).await?;
    render_form(&state, "Create Book", choices, None, &[])
}

/// Handle book create on POST.
pub async fn book_create_post(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, AppError> {
    let outcome = validate(&form, &book_rules());
    let book = candidate(RecordId::generate(), &outcome);

    if !outcome.is_valid() {
        let choices = form_choices(&state.catalog).await?;
        let page = render_form(&state, "Create Book", choices, Some(&book), &outcome.errors)?;
        return Ok(page.into_response());
    }

    let book = state.catalog.books.insert(book).await?;
    tracing::info!(id = %book.id, title = %book.title, "book created");
    Ok(Redirect::to(&book.url()).into_response())
}

/// Display book delete form on GET.
pub async fn book_delete_get(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, AppError> {
    let (book, instances) = tokio::try_join!(
        state.catalog.books.find_by_id(&id),
        state
            .catalog
            .instances
            .find(Query::filter(Filter::eq("book", id.as_str()))),
    )?;
    let Some(book) = book else {
        return Ok(Redirect::to(BOOK_LIST_PATH).into_response());
    };

    let page = state.views.render(
        "book_delete",
        context! { title => "Delete Book", book => book, book_instances => instances },
    )?;
    Ok(page.into_response())
}

/// Handle book delete on POST.
///
/// Copies of the book are left in place; they show up as copies of a missing
/// book until they are deleted.
pub async fn book_delete_post(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    form: FormData,
) -> Result<Redirect, AppError> {
    let target = form.record_id("bookid").unwrap_or(id);
    if state.catalog.books.delete(&target).await?.is_some() {
        tracing::info!(id = %target, "book deleted");
    }
    Ok(Redirect::to(BOOK_LIST_PATH))
}

/// Display book update form on GET.
pub async fn book_update_get(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Html<String>, AppError> {
    let (book, choices) = tokio::try_join!(
        async {
            state
                .catalog
                .books
                .find_by_id(&id)
                .await?
                .ok_or_else(|| AppError::not_found(NOT_FOUND))
        },
        form_choices(&state.catalog),
    )?;
    render_form(&state, "Update Book", choices, Some(&book), &[])
}

/// Handle book update on POST.
pub async fn book_update_post(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    form: FormData,
) -> Result<Response, AppError> {
    let outcome = validate(&form, &book_rules());
    let book = candidate(id.clone(), &outcome);

    if !outcome.is_valid() {
        let choices = form_choices(&state.catalog).await?;
        let page = render_form(&state, "Update Book", choices, Some(&book), &outcome.errors)?;
        return Ok(page.into_response());
    }

    let url = book.url();
    state
        .catalog
        .books
        .replace(&id, book)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    tracing::info!(%id, "book updated");
    Ok(Redirect::to(&url).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use libris_db::{Filter, RecordId};

    use crate::modules::bookinstances::models::BookInstance;
    use crate::modules::genres::models::Genre;
    use crate::testing::{body_text, get, location, post_form, sample_author, sample_book, TestApp};

    #[tokio::test]
    async fn create_requires_every_text_field() {
        let app = TestApp::new();

        let response = post_form(&app.router, "/catalog/books/create", &[("title", " ")]).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        for message in [
            "Title must not be empty.",
            "Author must not be empty.",
            "Summary must not be empty.",
            "ISBN must not be empty",
        ] {
            assert!(body.contains(message), "missing '{message}'");
        }
        assert_eq!(app.state.catalog.books.count(Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejected_form_keeps_checked_genres() {
        let app = TestApp::new();
        let fantasy = app.state.catalog.genres.insert(Genre::new("Fantasy")).await.unwrap();
        let poetry = app.state.catalog.genres.insert(Genre::new("Poetry")).await.unwrap();

        let response = post_form(
            &app.router,
            "/catalog/books/create",
            &[("title", "Untitled"), ("genre", fantasy.id.as_str())],
        )
        .await;
        let body = body_text(response).await;
        assert!(body.contains(&format!("value=\"{}\" checked", fantasy.id)));
        assert!(!body.contains(&format!("value=\"{}\" checked", poetry.id)));
    }

    #[tokio::test]
    async fn create_with_several_genres() {
        let app = TestApp::new();
        let author = sample_author(&app, "Ursula", "LeGuin").await;
        let fantasy = app.state.catalog.genres.insert(Genre::new("Fantasy")).await.unwrap();
        let scifi = app.state.catalog.genres.insert(Genre::new("Science Fiction")).await.unwrap();

        let response = post_form(
            &app.router,
            "/catalog/books/create",
            &[
                ("title", "The Dispossessed"),
                ("author", author.id.as_str()),
                ("summary", "An ambiguous utopia"),
                ("isbn", "9780060512750"),
                ("genre", fantasy.id.as_str()),
                ("genre", scifi.id.as_str()),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let id = location(&response).rsplit('/').next().unwrap().to_string();
        let book = app.state.catalog.books.find_by_id(&RecordId::from(id)).await.unwrap().unwrap();
        assert_eq!(book.genre, vec![fantasy.id.clone(), scifi.id.clone()]);

        let body = body_text(get(&app.router, &book.url()).await).await;
        assert!(body.contains("LeGuin, Ursula"));
        assert!(body.contains("Science Fiction"));
        assert!(body.contains("There are no copies of this book in the library."));
    }

    #[tokio::test]
    async fn list_shows_author_names() {
        let app = TestApp::new();
        let book = sample_book(&app, "Kindred", &[]).await;
        let body = body_text(get(&app.router, "/catalog/books").await).await;
        assert!(body.contains(&book.url()));
        assert!(body.contains("Butler, Octavia"));
    }

    #[tokio::test]
    async fn missing_book_policies() {
        let app = TestApp::new();

        assert_eq!(get(&app.router, "/catalog/books/nope").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get(&app.router, "/catalog/books/nope/update").await.status(),
            StatusCode::NOT_FOUND
        );

        let response = get(&app.router, "/catalog/books/nope/delete").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/catalog/books");
    }

    #[tokio::test]
    async fn update_form_prechecks_genres() {
        let app = TestApp::new();
        let genre = app.state.catalog.genres.insert(Genre::new("Fantasy")).await.unwrap();
        let book = sample_book(&app, "Kindred", &[genre.id.clone()]).await;

        let body = body_text(get(&app.router, &format!("{}/update", book.url())).await).await;
        assert!(body.contains(&format!("value=\"{}\" checked", genre.id)));
        assert!(body.contains(&format!("value=\"{}\" selected", book.author)));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_id() {
        let app = TestApp::new();
        let book = sample_book(&app, "Kindred", &[]).await;

        let response = post_form(
            &app.router,
            &format!("{}/update", book.url()),
            &[
                ("title", "Kindred (Anniversary Edition)"),
                ("author", book.author.as_str()),
                ("summary", book.summary.as_str()),
                ("isbn", book.isbn.as_str()),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), book.url());

        let stored = app.state.catalog.books.find_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Kindred (Anniversary Edition)");
        assert_eq!(app.state.catalog.books.count(Filter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_form_lists_copies() {
        let app = TestApp::new();
        let book = sample_book(&app, "Kindred", &[]).await;
        let copy = app
            .state
            .catalog
            .instances
            .insert(BookInstance {
                id: RecordId::generate(),
                book: book.id.clone(),
                imprint: "Beacon Press".to_string(),
                status: "Available".to_string(),
                due_back: None,
            })
            .await
            .unwrap();

        let response = get(&app.router, &format!("{}/delete", book.url())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<h2>Kindred</h2>"));
        assert!(body.contains(&copy.url()));
        assert!(body.contains("Beacon Press"));
        assert!(body.contains(&format!("name=\"bookid\" type=\"hidden\" value=\"{}\"", book.id)));
    }

    #[tokio::test]
    async fn delete_removes_book_by_body_id() {
        let app = TestApp::new();
        let book = sample_book(&app, "Kindred", &[]).await;

        let response = post_form(
            &app.router,
            &format!("{}/delete", book.url()),
            &[("bookid", book.id.as_str())],
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/catalog/books");
        assert!(app.state.catalog.books.find_by_id(&book.id).await.unwrap().is_none());
    }
}
