//! Book copy handlers. A copy that cannot be found is a 404.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use libris_db::{Direction, Query, RecordId};
use libris_http::{
    error::AppError,
    form::FormData,
    validation::{field, validate, FieldError, FieldRule, Validation},
};
use minijinja::context;
use serde::Serialize;

use super::models::{BookInstance, LoanStatus};
use crate::catalog::Catalog;
use crate::modules::books::models::Book;
use crate::state::AppState;

pub const BOOKINSTANCE_LIST_PATH: &str = "/catalog/bookinstances";

const NOT_FOUND: &str = "Book copy not found";

/// Entry in the book picker.
#[derive(Debug, Serialize)]
struct BookChoice {
    id: RecordId,
    title: String,
}

/// A copy with its book resolved. `book` is `None` when the reference dangles.
#[derive(Debug, Serialize)]
struct InstanceRow {
    instance: BookInstance,
    book: Option<Book>,
}

fn bookinstance_rules() -> [FieldRule; 4] {
    [
        field("book")
            .message("Book must be specified")
            .trim()
            .min_length(1)
            .escape(),
        field("imprint").trim().escape(),
        field("status").escape(),
        field("due_back")
            .message("Invalid date")
            .optional()
            .iso8601()
            .to_date(),
    ]
}

/// Build a copy from validated form values. The result is used both for
/// saving and for showing a rejected form back to the user.
fn candidate(id: RecordId, outcome: &Validation) -> BookInstance {
    let status = outcome.text("status");
    BookInstance {
        id,
        book: RecordId::from(outcome.text("book")),
        imprint: outcome.text("imprint"),
        status: if status.is_empty() {
            LoanStatus::default().as_str().to_string()
        } else {
            status
        },
        due_back: outcome.date("due_back"),
    }
}

async fn book_choices(catalog: &Catalog) -> Result<Vec<BookChoice>, AppError> {
    let books = catalog
        .books
        .find(Query::all().sort_by("title", Direction::Ascending))
        .await?;
    Ok(books
        .into_iter()
        .map(|book| BookChoice {
            id: book.id,
            title: book.title,
        })
        .collect())
}

/// Fetch a copy and resolve its book, or fail with 404.
async fn find_instance(catalog: &Catalog, id: &RecordId) -> Result<InstanceRow, AppError> {
    let instance = catalog
        .instances
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    let book = catalog.books.find_by_id(&instance.book).await?;
    Ok(InstanceRow { instance, book })
}

fn render_form(
    state: &AppState,
    title: &str,
    books: Vec<BookChoice>,
    instance: Option<&BookInstance>,
    errors: &[FieldError],
) -> Result<Html<String>, AppError> {
    let statuses: Vec<&str> = LoanStatus::ALL.iter().map(|s| s.as_str()).collect();
    state.views.render(
        "bookinstance_form",
        context! {
            title => title,
            book_list => books,
            selected_book => instance.map(|i| i.book.clone()),
            bookinstance => instance,
            statuses => statuses,
            errors => errors,
        },
    )
}

/// Display list of all book copies.
pub async fn bookinstance_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (instances, books) = tokio::try_join!(
        state.catalog.instances.find(Query::all()),
        state.catalog.books.find(Query::all()),
    )?;
    let books: HashMap<RecordId, Book> =
        books.into_iter().map(|book| (book.id.clone(), book)).collect();

    let rows: Vec<InstanceRow> = instances
        .into_iter()
        .map(|instance| InstanceRow {
            book: books.get(&instance.book).cloned(),
            instance,
        })
        .collect();

    state.views.render(
        "bookinstance_list",
        context! { title => "Book Instance List", bookinstance_list => rows },
    )
}

/// Display detail page for a specific copy.
pub async fn bookinstance_detail(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Html<String>, AppError> {
    let row = find_instance(&state.catalog, &id).await?;
    state.views.render(
        "bookinstance_detail",
        context! { title => "Book:", bookinstance => row.instance, book => row.book },
    )
}

/// Display copy create form on GET.
pub async fn bookinstance_create_get(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let books = book_choices(&state.catalog).await?;
    render_form(&state, "Create BookInstance", books, None, &[])
}

/// Handle copy create on POST.
pub async fn bookinstance_create_post(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, AppError> {
    let outcome = validate(&form, &bookinstance_rules());
    let instance = candidate(RecordId::generate(), &outcome);

    if !outcome.is_valid() {
        let books = book_choices(&state.catalog).await?;
        let page = render_form(
            &state,
            "Create BookInstance",
            books,
            Some(&instance),
            &outcome.errors,
        )?;
        return Ok(page.into_response());
    }

    let instance = state.catalog.instances.insert(instance).await?;
    tracing::info!(id = %instance.id, book = %instance.book, "book copy created");
    Ok(Redirect::to(&instance.url()).into_response())
}

/// Display copy delete form on GET.
pub async fn bookinstance_delete_get(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Html<String>, AppError> {
    let row = find_instance(&state.catalog, &id).await?;
    state.views.render(
        "bookinstance_delete",
        context! { title => "Delete BookInstance", bookinstance => row.instance, book => row.book },
    )
}

/// Handle copy delete on POST. Deleting an unknown id still succeeds.
pub async fn bookinstance_delete_post(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    form: FormData,
) -> Result<Redirect, AppError> {
    let target = form.record_id("bookinstanceid").unwrap_or(id);
    if state.catalog.instances.delete(&target).await?.is_some() {
        tracing::info!(id = %target, "book copy deleted");
    }
    Ok(Redirect::to(BOOKINSTANCE_LIST_PATH))
}

/// Display copy update form on GET.
pub async fn bookinstance_update_get(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Html<String>, AppError> {
    let (instance, books) = tokio::try_join!(
        async {
            state
                .catalog
                .instances
                .find_by_id(&id)
                .await?
                .ok_or_else(|| AppError::not_found(NOT_FOUND))
        },
        book_choices(&state.catalog),
    )?;
    render_form(&state, "Update BookInstance", books, Some(&instance), &[])
}

/// Handle copy update on POST.
pub async fn bookinstance_update_post(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    form: FormData,
) -> Result<Response, AppError> {
    let outcome = validate(&form, &bookinstance_rules());
    let instance = candidate(id.clone(), &outcome);

    if !outcome.is_valid() {
        let books = book_choices(&state.catalog).await?;
        let page = render_form(
            &state,
            "Update BookInstance",
            books,
            Some(&instance),
            &outcome.errors,
        )?;
        return Ok(page.into_response());
    }

    let url = instance.url();
    state
        .catalog
        .instances
        .replace(&id, instance)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    tracing::info!(%id, "book copy updated");
    Ok(Redirect::to(&url).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use libris_db::{Filter, Query, RecordId};

    use crate::modules::bookinstances::models::BookInstance;
    use crate::testing::{body_text, get, location, post_form, sample_book, TestApp};

    async fn sample_copy(app: &TestApp, status: &str) -> BookInstance {
        let book = sample_book(app, "Gideon the Ninth", &[]).await;
        app.state
            .catalog
            .instances
            .insert(BookInstance {
                id: RecordId::generate(),
                book: book.id,
                imprint: "Tor, 2019".to_string(),
                status: status.to_string(),
                due_back: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_copy_is_not_found() {
        let app = TestApp::new();

        for uri in [
            "/catalog/bookinstances/nope",
            "/catalog/bookinstances/nope/delete",
            "/catalog/bookinstances/nope/update",
        ] {
            let response = get(&app.router, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn create_without_book_is_rejected() {
        let app = TestApp::new();

        let response = post_form(
            &app.router,
            "/catalog/bookinstances/create",
            &[("book", "  "), ("imprint", "Tor"), ("status", "Available")],
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Book must be specified"));
        assert_eq!(app.state.catalog.instances.count(Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_with_bad_date_keeps_selected_book() {
        let app = TestApp::new();
        let book = sample_book(&app, "Harrow the Ninth", &[]).await;

        let response = post_form(
            &app.router,
            "/catalog/bookinstances/create",
            &[
                ("book", book.id.as_str()),
                ("imprint", "Tor"),
                ("status", "Loaned"),
                ("due_back", "next week"),
            ],
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Invalid date"));
        assert!(body.contains(&format!("value=\"{}\" selected", book.id)));
        assert_eq!(app.state.catalog.instances.count(Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_persists_and_redirects_to_detail() {
        let app = TestApp::new();
        let book = sample_book(&app, "Harrow the Ninth", &[]).await;

        for due_back in ["2026-11-01", ""] {
            let response = post_form(
                &app.router,
                "/catalog/bookinstances/create",
                &[
                    ("book", book.id.as_str()),
                    ("imprint", "Tor, 2020"),
                    ("status", "Loaned"),
                    ("due_back", due_back),
                ],
            )
            .await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);

            let id = location(&response).rsplit('/').next().unwrap().to_string();
            let stored = app
                .state
                .catalog
                .instances
                .find_by_id(&RecordId::from(id))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.book, book.id);
            assert_eq!(stored.status, "Loaned");
            assert_eq!(
                stored.due_back,
                NaiveDate::from_ymd_opt(2026, 11, 1).filter(|_| !due_back.is_empty())
            );
        }
    }

    #[tokio::test]
    async fn empty_status_defaults_to_maintenance() {
        let app = TestApp::new();
        let book = sample_book(&app, "Nona the Ninth", &[]).await;

        let response = post_form(
            &app.router,
            "/catalog/bookinstances/create",
            &[("book", book.id.as_str()), ("imprint", "Tor")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let copies = app.state.catalog.instances.find(Query::all()).await.unwrap();
        assert_eq!(copies[0].status, "Maintenance");
    }

    #[tokio::test]
    async fn detail_shows_resolved_book() {
        let app = TestApp::new();
        let copy = sample_copy(&app, "Loaned").await;

        let response = get(&app.router, &copy.url()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Gideon the Ninth"));
        assert!(body.contains("Tor, 2019"));
    }

    #[tokio::test]
    async fn list_shows_every_copy() {
        let app = TestApp::new();
        sample_copy(&app, "Available").await;
        sample_copy(&app, "Reserved").await;

        let body = body_text(get(&app.router, "/catalog/bookinstances").await).await;
        assert_eq!(body.matches("Gideon the Ninth").count(), 2);
    }

    #[tokio::test]
    async fn delete_form_shows_copy() {
        let app = TestApp::new();
        let copy = sample_copy(&app, "Reserved").await;

        let response = get(&app.router, &format!("{}/delete", copy.url())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Gideon the Ninth"));
        assert!(body.contains("Tor, 2019"));
        assert!(body.contains("Reserved"));
        assert!(body.contains(&format!(
            "name=\"bookinstanceid\" type=\"hidden\" value=\"{}\"",
            copy.id
        )));
    }

    #[tokio::test]
    async fn delete_uses_id_from_body() {
        let app = TestApp::new();
        let copy = sample_copy(&app, "Available").await;

        let response = post_form(
            &app.router,
            "/catalog/bookinstances/whatever/delete",
            &[("bookinstanceid", copy.id.as_str())],
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/catalog/bookinstances");
        assert!(app.state.catalog.instances.find_by_id(&copy.id).await.unwrap().is_none());

        let again = post_form(
            &app.router,
            "/catalog/bookinstances/whatever/delete",
            &[("bookinstanceid", copy.id.as_str())],
        )
        .await;
        assert_eq!(again.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn update_form_preselects_book_and_status() {
        let app = TestApp::new();
        let copy = sample_copy(&app, "Reserved").await;

        let body = body_text(get(&app.router, &format!("{}/update", copy.url())).await).await;
        assert!(body.contains(&format!("value=\"{}\" selected", copy.book)));
        assert!(body.contains("value=\"Reserved\" selected"));
    }

    #[tokio::test]
    async fn update_keeps_id_and_is_repeatable() {
        let app = TestApp::new();
        let copy = sample_copy(&app, "Available").await;
        let uri = format!("{}/update", copy.url());
        let fields = [
            ("book", copy.book.as_str()),
            ("imprint", "Tor, 2021"),
            ("status", "Loaned"),
            ("due_back", "2026-12-24"),
        ];

        let first = post_form(&app.router, &uri, &fields).await;
        assert_eq!(first.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&first), copy.url());
        let after_first = app.state.catalog.instances.find_by_id(&copy.id).await.unwrap();

        let second = post_form(&app.router, &uri, &fields).await;
        assert_eq!(location(&second), copy.url());
        let after_second = app.state.catalog.instances.find_by_id(&copy.id).await.unwrap();

        assert_eq!(after_first, after_second);
        let stored = after_second.unwrap();
        assert_eq!(stored.id, copy.id);
        assert_eq!(stored.imprint, "Tor, 2021");
        assert_eq!(stored.due_back, NaiveDate::from_ymd_opt(2026, 12, 24));
        assert_eq!(app.state.catalog.instances.count(Filter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_with_bad_date_rerenders_and_keeps_stored_record() {
        let app = TestApp::new();
        let copy = sample_copy(&app, "Available").await;
        let other = sample_book(&app, "Harrow the Ninth", &[]).await;

        let response = post_form(
            &app.router,
            &format!("{}/update", copy.url()),
            &[
                ("book", other.id.as_str()),
                ("imprint", "Tor, 2021"),
                ("status", "Loaned"),
                ("due_back", "2026-13-45"),
            ],
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Invalid date"));
        assert!(body.contains(&format!("value=\"{}\" selected", other.id)));
        assert!(body.contains("value=\"Loaned\" selected"));

        let stored = app.state.catalog.instances.find_by_id(&copy.id).await.unwrap();
        assert_eq!(stored, Some(copy));
    }

    #[tokio::test]
    async fn update_of_missing_copy_is_not_found() {
        let app = TestApp::new();
        let book = sample_book(&app, "Alecto the Ninth", &[]).await;

        let response = post_form(
            &app.router,
            "/catalog/bookinstances/nope/update",
            &[("book", book.id.as_str()), ("status", "Available")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
