//! Author handlers.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use libris_db::{Direction, Filter, Query, RecordId, StoreResult};
use libris_http::{
    error::AppError,
    form::FormData,
    validation::{field, validate, FieldRule, Validation},
};
use minijinja::context;

use super::models::{Author, AuthorView};
use crate::catalog::Catalog;
use crate::modules::books::models::Book;
use crate::state::AppState;

pub const AUTHOR_LIST_PATH: &str = "/catalog/authors";

const NOT_FOUND: &str = "Author not found";

fn author_rules() -> [FieldRule; 4] {
    [
        field("first_name")
            .trim()
            .min_length(1)
            .with_message("First name must be specified.")
            .escape()
            .alphanumeric()
            .with_message("First name has non-alphanumeric characters."),
        field("family_name")
            .trim()
            .min_length(1)
            .with_message("Family name must be specified.")
            .escape()
            .alphanumeric()
            .with_message("Family name has non-alphanumeric characters."),
        field("date_of_birth")
            .message("Invalid date of birth")
            .optional()
            .iso8601()
            .to_date(),
        field("date_of_death")
            .message("Invalid date of death")
            .optional()
            .iso8601()
            .to_date(),
    ]
}

fn candidate(id: RecordId, outcome: &Validation) -> Author {
    Author {
        id,
        first_name: outcome.text("first_name"),
        family_name: outcome.text("family_name"),
        date_of_birth: outcome.date("date_of_birth"),
        date_of_death: outcome.date("date_of_death"),
    }
}

/// The author and every book they wrote, fetched together.
async fn author_with_books(
    catalog: &Catalog,
    id: &RecordId,
) -> StoreResult<(Option<Author>, Vec<Book>)> {
    tokio::try_join!(
        catalog.authors.find_by_id(id),
        catalog.books.find(
            Query::filter(Filter::eq("author", id.as_str())).sort_by("title", Direction::Ascending)
        ),
    )
}

/// Display list of all authors.
pub async fn author_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let authors: Vec<AuthorView> = state
        .catalog
        .authors
        .find(Query::all().sort_by("family_name", Direction::Ascending))
        .await?
        .into_iter()
        .map(AuthorView::from)
        .collect();

    state.views.render(
        "author_list",
        context! { title => "Author List", author_list => authors },
    )
}

/// Display detail page for a specific author.
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Html<String>, AppError> {
    let (author, books) = author_with_books(&state.catalog, &id).await?;
    let author = author.ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    state.views.render(
        "author_detail",
        context! {
            title => "Author Detail",
            author => AuthorView::from(author),
            author_books => books,
        },
    )
}

/// Display author create form on GET.
pub async fn author_create_get(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state
        .views
        .render("author_form", context! { title => "Create Author" })
}

/// Handle author create on POST.
pub async fn author_create_post(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, AppError> {
    let outcome = validate(&form, &author_rules());
    let author = candidate(RecordId::generate(), &outcome);

    if !outcome.is_valid() {
        let page = state.views.render(
            "author_form",
            context! { title => "Create Author", author => author, errors => outcome.errors },
        )?;
        return Ok(page.into_response());
    }

    let author = state.catalog.authors.insert(author).await?;
    tracing::info!(id = %author.id, name = %author.name(), "author created");
    Ok(Redirect::to(&author.url()).into_response())
}

/// Display author delete form on GET.
pub async fn author_delete_get(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, AppError> {
    let (author, books) = author_with_books(&state.catalog, &id).await?;
    let Some(author) = author else {
        return Ok(Redirect::to(AUTHOR_LIST_PATH).into_response());
    };

    let page = state.views.render(
        "author_delete",
        context! {
            title => "Delete Author",
            author => AuthorView::from(author),
            author_books => books,
        },
    )?;
    Ok(page.into_response())
}

/// Handle author delete on POST.
///
/// The id comes from the `authorid` form field, falling back to the path. An
/// author with books on record is kept and the confirmation page is shown
/// again listing those books.
pub async fn author_delete_post(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    form: FormData,
) -> Result<Response, AppError> {
    let target = form.record_id("authorid").unwrap_or(id);
    let (author, books) = author_with_books(&state.catalog, &target).await?;

    if !books.is_empty() {
        tracing::warn!(id = %target, books = books.len(), "refusing to delete referenced author");
        let page = state.views.render(
            "author_delete",
            context! {
                title => "Delete Author",
                author => author.map(AuthorView::from),
                author_books => books,
            },
        )?;
        return Ok(page.into_response());
    }

    if state.catalog.authors.delete(&target).await?.is_some() {
        tracing::info!(id = %target, "author deleted");
    }
    Ok(Redirect::to(AUTHOR_LIST_PATH).into_response())
}

/// Display author update form on GET.
pub async fn author_update_get(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Html<String>, AppError> {
    let author = state
        .catalog
        .authors
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    state.views.render(
        "author_form",
        context! { title => "Update Author", author => author },
    )
}

/// Handle author update on POST.
pub async fn author_update_post(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    form: FormData,
) -> Result<Response, AppError> {
    let outcome = validate(&form, &author_rules());
    let author = candidate(id.clone(), &outcome);

    if !outcome.is_valid() {
        let page = state.views.render(
            "author_form",
            context! { title => "Update Author", author => author, errors => outcome.errors },
        )?;
        return Ok(page.into_response());
    }

    let url = author.url();
    state
        .catalog
        .authors
        .replace(&id, author)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    tracing::info!(%id, "author updated");
    Ok(Redirect::to(&url).into_response())
}
