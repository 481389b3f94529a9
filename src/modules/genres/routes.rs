//! Genre handlers.
//!
//! A genre that cannot be found sends the browser back to the genre list
//! rather than raising an error.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use libris_db::{Direction, Filter, Query, RecordId, StoreResult};
use libris_http::{
    error::AppError,
    form::FormData,
    validation::{field, validate, FieldRule},
};
use minijinja::context;

use super::models::Genre;
use crate::catalog::Catalog;
use crate::modules::books::models::Book;
use crate::state::AppState;

pub const GENRE_LIST_PATH: &str = "/catalog/genres";

fn genre_rules() -> [FieldRule; 1] {
    [field("name")
        .message("Genre name must contain at least 3 characters")
        .trim()
        .min_length(Genre::NAME_MIN)
        .escape()]
}

/// The genre and every book filed under it, fetched together.
async fn genre_with_books(
    catalog: &Catalog,
    id: &RecordId,
) -> StoreResult<(Option<Genre>, Vec<Book>)> {
    tokio::try_join!(
        catalog.genres.find_by_id(id),
        catalog.books.find(
            Query::filter(Filter::eq("genre", id.as_str())).sort_by("title", Direction::Ascending)
        ),
    )
}

/// Display list of all genres.
pub async fn genre_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let genres = state
        .catalog
        .genres
        .find(Query::all().sort_by("name", Direction::Ascending))
        .await?;

    state.views.render(
        "genre_list",
        context! { title => "Genre List", genre_list => genres },
    )
}

/// Display detail page for a specific genre.
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, AppError> {
    let (genre, books) = genre_with_books(&state.catalog, &id).await?;
    let Some(genre) = genre else {
        tracing::debug!(%id, "genre not found, redirecting to list");
        return Ok(Redirect::to(GENRE_LIST_PATH).into_response());
    };

    let page = state.views.render(
        "genre_detail",
        context! { title => "Genre Detail", genre => genre, genre_books => books },
    )?;
    Ok(page.into_response())
}

/// Display genre create form on GET.
pub async fn genre_create_get(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state
        .views
        .render("genre_form", context! { title => "Create Genre" })
}

/// Handle genre create on POST.
///
/// Submitting a name that already exists, in any letter case, leads to the
/// existing genre instead of creating a second one.
pub async fn genre_create_post(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, AppError> {
    let outcome = validate(&form, &genre_rules());
    let genre = Genre::new(outcome.text("name"));

    if !outcome.is_valid() {
        let page = state.views.render(
            "genre_form",
            context! { title => "Create Genre", genre => genre, errors => outcome.errors },
        )?;
        return Ok(page.into_response());
    }

    let existing = state
        .catalog
        .genres
        .find_one(Query::filter(Filter::eq_ignore_case(
            "name",
            genre.name.as_str(),
        )))
        .await?;
    if let Some(existing) = existing {
        tracing::debug!(id = %existing.id, name = %existing.name, "genre already exists");
        return Ok(Redirect::to(&existing.url()).into_response());
    }

    let genre = state.catalog.genres.insert(genre).await?;
    tracing::info!(id = %genre.id, name = %genre.name, "genre created");
    Ok(Redirect::to(&genre.url()).into_response())
}

/// Display genre delete form on GET.
pub async fn genre_delete_get(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Response, AppError> {
    let (genre, books) = genre_with_books(&state.catalog, &id).await?;
    let Some(genre) = genre else {
        return Ok(Redirect::to(GENRE_LIST_PATH).into_response());
    };

    let page = state.views.render(
        "genre_delete",
        context! { title => "Delete Genre", genre => genre, genre_books => books },
    )?;
    Ok(page.into_response())
}

/// Handle genre delete on POST.
///
/// The id comes from the `genreid` form field, falling back to the path. A
/// genre that books still reference is not deleted; the confirmation page is
/// shown again listing those books.
pub async fn genre_delete_post(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    form: FormData,
) -> Result<Response, AppError> {
    let target = form.record_id("genreid").unwrap_or(id);
    let (genre, books) = genre_with_books(&state.catalog, &target).await?;

    if !books.is_empty() {
        tracing::warn!(id = %target, books = books.len(), "refusing to delete referenced genre");
        let page = state.views.render(
            "genre_delete",
            context! { title => "Delete Genre", genre => genre, genre_books => books },
        )?;
        return Ok(page.into_response());
    }

    if state.catalog.genres.delete(&target).await?.is_some() {
        tracing::info!(id = %target, "genre deleted");
    }
    Ok(Redirect::to(GENRE_LIST_PATH).into_response())
}

/// Display genre update form on GET.
pub async fn genre_update_get() -> &'static str {
    "NOT IMPLEMENTED: Genre update GET"
}

/// Handle genre update on POST.
pub async fn genre_update_post() -> &'static str {
    "NOT IMPLEMENTED: Genre update POST"
}
