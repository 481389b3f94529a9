//! HTML view rendering.
//!
//! Templates live in `templates/` and are compiled into the binary. Each view
//! name maps to `<name>.html`; all of them extend `layout.html`. Output is
//! HTML-escaped by default.

use anyhow::Context;
use axum::response::Html;
use libris_http::error::AppError;
use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("genre_list.html", include_str!("../templates/genre_list.html")),
    ("genre_detail.html", include_str!("../templates/genre_detail.html")),
    ("genre_form.html", include_str!("../templates/genre_form.html")),
    ("genre_delete.html", include_str!("../templates/genre_delete.html")),
    ("bookinstance_list.html", include_str!("../templates/bookinstance_list.html")),
    ("bookinstance_detail.html", include_str!("../templates/bookinstance_detail.html")),
    ("bookinstance_form.html", include_str!("../templates/bookinstance_form.html")),
    ("bookinstance_delete.html", include_str!("../templates/bookinstance_delete.html")),
    ("book_list.html", include_str!("../templates/book_list.html")),
    ("book_detail.html", include_str!("../templates/book_detail.html")),
    ("book_form.html", include_str!("../templates/book_form.html")),
    ("book_delete.html", include_str!("../templates/book_delete.html")),
    ("author_list.html", include_str!("../templates/author_list.html")),
    ("author_detail.html", include_str!("../templates/author_detail.html")),
    ("author_form.html", include_str!("../templates/author_form.html")),
    ("author_delete.html", include_str!("../templates/author_delete.html")),
    ("form_errors.html", include_str!("../templates/form_errors.html")),
];

/// Compiled template set.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Compile the bundled templates. Fails on any syntax error.
    pub fn load() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .with_context(|| format!("failed to compile template '{name}'"))?;
        }
        Ok(Self { env })
    }

    /// Render the named view with the given context.
    pub fn render<S: Serialize>(&self, view: &str, ctx: S) -> Result<Html<String>, AppError> {
        let template = self
            .env
            .get_template(&format!("{view}.html"))
            .with_context(|| format!("unknown view '{view}'"))?;
        let html = template
            .render(ctx)
            .with_context(|| format!("failed to render view '{view}'"))?;
        Ok(Html(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn all_templates_compile() {
        assert!(Views::load().is_ok());
    }

    #[test]
    fn output_is_escaped() {
        let views = Views::load().unwrap();
        let Html(html) = views
            .render(
                "genre_form",
                context! { title => "Create Genre", genre => context! { name => "<i>x</i>" } },
            )
            .unwrap();
        assert!(html.contains("&lt;i&gt;x&lt;/i&gt;") || html.contains("&lt;i&gt;x&lt;&#x2f;i&gt;"));
        assert!(!html.contains("<i>x</i>"));
    }

    #[test]
    fn unknown_view_is_internal_error() {
        let views = Views::load().unwrap();
        let err = views.render("missing_view", context! {}).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
