pub mod coin;
pub mod dashboard;
pub mod market;
pub mod search;
pub mod watchlist;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: String,
}

/// Render a template into a response; a render failure is the one error we
/// cannot dress up as a page, so it degrades to a bare 500.
pub(crate) fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!("template render failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Something went wrong</h1>".to_string()),
            )
                .into_response()
        }
    }
}

/// Full-page degraded state for upstream failures.
pub(crate) fn error_page(message: &str) -> Response {
    render(ErrorTemplate {
        message: message.to_string(),
    })
}
