use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::Form;
use serde::Deserialize;
use tracing::{error, info};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct ToggleForm {
    pub coin_id: String,
    pub redirect: Option<String>,
}

/// Flip watchlist membership for one coin, then bounce back to the page
/// that submitted the form. Only local redirect targets are honored.
pub async fn toggle(State(state): State<Arc<AppState>>, Form(form): Form<ToggleForm>) -> Redirect {
    {
        let mut store = state.watchlist.lock().unwrap_or_else(|e| e.into_inner());
        match store.toggle(&form.coin_id) {
            Ok(watched) => {
                info!(
                    "{} {} watchlist",
                    form.coin_id,
                    if watched { "added to" } else { "removed from" }
                );
            }
            Err(err) => error!("watchlist persist failed for {}: {err}", form.coin_id),
        }
    }

    let target = form
        .redirect
        .as_deref()
        .filter(|t| t.starts_with('/') && !t.starts_with("//"))
        .unwrap_or("/");
    Redirect::to(target)
}
