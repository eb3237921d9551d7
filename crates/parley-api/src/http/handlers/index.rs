//! Minimal browser chat client.

use axum::response::Html;

/// GET / -- static chat page talking to `/chat`.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../../assets/index.html"))
}
