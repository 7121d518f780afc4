//! User search by name substring.

use crate::context::Context;
use crate::http::{Response, StatusCode};
use crate::pages;

/// `GET /api/search?q=`: case-insensitive substring search over user names.
///
/// An empty or absent query yields a prompt, not an error; zero matches is
/// a valid, empty result set. Matches come back in insertion order.
pub async fn users(ctx: Context) -> Response {
    let query = ctx
        .request()
        .query_param("q")
        .unwrap_or_default()
        .to_owned();

    if query.is_empty() {
        if ctx.request().prefers_html() {
            return Response::html(StatusCode::Ok, pages::search_prompt());
        }
        return Response::json(
            StatusCode::Ok,
            &serde_json::json!({
                "message": "Provide a search query using ?q=",
                "results": [],
            }),
        );
    }

    let results = ctx.store().search_users(&query);

    if ctx.request().prefers_html() {
        return Response::html(StatusCode::Ok, pages::search_results(&query, &results));
    }
    Response::json(
        StatusCode::Ok,
        &serde_json::json!({
            "query": query,
            "count": results.len(),
            "results": results,
        }),
    )
}
