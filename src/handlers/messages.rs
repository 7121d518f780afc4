//! Message board: create and list, both behind the shared-secret gate.

use serde::Deserialize;

use crate::context::Context;
use crate::http::{Response, StatusCode};
use crate::pages;

use super::{bad_request, unauthorized};

/// Request body for `POST /api/messages`. `author` is optional and
/// defaults to `"Anonymous"` at the store layer.
#[derive(Debug, Deserialize)]
struct CreateMessage {
    content: Option<String>,
    author: Option<String>,
}

/// `POST /api/messages`: post a message.
///
/// The access filter runs first: a bad or missing key is rejected before
/// any validation or mutation. `content` is required and must be non-empty.
pub async fn create(ctx: Context) -> Response {
    if !ctx.state().secret.authorizes(ctx.request()) {
        return unauthorized();
    }

    let Ok(input) = ctx.json::<CreateMessage>() else {
        return bad_request("Content is required");
    };

    let Some(content) = input.content.filter(|c| !c.is_empty()) else {
        return bad_request("Content is required");
    };

    let message = ctx.store().add_message(content, input.author);
    tracing::info!("new message posted by {}", message.author);

    Response::json(
        StatusCode::Created,
        &serde_json::json!({
            "message": "Message posted successfully",
            "data": message,
        }),
    )
}

/// `GET /api/messages`: list messages newest-first.
///
/// Gated by the same shared secret as posting. An empty board is a valid
/// listing.
pub async fn list(ctx: Context) -> Response {
    if !ctx.state().secret.authorizes(ctx.request()) {
        return unauthorized();
    }

    let messages = ctx.store().messages();

    if ctx.request().prefers_html() {
        return Response::html(StatusCode::Ok, pages::messages(&messages));
    }
    Response::json(
        StatusCode::Ok,
        &serde_json::json!({"count": messages.len(), "messages": messages}),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::{body_json, ctx, state};

    const KEY: (&str, &str) = ("X-API-Key", "demo-api-key");

    #[tokio::test]
    async fn post_without_key_is_rejected_before_mutation() {
        let state = state();
        let res = create(ctx(
            &state,
            "POST",
            "/api/messages",
            &[],
            r#"{"content": "hello"}"#,
        ))
        .await;
        assert_eq!(res.status(), StatusCode::Unauthorized);
        assert_eq!(body_json(&res)["error"], "Invalid or missing API key");
        assert_eq!(state.store.message_count(), 0);
    }

    #[tokio::test]
    async fn post_with_wrong_key_is_rejected() {
        let state = state();
        let res = create(ctx(
            &state,
            "POST",
            "/api/messages",
            &[("X-API-Key", "wrong")],
            r#"{"content": "hello"}"#,
        ))
        .await;
        assert_eq!(res.status(), StatusCode::Unauthorized);
        assert_eq!(state.store.message_count(), 0);
    }

    #[tokio::test]
    async fn post_with_valid_key_creates_message() {
        let state = state();
        let res = create(ctx(
            &state,
            "POST",
            "/api/messages",
            &[KEY],
            r#"{"content": "hello", "author": "Dana"}"#,
        ))
        .await;
        assert_eq!(res.status(), StatusCode::Created);
        let body = body_json(&res);
        assert_eq!(body["message"], "Message posted successfully");
        assert_eq!(body["data"]["content"], "hello");
        assert_eq!(body["data"]["author"], "Dana");
    }

    #[tokio::test]
    async fn author_defaults_to_anonymous() {
        let state = state();
        let res = create(ctx(
            &state,
            "POST",
            "/api/messages",
            &[KEY],
            r#"{"content": "hello"}"#,
        ))
        .await;
        assert_eq!(body_json(&res)["data"]["author"], "Anonymous");
    }

    #[tokio::test]
    async fn missing_content_is_rejected_without_mutation() {
        let state = state();
        let res = create(ctx(
            &state,
            "POST",
            "/api/messages",
            &[KEY],
            r#"{"author": "Dana"}"#,
        ))
        .await;
        assert_eq!(res.status(), StatusCode::BadRequest);
        assert_eq!(body_json(&res)["error"], "Content is required");
        assert_eq!(state.store.message_count(), 0);
    }

    #[tokio::test]
    async fn list_without_key_is_rejected() {
        let state = state();
        let res = list(ctx(&state, "GET", "/api/messages", &[], "")).await;
        assert_eq!(res.status(), StatusCode::Unauthorized);
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let state = state();
        state.store.add_message("first", None);
        state.store.add_message("second", None);

        let res = list(ctx(&state, "GET", "/api/messages", &[KEY], "")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        let body = body_json(&res);
        assert_eq!(body["count"], 2);
        assert_eq!(body["messages"][0]["content"], "second");
        assert_eq!(body["messages"][1]["content"], "first");
    }

    #[tokio::test]
    async fn empty_board_lists_successfully() {
        let state = state();
        let res = list(ctx(&state, "GET", "/api/messages", &[KEY], "")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(body_json(&res)["count"], 0);
    }
}
