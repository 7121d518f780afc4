//! Read-only endpoints: the home overview, health, and stats.

use chrono::Utc;

use crate::context::Context;
use crate::http::{Response, StatusCode};
use crate::pages;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `GET /`: the service overview page.
pub async fn home(_ctx: Context) -> Response {
    Response::html(StatusCode::Ok, pages::home())
}

/// `GET /api/health`: liveness snapshot for monitoring.
///
/// Always healthy while the process answers; the interesting fields are the
/// version and the environment label.
pub async fn health(ctx: Context) -> Response {
    let now = Utc::now();
    let environment = ctx.config().environment.clone();

    if ctx.request().prefers_html() {
        return Response::html(StatusCode::Ok, pages::health(VERSION, &environment, &now));
    }
    Response::json(
        StatusCode::Ok,
        &serde_json::json!({
            "status": "healthy",
            "timestamp": now,
            "version": VERSION,
            "environment": environment,
        }),
    )
}

/// `GET /api/stats`: current counts of users, messages, and visits.
///
/// Reads a snapshot; the only state change is the universal visit increment
/// applied by the request-log middleware (which covers this request too).
pub async fn stats(ctx: Context) -> Response {
    let store = ctx.store();
    let users = store.user_count();
    let messages = store.message_count();
    let visits = store.visits();
    let environment = ctx.config().environment.clone();
    let now = Utc::now();

    if ctx.request().prefers_html() {
        return Response::html(
            StatusCode::Ok,
            pages::stats(users, messages, visits, &environment, &now),
        );
    }
    Response::json(
        StatusCode::Ok,
        &serde_json::json!({
            "users": users,
            "messages": messages,
            "visits": visits,
            "timestamp": now,
            "environment": environment,
        }),
    )
}
