//! User management: create, list, detail, delete.

use serde::Deserialize;

use crate::context::Context;
use crate::http::{Response, StatusCode};
use crate::pages;

use super::{bad_request, not_found};

/// Request body for `POST /api/users`. Fields are optional so that absence
/// is a validation outcome rather than a deserialization failure.
#[derive(Debug, Deserialize)]
struct CreateUser {
    name: Option<String>,
    email: Option<String>,
}

/// `POST /api/users`: create a user from `{name, email}`.
///
/// Both fields are required and must be non-empty; otherwise nothing is
/// appended and the caller gets a 400.
pub async fn create(ctx: Context) -> Response {
    let Ok(input) = ctx.json::<CreateUser>() else {
        return bad_request("Name and email are required");
    };

    let (Some(name), Some(email)) = (input.name, input.email) else {
        return bad_request("Name and email are required");
    };
    if name.is_empty() || email.is_empty() {
        return bad_request("Name and email are required");
    }

    let user = ctx.store().add_user(name, email);
    tracing::info!("new user created: {}", user.name);

    Response::json(
        StatusCode::Created,
        &serde_json::json!({
            "message": "User created successfully",
            "user": user,
        }),
    )
}

/// `GET /api/users`: list all users in creation order.
///
/// An empty collection is a valid listing, not an error.
pub async fn list(ctx: Context) -> Response {
    let users = ctx.store().users();

    if ctx.request().prefers_html() {
        return Response::html(StatusCode::Ok, pages::users(&users));
    }
    Response::json(
        StatusCode::Ok,
        &serde_json::json!({"count": users.len(), "users": users}),
    )
}

/// `GET /api/users/:id`: detail for one user.
///
/// A non-numeric id is treated the same as an unknown one: not found.
pub async fn detail(ctx: Context) -> Response {
    let raw_id = ctx.params().get("id").unwrap_or_default();
    let user = raw_id.parse::<u64>().ok().and_then(|id| ctx.store().user(id));

    match user {
        Some(user) => {
            if ctx.request().prefers_html() {
                Response::html(StatusCode::Ok, pages::user_detail(&user))
            } else {
                Response::json(StatusCode::Ok, &user)
            }
        }
        None => {
            if ctx.request().prefers_html() {
                Response::html(StatusCode::NotFound, pages::user_not_found(raw_id))
            } else {
                not_found()
            }
        }
    }
}

/// `DELETE /api/users/:id`: remove a user.
///
/// Deleting an id that does not exist is deliberately not an error; the
/// response is the same confirmation either way (idempotent-delete policy).
pub async fn delete(ctx: Context) -> Response {
    let Some(id) = ctx.params().get("id").and_then(|raw| raw.parse::<u64>().ok()) else {
        return not_found();
    };

    let removed = ctx.store().remove_user(id);
    if removed {
        tracing::info!("user deleted: {id}");
    }

    Response::json(
        StatusCode::Ok,
        &serde_json::json!({"message": "User deleted successfully"}),
    )
}
