//! Server-rendered HTML pages for browser clients.
//!
//! Presentation only: no validation, no store access. Handlers pass in
//! already-fetched data and these functions return complete documents.
//! Everything user-supplied is escaped before interpolation.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::store::{Message, User};

const STYLE: &str = "\
    body{font-family:system-ui,sans-serif;max-width:720px;margin:40px auto;\
    padding:0 16px;color:#1a202c}\
    h1{margin-bottom:8px}\
    .muted{color:#718096}\
    table{border-collapse:collapse;width:100%;margin-top:16px}\
    td,th{border-bottom:1px solid #e2e8f0;padding:8px;text-align:left}\
    code{background:#f7fafc;padding:2px 6px;border-radius:4px}\
    .empty{background:#f7fafc;padding:24px;border-radius:8px;margin-top:16px}";

/// Escapes text for safe interpolation into HTML.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn stamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// The overview page served at `/`.
pub fn home() -> String {
    let body = "<h1>Pinboard</h1>\
        <p class=\"muted\">A demo HTTP service with in-memory users and messages.</p>\
        <table>\
        <tr><th>Endpoint</th><th>Description</th></tr>\
        <tr><td><code>GET /api/health</code></td><td>Health check</td></tr>\
        <tr><td><code>GET /api/stats</code></td><td>Usage statistics</td></tr>\
        <tr><td><code>GET /api/users</code></td><td>List users</td></tr>\
        <tr><td><code>POST /api/users</code></td><td>Create a user</td></tr>\
        <tr><td><code>GET /api/users/:id</code></td><td>User detail</td></tr>\
        <tr><td><code>DELETE /api/users/:id</code></td><td>Delete a user</td></tr>\
        <tr><td><code>GET /api/messages</code></td><td>List messages (API key)</td></tr>\
        <tr><td><code>POST /api/messages</code></td><td>Post a message (API key)</td></tr>\
        <tr><td><code>GET /api/search?q=</code></td><td>Search users by name</td></tr>\
        </table>";
    layout("Pinboard", body)
}

/// The health snapshot as a page.
pub fn health(version: &str, environment: &str, at: &DateTime<Utc>) -> String {
    let body = format!(
        "<h1>Healthy</h1>\
         <table>\
         <tr><td>Status</td><td>healthy</td></tr>\
         <tr><td>Version</td><td>{}</td></tr>\
         <tr><td>Environment</td><td>{}</td></tr>\
         <tr><td>Timestamp</td><td>{}</td></tr>\
         </table>",
        escape(version),
        escape(environment),
        stamp(at),
    );
    layout("Health - Pinboard", &body)
}

/// The stats snapshot as a page.
pub fn stats(
    users: usize,
    messages: usize,
    visits: u64,
    environment: &str,
    at: &DateTime<Utc>,
) -> String {
    let body = format!(
        "<h1>Statistics</h1>\
         <table>\
         <tr><td>Users</td><td>{users}</td></tr>\
         <tr><td>Messages</td><td>{messages}</td></tr>\
         <tr><td>Total visits</td><td>{visits}</td></tr>\
         <tr><td>Environment</td><td>{}</td></tr>\
         <tr><td>Timestamp</td><td>{}</td></tr>\
         </table>",
        escape(environment),
        stamp(at),
    );
    layout("Stats - Pinboard", &body)
}

/// The user listing, or an empty state when nobody is registered yet.
pub fn users(users: &[User]) -> String {
    let body = if users.is_empty() {
        "<h1>Users</h1>\
         <div class=\"empty\">No users yet. Create one with \
         <code>POST /api/users</code>.</div>"
            .to_owned()
    } else {
        let mut rows = String::new();
        for user in users {
            let _ = write!(
                rows,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                user.id,
                escape(&user.name),
                escape(&user.email),
                stamp(&user.created_at),
            );
        }
        format!(
            "<h1>Users</h1>\
             <table><tr><th>Id</th><th>Name</th><th>Email</th><th>Created</th></tr>\
             {rows}</table>"
        )
    };
    layout("Users - Pinboard", &body)
}

/// A single user's detail page.
pub fn user_detail(user: &User) -> String {
    let body = format!(
        "<h1>{}</h1>\
         <table>\
         <tr><td>Id</td><td>{}</td></tr>\
         <tr><td>Email</td><td>{}</td></tr>\
         <tr><td>Created</td><td>{}</td></tr>\
         </table>",
        escape(&user.name),
        user.id,
        escape(&user.email),
        stamp(&user.created_at),
    );
    layout("User - Pinboard", &body)
}

/// The not-found page for an unknown user id.
pub fn user_not_found(id: &str) -> String {
    let body = format!(
        "<h1>User not found</h1>\
         <p class=\"muted\">No user with id <code>{}</code> exists.</p>",
        escape(id),
    );
    layout("Not found - Pinboard", &body)
}

/// The message listing (newest first), or an empty state.
pub fn messages(messages: &[Message]) -> String {
    let body = if messages.is_empty() {
        "<h1>Messages</h1>\
         <div class=\"empty\">No messages yet. Post one with \
         <code>POST /api/messages</code>.</div>"
            .to_owned()
    } else {
        let mut rows = String::new();
        for message in messages {
            let _ = write!(
                rows,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                message.id,
                escape(&message.content),
                escape(&message.author),
                stamp(&message.created_at),
            );
        }
        format!(
            "<h1>Messages</h1>\
             <table><tr><th>Id</th><th>Content</th><th>Author</th><th>Posted</th></tr>\
             {rows}</table>"
        )
    };
    layout("Messages - Pinboard", &body)
}

/// The prompt shown when no search query was provided.
pub fn search_prompt() -> String {
    let body = "<h1>Search</h1>\
        <p class=\"muted\">Provide a query, e.g. \
        <code>/api/search?q=alice</code>.</p>";
    layout("Search - Pinboard", body)
}

/// Search results for `query`, possibly empty.
pub fn search_results(query: &str, results: &[User]) -> String {
    let body = if results.is_empty() {
        format!(
            "<h1>Search</h1>\
             <div class=\"empty\">No users matching <code>{}</code>.</div>",
            escape(query),
        )
    } else {
        let mut rows = String::new();
        for user in results {
            let _ = write!(
                rows,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                user.id,
                escape(&user.name),
                escape(&user.email),
            );
        }
        format!(
            "<h1>Search</h1>\
             <p class=\"muted\">{} result(s) for <code>{}</code></p>\
             <table><tr><th>Id</th><th>Name</th><th>Email</th></tr>{rows}</table>",
            results.len(),
            escape(query),
        )
    };
    layout("Search - Pinboard", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(name: &str) -> User {
        User {
            id: 1,
            name: name.to_owned(),
            email: "a@x.com".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn user_names_are_escaped_in_listing() {
        let page = users(&[sample_user("<b>Mallory</b>")]);
        assert!(page.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
        assert!(!page.contains("<b>Mallory</b>"));
    }

    #[test]
    fn stats_page_includes_timestamp() {
        let page = stats(1, 2, 3, "development", &Utc::now());
        assert!(page.contains("Timestamp"));
    }

    #[test]
    fn empty_listing_renders_empty_state() {
        let page = users(&[]);
        assert!(page.contains("No users yet"));
    }

    #[test]
    fn home_lists_all_endpoints() {
        let page = home();
        for endpoint in [
            "/api/health",
            "/api/stats",
            "/api/users",
            "/api/messages",
            "/api/search",
        ] {
            assert!(page.contains(endpoint), "missing {endpoint}");
        }
    }
}
