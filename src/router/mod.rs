//! Request routing: map URL patterns and HTTP methods to handler functions.
//!
//! [`Router`] dispatches incoming requests to handler functions based on the
//! request method and URL path. Two pattern styles are supported:
//!
//! | Pattern          | Example match | Captured params |
//! |------------------|---------------|-----------------|
//! | `/api/users`     | `/api/users`  | *(none)*        |
//! | `/api/users/:id` | `/api/users/4`| `id → "4"`      |
//!
//! Trailing slashes are normalized on both patterns and incoming paths, so
//! `/api/users/` and `/api/users` are treated as equivalent.
//!
//! Routes are matched in registration order; the first route whose method
//! and pattern both match wins. When nothing matches, the router answers
//! with the structured `404` body every unknown resource gets.

use std::pin::Pin;
use std::sync::Arc;

use crate::context::{Context, PathParams};
use crate::{Method, Response, StatusCode};

/// Type-erased, heap-allocated async handler that processes a [`Context`]
/// and returns a [`Response`].
///
/// Handlers are stored behind `Arc<dyn Fn(…)>` so they can be cloned and
/// shared across threads without copying the underlying function. Use
/// [`Router::get`], [`Router::post`], and [`Router::delete`] rather than
/// constructing this type directly.
pub type Handler =
    Arc<dyn Fn(Context) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Context) -> impl Future<Output = Response> + Send` that is also
/// `Send + Sync + 'static` implements this trait via the blanket impl, so
/// plain `async fn` handlers register directly.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler with the given context, boxing the returned future.
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = Response> + Send>>;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin((self)(ctx))
    }
}

// A single path segment, either a literal string or a named capture (`:name`).
#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Parameter(String),
}

// Compiled representation of a route pattern string.
#[derive(Debug, Clone)]
enum Pattern {
    // Matches one exact path string, e.g. `/api/users`.
    Exact(String),
    // Matches a fixed number of segments where some may be named captures.
    Parameterized { segments: Vec<Segment> },
}

impl Pattern {
    // Parse a route pattern string. A trailing slash (other than on the
    // root `/`) is stripped before classification.
    fn parse(pattern: &str) -> Self {
        let pattern = if pattern != "/" && pattern.ends_with('/') {
            &pattern[..pattern.len() - 1]
        } else {
            pattern
        };

        if pattern.contains(':') {
            let segments = pattern
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| {
                    if let Some(p) = s.strip_prefix(':') {
                        Segment::Parameter(p.to_string())
                    } else {
                        Segment::Static(s.to_string())
                    }
                })
                .collect();

            return Pattern::Parameterized { segments };
        }

        Pattern::Exact(pattern.to_string())
    }

    // Try to match `path` against this pattern, returning extracted
    // [`PathParams`] on success.
    fn matches(&self, path: &str) -> Option<PathParams> {
        let path = if path != "/" && path.ends_with('/') {
            &path[..path.len() - 1]
        } else {
            path
        };

        match self {
            Pattern::Exact(p) => {
                if p == path {
                    Some(PathParams::new())
                } else {
                    None
                }
            }
            Pattern::Parameterized { segments } => {
                let mut params = PathParams::new();
                let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

                if segments.len() != path_segments.len() {
                    return None;
                }

                for (seg, path_seg) in segments.iter().zip(path_segments) {
                    match seg {
                        Segment::Static(s) => {
                            if s != path_seg {
                                return None;
                            }
                        }
                        Segment::Parameter(name) => {
                            params.insert(name.clone(), path_seg.to_string());
                        }
                    }
                }

                Some(params)
            }
        }
    }
}

// A single registered route binding a method + pattern to a handler.
struct Route {
    method: Method,
    pattern: Pattern,
    handler: Handler,
}

impl Route {
    fn new(method: Method, pattern: &str, handler: Handler) -> Self {
        Self {
            method,
            pattern: Pattern::parse(pattern),
            handler,
        }
    }

    // Returns `Some(params)` when both the HTTP method and path pattern match.
    fn matches(&self, method: &Method, path: &str) -> Option<PathParams> {
        if &self.method == method {
            self.pattern.matches(path)
        } else {
            None
        }
    }
}

/// HTTP request router that dispatches requests to registered handlers.
///
/// # Examples
///
/// ```rust,no_run
/// use pinboard::router::Router;
/// use pinboard::http::{Response, StatusCode};
///
/// let mut router = Router::new();
/// router.get("/api/health", |_ctx| async {
///     Response::new(StatusCode::Ok)
/// });
/// ```
pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new, empty `Router` with no registered routes.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers a handler for `GET` requests matching `path`.
    pub fn get(&mut self, path: &str, handler: impl IntoHandler) {
        self.add_route(Method::Get, path, handler);
    }

    /// Registers a handler for `POST` requests matching `path`.
    pub fn post(&mut self, path: &str, handler: impl IntoHandler) {
        self.add_route(Method::Post, path, handler);
    }

    /// Registers a handler for `DELETE` requests matching `path`.
    pub fn delete(&mut self, path: &str, handler: impl IntoHandler) {
        self.add_route(Method::Delete, path, handler);
    }

    // Erase the concrete handler type and store it as a `Handler` trait object.
    fn add_route(&mut self, method: Method, path: &str, handler: impl IntoHandler) {
        let handler: Handler = Arc::new(move |ctx| handler.call(ctx));
        self.routes.push(Route::new(method, path, handler));
    }

    /// Returns the number of routes registered in this router.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatches the request in `ctx` to the first matching route.
    ///
    /// Routes are tested in registration order; the first route whose HTTP
    /// method and path pattern both match wins, and its captured path
    /// parameters are installed on the context before the handler runs.
    /// When no route matches, a structured `404` response is returned.
    pub async fn dispatch(&self, mut ctx: Context) -> Response {
        let method = ctx.request().method().clone();
        let path = ctx.request().path().to_owned();

        for route in &self.routes {
            if let Some(params) = route.matches(&method, &path) {
                ctx.set_params(params);
                return (route.handler)(ctx).await;
            }
        }

        Response::json(
            StatusCode::NotFound,
            &serde_json::json!({"error": "Resource not found", "status": 404}),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::Config;
    use crate::http::Request;

    fn make_ctx(method: &str, path: &str) -> Context {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        Context::new(req, Arc::new(AppState::new(Config::default())))
    }

    // ── Pattern matching ──────────────────────────────────────────────────

    #[test]
    fn pattern_parse_root() {
        assert!(matches!(Pattern::parse("/"), Pattern::Exact(s) if s == "/"));
    }

    #[test]
    fn pattern_parse_exact() {
        assert!(matches!(Pattern::parse("/api/users"), Pattern::Exact(s) if s == "/api/users"));
    }

    #[test]
    fn pattern_parse_trailing_slash_stripped() {
        // "/api/users/" should be normalized to "/api/users"
        assert!(matches!(Pattern::parse("/api/users/"), Pattern::Exact(s) if s == "/api/users"));
    }

    #[test]
    fn pattern_parse_parameterized() {
        let pat = Pattern::parse("/api/users/:id");
        match pat {
            Pattern::Parameterized { segments } => {
                assert_eq!(segments.len(), 3);
                assert!(matches!(&segments[2], Segment::Parameter(s) if s == "id"));
            }
            other => panic!("expected Parameterized, got {other:?}"),
        }
    }

    #[test]
    fn pattern_exact_match_hit_and_miss() {
        let pat = Pattern::parse("/api/users");
        assert!(pat.matches("/api/users").is_some());
        assert!(pat.matches("/api/users/").is_some());
        assert!(pat.matches("/api/messages").is_none());
    }

    #[test]
    fn pattern_root_does_not_match_other_paths() {
        let pat = Pattern::parse("/");
        assert!(pat.matches("/").is_some());
        assert!(pat.matches("/other").is_none());
    }

    #[test]
    fn pattern_param_extracts_value() {
        let pat = Pattern::parse("/api/users/:id");
        let params = pat.matches("/api/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn pattern_param_wrong_segment_count() {
        let pat = Pattern::parse("/api/users/:id");
        assert!(pat.matches("/api/users").is_none());
        assert!(pat.matches("/api/users/42/extra").is_none());
    }

    #[test]
    fn pattern_param_wrong_static_segment() {
        let pat = Pattern::parse("/api/users/:id");
        assert!(pat.matches("/api/messages/42").is_none());
    }

    // ── Router dispatch ───────────────────────────────────────────────────

    #[test]
    fn router_starts_empty() {
        let router = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[tokio::test]
    async fn empty_router_answers_structured_404() {
        let router = Router::new();
        let res = router.dispatch(make_ctx("GET", "/")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
        let body: serde_json::Value = serde_json::from_slice(res.body_ref()).unwrap();
        assert_eq!(body["error"], "Resource not found");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn get_route_matches() {
        let mut router = Router::new();
        router.get("/api/health", |_ctx| async {
            Response::new(StatusCode::Ok)
        });
        let res = router.dispatch(make_ctx("GET", "/api/health")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn method_mismatch_is_404() {
        let mut router = Router::new();
        router.get("/api/users", |_ctx| async { Response::new(StatusCode::Ok) });
        let res = router.dispatch(make_ctx("POST", "/api/users")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn first_matching_route_wins() {
        let mut router = Router::new();
        router.get("/path", |_ctx| async { Response::new(StatusCode::Ok) });
        router.get("/path", |_ctx| async {
            Response::new(StatusCode::Created)
        });

        let res = router.dispatch(make_ctx("GET", "/path")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn parameterized_route_receives_params() {
        let mut router = Router::new();
        router.get("/api/users/:id", |ctx: Context| async move {
            let id = ctx.params().get("id").unwrap_or("").to_owned();
            Response::new(StatusCode::Ok).body(id)
        });
        let res = router.dispatch(make_ctx("GET", "/api/users/42")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.body_ref(), b"42");
    }

    #[tokio::test]
    async fn delete_route_matches() {
        let mut router = Router::new();
        router.delete("/api/users/:id", |_ctx| async {
            Response::new(StatusCode::Ok)
        });
        let res = router.dispatch(make_ctx("DELETE", "/api/users/7")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }
}
