//! Application assembly: shared state, route table, and the middleware
//! pipeline, wired into a single request-handling entry point.

use std::sync::Arc;

use crate::config::Config;
use crate::context::Context;
use crate::handlers;
use crate::http::{Request, Response};
use crate::middleware::{MiddlewareHandler, Next, RequestLog, from_middleware};
use crate::router::Router;
use crate::security::{SecurityHeaders, SharedSecret};
use crate::store::Store;

/// State shared by every request: configuration, the in-memory store, and
/// the access-control gate.
///
/// Owned behind an [`Arc`] and injected into handlers through the request
/// [`Context`]; there are no ambient globals, so tests build one per case
/// and drop it when the test ends.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub secret: SharedSecret,
}

impl AppState {
    /// Creates fresh state from resolved configuration.
    pub fn new(config: Config) -> Self {
        let secret = SharedSecret::new(config.api_key.clone());
        Self {
            config,
            store: Store::new(),
            secret,
        }
    }
}

/// The assembled service: route table plus middleware pipeline over shared
/// state.
///
/// # Examples
///
/// ```rust,no_run
/// use pinboard::app::App;
/// use pinboard::config::Config;
///
/// let app = App::new(Config::from_env());
/// ```
pub struct App {
    state: Arc<AppState>,
    pipeline: Vec<MiddlewareHandler>,
}

impl App {
    /// Builds the service around fresh state.
    pub fn new(config: Config) -> Self {
        Self::with_state(Arc::new(AppState::new(config)))
    }

    /// Builds the service around existing state (used by tests that need to
    /// inspect the store after handling requests).
    pub fn with_state(state: Arc<AppState>) -> Self {
        let router = Arc::new(routes());
        let terminal: MiddlewareHandler = Arc::new(move |ctx: Context, _next: Next| {
            let router = Arc::clone(&router);
            Box::pin(async move { router.dispatch(ctx).await })
        });

        // Order matters: the visit counter must see every request, and the
        // hardening headers must decorate every response, including 401s
        // and 404s produced further down.
        let pipeline = vec![
            from_middleware(Arc::new(RequestLog)),
            from_middleware(Arc::new(SecurityHeaders)),
            terminal,
        ];

        Self { state, pipeline }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Runs one request through the full pipeline and returns the response.
    pub async fn handle(&self, request: Request) -> Response {
        let ctx = Context::new(request, Arc::clone(&self.state));
        Next::new(self.pipeline.clone()).run(ctx).await
    }
}

/// The complete route table.
fn routes() -> Router {
    let mut router = Router::new();

    router.get("/", handlers::meta::home);
    router.get("/api/health", handlers::meta::health);
    router.get("/api/stats", handlers::meta::stats);

    router.get("/api/users", handlers::users::list);
    router.post("/api/users", handlers::users::create);
    router.get("/api/users/:id", handlers::users::detail);
    router.delete("/api/users/:id", handlers::users::delete);

    router.get("/api/messages", handlers::messages::list);
    router.post("/api/messages", handlers::messages::create);

    router.get("/api/search", handlers::search::users);

    router
}
