//! Middleware pipeline: composable before/after request handler logic.
//!
//! The pipeline is an ordered stack of type-erased handlers. Each layer
//! receives the per-request [`Context`] and a [`Next`] cursor; it may pass
//! through, short-circuit with its own [`Response`], or decorate the
//! response coming back from downstream. The final entry in the stack is
//! the router dispatch itself.
//!
//! ## Core types
//!
//! - [`Middleware`]: trait implemented by all middleware.
//! - [`Next`]: cursor into the remaining chain; call [`Next::run`] to
//!   advance to the next layer.
//! - [`MiddlewareHandler`]: type-erased, cheaply-cloneable middleware function.
//! - [`from_middleware`]: converts a [`Middleware`] trait object into a
//!   [`MiddlewareHandler`].
//! - [`RequestLog`]: built-in visit counting and request/response logging.

use std::{future::Future, pin::Pin, sync::Arc};
use tokio::time::Instant;

use crate::{Response, context::Context};

/// A cursor into the remaining middleware chain for a single request.
///
/// `Next` is consumed on each call to [`run`](Self::run), so a middleware
/// cannot invoke the rest of the chain more than once.
pub struct Next {
    middlewares: Vec<MiddlewareHandler>,
    // Tracks which middleware to invoke on the next `run` call.
    index: usize,
}

/// A type-erased, reference-counted middleware function.
///
/// Every entry in the middleware stack is stored as a `MiddlewareHandler`.
/// The [`Arc`] wrapper makes handlers cheap to clone so that [`Next`] can
/// advance through the chain without copying closures.
pub type MiddlewareHandler = Arc<
    dyn Fn(Context, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync + 'static,
>;

/// Converts a [`Middleware`] implementation into a [`MiddlewareHandler`].
pub fn from_middleware<M>(middleware: Arc<M>) -> MiddlewareHandler
where
    M: Middleware + 'static,
{
    Arc::new(move |ctx: Context, next: Next| middleware.handle(ctx, next))
}

impl Next {
    /// Creates a new `Next` positioned at the start of the given middleware stack.
    pub fn new(middlewares: Vec<MiddlewareHandler>) -> Self {
        Self {
            middlewares,
            index: 0,
        }
    }

    /// Invokes the next middleware in the chain and returns its response.
    ///
    /// If the chain is exhausted without any layer producing a response, a
    /// structured `500` is returned as a safe fallback; an assembled
    /// pipeline always terminates in the router, so reaching the fallback
    /// indicates a wiring bug.
    pub async fn run(mut self, ctx: Context) -> Response {
        if self.index < self.middlewares.len() {
            let handler = self.middlewares[self.index].clone();
            self.index += 1;
            handler(ctx, self).await
        } else {
            Response::json(
                crate::StatusCode::InternalServerError,
                &serde_json::json!({"error": "Internal server error", "status": 500}),
            )
        }
    }
}

/// The core trait for all middleware.
///
/// Implementors receive a [`Context`] and a [`Next`] cursor. They may:
///
/// - **Pass through**: call `next.run(ctx).await` without modification.
/// - **Short-circuit**: return a [`Response`] directly without calling `next`.
/// - **Decorate**: call `next.run(ctx).await`, inspect the response, and
///   return a modified copy.
///
/// Implementations must be `Send + Sync` (shared across Tokio tasks) and
/// must not hold `&mut` references to shared state across an `.await` point.
pub trait Middleware: Send + Sync {
    /// Handle the request and optionally delegate to the next middleware.
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>>;
}

/// Built-in middleware that counts the visit and logs the request.
///
/// Placed first in the pipeline so that every inbound request (matched,
/// rejected, or unknown) increments the visit counter exactly once. After
/// the downstream layers complete, one `tracing::info!` record is emitted:
///
/// ```text
/// METHOD /path - STATUS (duration)
/// ```
pub struct RequestLog;

impl Middleware for RequestLog {
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin(async move {
            let start = Instant::now();
            let method = ctx.request().method().as_str().to_string();
            let path = ctx.request().path().to_string();

            ctx.store().record_visit();

            let response = next.run(ctx).await;

            let duration = start.elapsed();
            let status = response.status().as_u16();

            tracing::info!("{} {} - {} ({:?})", method, path, status, duration);

            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::Config;
    use crate::http::{Request, StatusCode};
    use std::sync::Arc;

    fn test_ctx(state: Arc<AppState>) -> Context {
        let raw = b"GET /anything HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let (request, _) = Request::parse(raw).unwrap();
        Context::new(request, state)
    }

    #[tokio::test]
    async fn exhausted_chain_falls_back_to_500() {
        let state = Arc::new(AppState::new(Config::default()));
        let next = Next::new(vec![]);
        let response = next.run(test_ctx(state)).await;
        assert_eq!(response.status(), StatusCode::InternalServerError);
    }

    #[tokio::test]
    async fn request_log_counts_exactly_one_visit() {
        let state = Arc::new(AppState::new(Config::default()));
        let terminal: MiddlewareHandler = Arc::new(|_ctx, _next| {
            Box::pin(async { Response::new(StatusCode::Ok) })
        });
        let chain = vec![from_middleware(Arc::new(RequestLog)), terminal];

        let response = Next::new(chain).run(test_ctx(Arc::clone(&state))).await;
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(state.store.visits(), 1);
    }

    #[tokio::test]
    async fn visit_counted_even_when_downstream_fails() {
        let state = Arc::new(AppState::new(Config::default()));
        let chain = vec![from_middleware(Arc::new(RequestLog))];

        // No terminal handler; downstream produces the 500 fallback.
        let response = Next::new(chain).run(test_ctx(Arc::clone(&state))).await;
        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(state.store.visits(), 1);
    }
}
