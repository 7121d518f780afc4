//! Security concerns: response hardening headers and the shared-secret gate.
//!
//! Two pieces live here:
//!
//! - [`SecurityHeaders`]: middleware decorating every outgoing response
//!   with fixed hardening and cross-origin headers, independent of route
//!   and outcome.
//! - [`SharedSecret`]: the access filter for the message routes: one
//!   configured token compared byte-for-byte against the caller's
//!   `X-API-Key` header. Allow or deny only; no sessions, no expiry, no
//!   per-key identity.

use std::pin::Pin;

use crate::http::Request;
use crate::{
    Response,
    context::Context,
    middleware::{Middleware, Next},
};

/// Request header carrying the caller's credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Middleware that stamps fixed hardening and CORS headers on every response.
///
/// The header set matches what the service promises for all routes and all
/// outcomes: content-sniffing disabled, framing denied, and permissive
/// cross-origin allowances for the methods and headers the API uses.
pub struct SecurityHeaders;

impl SecurityHeaders {
    const HEADERS: [(&'static str, &'static str); 6] = [
        ("X-Content-Type-Options", "nosniff"),
        ("X-Frame-Options", "DENY"),
        ("X-XSS-Protection", "1; mode=block"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type, X-API-Key"),
    ];
}

impl Middleware for SecurityHeaders {
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin(async move {
            let mut response = next.run(ctx).await;
            for (name, value) in Self::HEADERS {
                response.add_header(name, value);
            }
            response
        })
    }
}

/// The single static token gating protected routes.
///
/// # Examples
///
/// ```
/// use pinboard::security::SharedSecret;
/// use pinboard::http::Request;
///
/// let secret = SharedSecret::new("demo-api-key");
/// let raw = b"GET /api/messages HTTP/1.1\r\nX-API-Key: demo-api-key\r\n\r\n";
/// let (request, _) = Request::parse(raw).unwrap();
/// assert!(secret.authorizes(&request));
/// ```
#[derive(Debug, Clone)]
pub struct SharedSecret {
    token: String,
}

impl SharedSecret {
    /// Creates a gate around the configured token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns `true` when the request carries the exact configured token.
    ///
    /// A missing header and a mismatched token are the same outcome: deny.
    pub fn authorizes(&self, request: &Request) -> bool {
        request
            .headers()
            .get(API_KEY_HEADER)
            .is_some_and(|presented| presented == self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::Config;
    use crate::http::StatusCode;
    use crate::middleware::{MiddlewareHandler, from_middleware};
    use std::sync::Arc;

    fn parse(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap().0
    }

    #[test]
    fn matching_key_is_authorized() {
        let secret = SharedSecret::new("demo-api-key");
        let req = parse(b"GET /api/messages HTTP/1.1\r\nX-API-Key: demo-api-key\r\n\r\n");
        assert!(secret.authorizes(&req));
    }

    #[test]
    fn header_name_is_case_insensitive() {
        let secret = SharedSecret::new("demo-api-key");
        let req = parse(b"GET /api/messages HTTP/1.1\r\nx-api-key: demo-api-key\r\n\r\n");
        assert!(secret.authorizes(&req));
    }

    #[test]
    fn missing_key_is_denied() {
        let secret = SharedSecret::new("demo-api-key");
        let req = parse(b"GET /api/messages HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(!secret.authorizes(&req));
    }

    #[test]
    fn wrong_key_is_denied() {
        let secret = SharedSecret::new("demo-api-key");
        let req = parse(b"GET /api/messages HTTP/1.1\r\nX-API-Key: nope\r\n\r\n");
        assert!(!secret.authorizes(&req));
    }

    #[test]
    fn token_comparison_is_case_sensitive() {
        let secret = SharedSecret::new("demo-api-key");
        let req = parse(b"GET /api/messages HTTP/1.1\r\nX-API-Key: DEMO-API-KEY\r\n\r\n");
        assert!(!secret.authorizes(&req));
    }

    #[tokio::test]
    async fn every_response_carries_hardening_headers() {
        let state = Arc::new(AppState::new(Config::default()));
        let terminal: MiddlewareHandler = Arc::new(|_ctx, _next| {
            Box::pin(async { Response::new(StatusCode::NotFound) })
        });
        let chain = vec![from_middleware(Arc::new(SecurityHeaders)), terminal];

        let request = parse(b"GET /nope HTTP/1.1\r\nHost: x\r\n\r\n");
        let ctx = Context::new(request, state);
        let response = crate::middleware::Next::new(chain).run(ctx).await;

        let headers = response.headers();
        assert_eq!(headers.get("X-Content-Type-Options"), Some("nosniff"));
        assert_eq!(headers.get("X-Frame-Options"), Some("DENY"));
        assert_eq!(headers.get("X-XSS-Protection"), Some("1; mode=block"));
        assert_eq!(headers.get("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            headers.get("Access-Control-Allow-Methods"),
            Some("GET, POST, PUT, DELETE, OPTIONS")
        );
        assert_eq!(
            headers.get("Access-Control-Allow-Headers"),
            Some("Content-Type, X-API-Key")
        );
    }
}
