//! # pinboard
//!
//! A demonstration HTTP service: CRUD-style endpoints over two in-memory
//! collections (users and messages), plus health, stats, and search,
//! served as JSON with HTML pages for browser clients.
//!
//! All state lives in memory for the lifetime of the process; a restart
//! starts from zero. The message routes are gated behind a single shared
//! secret carried in the `X-API-Key` header.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pinboard::app::App;
//! use pinboard::config::Config;
//! use pinboard::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let app = Arc::new(App::new(config.clone()));
//!     let server = Server::bind(config.addr()).await?;
//!     server.run(move |req| {
//!         let app = Arc::clone(&app);
//!         async move { app.handle(req).await }
//!     }).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod handlers;
pub mod http;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod security;
pub mod server;
pub mod store;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use server::{Server, ServerError};
