//! # oxide-regex-router
//!
//! A small HTTP router that compiles path templates into anchored regular
//! expressions and matches them in registration order.
//!
//! This crate provides:
//! - Path templates with named, colon-style, pattern-restricted and wildcard captures
//! - Per-method route lists where the first registered match wins
//! - Pooled parameter buffers, so matched requests reuse capture storage
//! - A configurable not-found fallback and error sink
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_regex_router::{Request, Response, Router};
//!
//! async fn blog(req: Request) -> Response {
//!     let year = req.param("year").unwrap_or_default();
//!     let month = req.param("month").unwrap_or_default();
//!     Response::text(format!("Render: {year}/{month}"))
//! }
//!
//! let router = Router::new()
//!     .get(r"/blog/{year:\d{4}}/{month:(?:\d{2})}", blog)?
//!     .get("/files/*", files)?;
//!
//! let response = router.handle(Request::get("/blog/2018/01")).await;
//! ```
//!
//! ## Template Syntax
//!
//! - `{name}` and `:name` capture one path segment (`[^/]+`)
//! - `{name:pattern}` captures text matching `pattern`, which must not contain
//!   capturing groups of its own (use `(?:...)`)
//! - `*` captures one or more characters of any kind, `/` included; wildcard values
//!   are read with [`Params::wildcards`] in left-to-right order
//! - anything else is matched literally
//!
//! Templates are anchored, so `/users/:id` matches `/users/7` but not `/users/7/`.
//!
//! ```
//! use std::sync::Arc;
//! use oxide_regex_router::PathPattern;
//! use oxide_regex_router::params::ParamsPool;
//!
//! let pool = Arc::new(ParamsPool::new(1));
//! let pattern = PathPattern::new("/download/*.*").unwrap();
//! let params = pattern.match_path("/download/path/to/file.xml", &pool).unwrap().unwrap();
//! assert_eq!(params.wildcards(), ["path/to/file", "xml"]);
//! ```
//!
//! ## Fallbacks
//!
//! ```ignore
//! let legacy = Router::new().get("/old/:id", legacy_handler)?;
//! let router = Router::new()
//!     .get("/new/:id", handler)?
//!     .fallback(legacy);
//! ```

mod config;
mod error;
mod error_log;
pub mod params;
pub mod pattern;
mod request;
mod response;
mod router;
mod table;

pub use config::{DuplicateCaptures, RouterConfig};
pub use error::{Result, RouterError};
pub use error_log::{ErrorLog, TracingLog};
pub use params::Params;
pub use pattern::{Capture, PathPattern};
pub use request::{Method, Request};
pub use response::Response;
pub use router::{handler_fn, Handler, Route, RouteGroup, Router};
pub use table::{MatchResult, RouteTable};
