//! # oxide-api
//!
//! Request routing and filter dispatch for versioned APIs.
//!
//! This crate provides:
//! - Path patterns with named (`:id`) and tail (`::path`) parameters
//! - Method- and version-aware route resolution
//! - Nested groups and version scopes, flattened at configuration time
//! - Ordered filters composed around the resolved handler
//! - Route ids for reverse path lookup
//!
//! The router is generic over the request and response types; handlers and
//! filters are async functions.
//!
//! ## Quick Start
//!
//! ```
//! use oxide_api::{split_parts, Method, Router};
//!
//! let router = Router::<String, String>::configure(|api| {
//!     api.route_id("hello", "/", |_name| async { "Hello, World!".to_string() });
//!     api.route_id("user", "/users/:id", |name| async move { format!("User: {name}") });
//! })
//! .unwrap();
//!
//! let parts = split_parts("/users/123").unwrap();
//! let id = router.match_route(Method::Get, "current", &parts).unwrap();
//! assert_eq!(id, "user");
//!
//! let params = router.extract_matches(id, &parts).unwrap();
//! assert_eq!(params.get("id"), Some("123"));
//! ```
//!
//! ## Groups, Versions and Filters
//!
//! ```
//! use oxide_api::{split_parts, Method, Router};
//!
//! let router = Router::<String, String>::configure(|api| {
//!     api.filter("/::path", |req, next| next.run(req));
//!     api.group("/api", |api| {
//!         api.route_id("users", "/users", |req| async move { req });
//!         api.version("a.1.0").route_id("a.1.0:users", "/users", |req| async move { req });
//!     });
//! })
//! .unwrap();
//!
//! let parts = split_parts("/api/users").unwrap();
//! assert_eq!(router.match_route(Method::Get, "a.1.0", &parts), Some("a.1.0:users"));
//! assert_eq!(router.match_route(Method::Get, "a.2.0", &parts), Some("users"));
//!
//! let chain = router.create_chain(Method::Get, "a.2.0", &parts).unwrap();
//! assert_eq!(chain.filter_count(), 1);
//! ```
//!
//! ## Reverse Routing
//!
//! ```
//! use std::collections::HashMap;
//! use oxide_api::Router;
//!
//! let router = Router::<String, String>::configure(|api| {
//!     api.route_id("file", "/files/::path", |req| async move { req });
//! })
//! .unwrap();
//!
//! let params: HashMap<String, String> =
//!     [("path".to_string(), "/docs/readme.md".to_string())].into_iter().collect();
//! assert_eq!(router.link_to("file", &params).unwrap(), Some("/files/docs/readme.md".to_string()));
//! ```

mod chain;
mod error;
pub mod filters;
mod matcher;
mod path;
mod request;
mod router;
mod table;
mod version;

pub use chain::{filter, handler, Chain, FilterFn, Handler, Next};
pub use error::{Result, RouterError};
pub use futures::future::BoxFuture;
pub use path::{split_parts, split_parts_lenient, Pattern, Segment};
pub use request::{Method, Params, Request, Routable};
pub use router::{Filter, Route, Router, Scope};
pub use table::{Kind, Registration, Table};
pub use version::{applies as version_applies, resolve as resolve_version};
