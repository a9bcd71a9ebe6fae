//! # strada
//!
//! An ordered, exact-match HTTP request router, plus the small hyper server
//! that runs it.
//!
//! - Routes are `(method, path, handler)` triples kept in registration order.
//! - Lookup is a linear scan: the first route whose method and path both
//!   equal the request's wins. No patterns, no wildcards, no middleware.
//! - "No route matched" is an ordinary return value (`Ok(None)`), never an
//!   error. The server decides what to send for it (`404` by default).
//! - A handler's own failure is passed through to the caller untouched.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strada::{Json, Params, Request, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strada::Error> {
//!     let app = Router::new()
//!         .get("/",     hello)
//!         .get("/user", user);
//!
//!     Server::bind("0.0.0.0:8000")?.serve(app).await
//! }
//!
//! async fn hello(_req: Request, _params: Params) -> &'static str {
//!     "Hello Bun!"
//! }
//!
//! async fn user(_req: Request, _params: Params) -> Json<serde_json::Value> {
//!     Json(serde_json::json!({ "firstname": "Molly", "lastname": "Feral" }))
//! }
//! ```
//!
//! The router can also be used without the server, e.g. embedded in another
//! HTTP stack:
//!
//! ```rust
//! # use strada::{Method, Params, Request, Router};
//! # async fn hello(_req: Request, _params: Params) -> &'static str { "Hello Bun!" }
//! # async fn run() -> Result<(), strada::Error> {
//! let app = Router::new().get("/", hello);
//! match app.resolve(Request::new(Method::GET, "/")).await? {
//!     Some(response) => assert_eq!(response.body(), b"Hello Bun!"),
//!     None => unreachable!("`/` is registered"),
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub use config::{ADDR_ENV, Config};
pub use error::{BoxError, Error, Result};
pub use handler::{Handler, HandlerOutput};
pub use http::{Method, StatusCode};
pub use request::{Params, Request};
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::{Route, Router};
pub use server::Server;
