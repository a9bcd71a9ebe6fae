//! Ordered, exact-match request router.
//!
//! Routes are kept in registration order and scanned linearly. The first
//! route whose method and path both equal the request's wins, so an earlier
//! registration shadows any later duplicate. There are no pattern segments,
//! wildcards or middleware: you register a literal path, you get a handler.
//!
//! Matching policy:
//! - methods compare with `http::Method` equality, which is case-sensitive
//!   (`GET` and `get` are different methods);
//! - paths compare byte for byte, so `/user` and `/user/` are distinct and
//!   any query string must already be stripped by the caller.

use std::fmt;

use http::Method;
use tracing::debug;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::{Params, Request};
use crate::response::Response;

/// One registered endpoint: a (method, path, handler) triple.
pub struct Route {
    method: Method,
    path: String,
    handler: BoxedHandler,
}

impl Route {
    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path == path
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// The application router.
///
/// Build it once at startup, then hand it to [`Server::serve`], which shares
/// it read-only across connections. Registration takes `&mut self` (or
/// `self` for the chaining forms), so the borrow checker rules out
/// registering while requests are being matched. Registering after startup
/// would need the router behind an `RwLock`; nothing here provides that.
///
/// [`Server::serve`]: crate::Server::serve
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends a route. Duplicates are accepted; the earliest one wins.
    pub fn add(&mut self, method: Method, path: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.routes.push(Route {
            method,
            path: path.into(),
            handler: handler.into_boxed_handler(),
        });
        self
    }

    /// Chaining form of [`add`](Router::add).
    ///
    /// ```rust
    /// use strada::{Method, Params, Request, Router};
    ///
    /// async fn hello(_req: Request, _params: Params) -> &'static str { "Hello Bun!" }
    ///
    /// let app = Router::new().on(Method::GET, "/", hello);
    /// assert_eq!(app.len(), 1);
    /// ```
    pub fn on(mut self, method: Method, path: impl Into<String>, handler: impl Handler) -> Self {
        self.add(method, path, handler);
        self
    }

    pub fn get(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// First route registered for `method` + `path`, if any.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(method, path))
    }

    /// Resolves `req` to its handler's response.
    ///
    /// - `Ok(Some(response))`: a route matched and its handler produced a response.
    /// - `Ok(None)`: no route matched. This is a normal outcome; the caller
    ///   decides what to send instead.
    /// - `Err(Error::Handler(_))`: the matched handler failed. The failure is
    ///   passed through as-is.
    pub async fn resolve(&self, req: Request) -> Result<Option<Response>, Error> {
        let Some(route) = self.lookup(req.method(), req.path()) else {
            debug!(method = %req.method(), path = req.path(), "no route matched");
            return Ok(None);
        };
        route.handler.call(req, Params::empty()).await.map(Some)
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.routes).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{IntoResponse, Json};
    use http::StatusCode;
    use serde_json::json;

    async fn hello(_req: Request, _params: Params) -> &'static str {
        "Hello Bun!"
    }

    async fn user(_req: Request, _params: Params) -> Json<serde_json::Value> {
        Json(json!({"firstname": "Molly", "lastname": "Feral"}))
    }

    fn app() -> Router {
        Router::new().get("/", hello).get("/user", user)
    }

    fn body_text(res: &Response) -> &str {
        std::str::from_utf8(res.body()).unwrap()
    }

    #[tokio::test]
    async fn routes_observed_endpoints() {
        let app = app();

        let res = app.resolve(Request::new(Method::GET, "/")).await.unwrap().unwrap();
        assert_eq!(body_text(&res), "Hello Bun!");

        let res = app.resolve(Request::new(Method::GET, "/user")).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(value, json!({"firstname": "Molly", "lastname": "Feral"}));
    }

    #[tokio::test]
    async fn unknown_method_or_path_is_no_match() {
        let app = app();
        assert!(app.resolve(Request::new(Method::POST, "/")).await.unwrap().is_none());
        assert!(app.resolve(Request::new(Method::GET, "/missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn earliest_registration_wins() {
        let app = Router::new()
            .get("/x", |_req: Request, _params: Params| async { "one" })
            .get("/x", |_req: Request, _params: Params| async { "two" });

        let res = app.resolve(Request::new(Method::GET, "/x")).await.unwrap().unwrap();
        assert_eq!(body_text(&res), "one");
        assert_eq!(app.len(), 2);
    }

    #[tokio::test]
    async fn resolve_is_repeatable() {
        let app = app();
        let first = app.resolve(Request::new(Method::GET, "/user")).await.unwrap().unwrap();
        let second = app.resolve(Request::new(Method::GET, "/user")).await.unwrap().unwrap();
        assert_eq!(first.body(), second.body());
        assert_eq!(first.status_code(), second.status_code());

        assert!(app.resolve(Request::new(Method::GET, "/nope")).await.unwrap().is_none());
        assert!(app.resolve(Request::new(Method::GET, "/nope")).await.unwrap().is_none());
    }

    #[test]
    fn matching_is_exact() {
        let app = app();
        let lower = Method::from_bytes(b"get").unwrap();
        assert!(app.lookup(&lower, "/").is_none());
        assert!(app.lookup(&Method::GET, "/user/").is_none());
        assert!(app.lookup(&Method::GET, "/USER").is_none());
        assert!(app.lookup(&Method::GET, "/user?x=1").is_none());
        assert_eq!(app.lookup(&Method::GET, "/user").unwrap().path(), "/user");
    }

    #[tokio::test]
    async fn handlers_receive_empty_params_and_the_request() {
        let app = Router::new().post("/cards", |req: Request, params: Params| async move {
            assert!(params.is_empty());
            Response::builder()
                .status(StatusCode::CREATED)
                .text(String::from_utf8_lossy(req.body()).into_owned())
        });

        let req = Request::new(Method::POST, "/cards").with_body("front");
        let res = app.resolve(req).await.unwrap().unwrap();
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(body_text(&res), "front");
    }

    #[tokio::test]
    async fn handler_failure_propagates() {
        let app = Router::new().get("/boom", |_req: Request, _params: Params| async {
            Err::<Response, _>("woops!")
        });

        let err = app.resolve(Request::new(Method::GET, "/boom")).await.unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
    }

    #[tokio::test]
    async fn add_by_reference_and_extension_methods() {
        let mut app = Router::new();
        let purge = Method::from_bytes(b"PURGE").unwrap();
        app.add(purge.clone(), "/cache", |_req: Request, _params: Params| async {
            StatusCode::NO_CONTENT.into_response()
        })
        .add(Method::GET, "/", hello);

        let res = app.resolve(Request::new(purge, "/cache")).await.unwrap().unwrap();
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        let registered: Vec<_> = app.routes().map(|r| (r.method().as_str(), r.path())).collect();
        assert_eq!(registered, [("PURGE", "/cache"), ("GET", "/")]);
    }

    #[tokio::test]
    async fn async_handlers_may_suspend() {
        let app = Router::new().get("/slow", |_req: Request, _params: Params| async {
            tokio::task::yield_now().await;
            "done"
        });
        let res = app.resolve(Request::new(Method::GET, "/slow")).await.unwrap().unwrap();
        assert_eq!(body_text(&res), "done");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn shared_router_resolves_concurrently() {
        let app = std::sync::Arc::new(app());

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32 {
            let app = std::sync::Arc::clone(&app);
            tasks.spawn(async move {
                let (method, path) = match i % 3 {
                    0 => (Method::GET, "/"),
                    1 => (Method::GET, "/user"),
                    _ => (Method::POST, "/"),
                };
                let outcome = app.resolve(Request::new(method, path)).await.unwrap();
                (i % 3, outcome)
            });
        }

        let mut seen = 0;
        while let Some(joined) = tasks.join_next().await {
            let (kind, outcome) = joined.unwrap();
            match kind {
                0 => assert_eq!(body_text(&outcome.unwrap()), "Hello Bun!"),
                1 => {
                    let res = outcome.unwrap();
                    let value: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
                    assert_eq!(value, json!({"firstname": "Molly", "lastname": "Feral"}));
                }
                _ => assert!(outcome.is_none()),
            }
            seen += 1;
        }
        assert_eq!(seen, 32);
    }
}
