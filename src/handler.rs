//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router keeps handlers of *different* concrete types in one ordered
//! `Vec<Route>`, so each handler is hidden behind a trait object
//! (`dyn ErasedHandler`) with a uniform call signature.
//!
//! ```text
//! async fn hello(req: Request, params: Params) -> &'static str { … }
//!        ↓ router.add(Method::GET, "/", hello)
//! hello.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                      ← stored as BoxedHandler
//!        ↓
//! handler.call(req, params)   at request time     ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req, params).await.into_handler_result() })
//! ```
//!
//! A handler may return any [`HandlerOutput`]: a response-like value, or a
//! `Result` of one. An `Err` is not turned into a response here: it flows
//! out of [`Router::resolve`](crate::Router::resolve) as
//! [`Error::Handler`] so the serving layer picks the recovery policy.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;

use crate::error::{BoxError, Error};
use crate::request::{Params, Request};
use crate::response::{IntoResponse, Json, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to a handler's outcome.
pub(crate) type BoxFuture =
    Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of
/// [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, params: Params) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Handler output ────────────────────────────────────────────────────────────

/// What a handler's future may resolve to.
///
/// Implemented for the built-in [`IntoResponse`] types (infallible handlers)
/// and for `Result<R, E>` where `R: IntoResponse` and `E` converts into a
/// boxed error. A custom `IntoResponse` type is returned either through
/// `.into_response()` or wrapped in `Ok`.
pub trait HandlerOutput: Send + 'static {
    #[doc(hidden)]
    fn into_handler_result(self) -> Result<Response, Error>;
}

macro_rules! infallible_output {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HandlerOutput for $ty {
                fn into_handler_result(self) -> Result<Response, Error> {
                    Ok(self.into_response())
                }
            }
        )*
    };
}

infallible_output!(Response, &'static str, String, StatusCode);

impl<T: Serialize + Send + 'static> HandlerOutput for Json<T> {
    fn into_handler_result(self) -> Result<Response, Error> {
        Ok(self.into_response())
    }
}

impl<R, E> HandlerOutput for Result<R, E>
where
    R: IntoResponse + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn into_handler_result(self) -> Result<Response, Error> {
        self.map(IntoResponse::into_response)
            .map_err(|e| Error::Handler(e.into()))
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function or closure shaped like
///
/// ```text
/// async fn name(req: Request, params: Params) -> impl HandlerOutput
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: HandlerOutput,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: HandlerOutput,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request, Params) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: HandlerOutput,
{
    fn call(&self, req: Request, params: Params) -> BoxFuture {
        let fut = (self.0)(req, params);
        Box::pin(async move { fut.await.into_handler_result() })
    }
}
