//! HTTP server binding and graceful shutdown.
//!
//! The server owns nothing but a listen address (or an already bound
//! listener). It parses each hyper request into a [`Request`], asks the
//! [`Router`] to resolve it, and translates the two non-response outcomes:
//!
//! | Router outcome | Wire response |
//! |---|---|
//! | `Ok(Some(resp))` | `resp` |
//! | `Ok(None)` (no route) | configured no-match status, `404` by default |
//! | `Err(_)` (handler failed) | `500 Internal Server Error`, logged |
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C the accept loop stops, every in-flight connection
//! runs to completion, then [`Server::serve`] returns.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
    no_match_status: StatusCode,
}

impl Server {
    /// Configures the server to bind to `addr` when serving starts.
    ///
    /// ```rust
    /// use strada::Server;
    /// let server = Server::bind("0.0.0.0:8000").unwrap();
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr
            .parse()
            .map_err(|source| Error::Addr { addr: addr.to_owned(), source })?;
        Ok(Self::with_bind(Bind::Addr(addr)))
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut server = Self::with_bind(Bind::Addr(config.socket_addr()?));
        server.no_match_status = config.no_match_status()?;
        Ok(server)
    }

    /// Serves on a listener the caller already bound, e.g. to port `0`.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self::with_bind(Bind::Listener(listener))
    }

    /// Status sent when no route matches. Defaults to `404 Not Found`.
    pub fn no_match_status(mut self, status: StatusCode) -> Self {
        self.no_match_status = status;
        self
    }

    fn with_bind(bind: Bind) -> Self {
        Self { bind, no_match_status: StatusCode::NOT_FOUND }
    }

    /// Accepts connections and dispatches them through `router`.
    ///
    /// Returns after a full graceful shutdown (SIGTERM or Ctrl-C, then all
    /// in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve) but stops when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()> + Send,
    ) -> Result<(), Error> {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let local_addr = listener.local_addr()?;

        // Registration is over: from here the routes are shared read-only.
        let router = Arc::new(router);
        let no_match_status = self.no_match_status;

        info!(addr = %local_addr, routes = router.len(), "strada listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = signal;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so a pending signal stops
                // accepting even while connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(&router, req, no_match_status).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("strada stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response. Every failure is answered
/// here, so hyper never sees an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<Incoming>,
    no_match_status: StatusCode,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = match resolve(router, req).await {
        Ok(Some(resp)) => resp,
        Ok(None) => Response::status(no_match_status),
        Err(e) => {
            error!(%method, %path, "request failed: {e}");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    debug!(%method, %path, status = response.status_code().as_u16(), "request served");
    Ok(response.into_http())
}

async fn resolve(router: &Router, req: hyper::Request<Incoming>) -> Result<Option<Response>, Error> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await.map_err(Error::Body)?.to_bytes();

    let mut request = Request::new(parts.method, parts.uri.path()).with_body(body);
    if let Some(query) = parts.uri.query() {
        request = request.with_query(query);
    }
    for (name, value) in &parts.headers {
        // Non-UTF-8 header values are not representable in `Request`.
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    router.resolve(request).await
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on SIGTERM or SIGINT (Ctrl-C). On non-Unix targets only Ctrl-C.
///
/// If a handler cannot be installed that source is treated as never firing.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
