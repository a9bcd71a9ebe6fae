//! Unified error type.

/// Boxed error produced by a failing handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by strada's fallible operations.
///
/// A request that matches no route is **not** an error: [`Router::resolve`]
/// reports it as `Ok(None)`. This type covers infrastructure failures and
/// failures raised by handlers themselves, which the router passes through
/// untouched.
///
/// [`Router::resolve`]: crate::Router::resolve
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("no-match status {0} must be a 4xx or 5xx code")]
    InvalidStatus(u16),

    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    #[error("reading request body: {0}")]
    Body(#[source] hyper::Error),
}
