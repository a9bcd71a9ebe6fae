//! The two-route hello server.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example hello
//!   STRADA_ADDR=127.0.0.1:3000 cargo run --example hello
//!
//! Try:
//!   curl http://localhost:8000/
//!   curl http://localhost:8000/user
//!   curl -i http://localhost:8000/missing     # 404, no route
//!
//! A missed route answers with the configured no-match status, `404` unless
//! a config file says otherwise. To answer misses with a `500` instead, as a
//! server that simply fails on unknown routes would, pass a file containing
//! `no_match_status = 500`:
//!   cargo run --example hello -- hello.toml

use serde::Serialize;
use strada::{Config, Json, Params, Request, Router, Server};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct UserInfo {
    firstname: &'static str,
    lastname: &'static str,
}

#[tokio::main]
async fn main() -> Result<(), strada::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::from_env(),
    };

    let app = Router::new()
        .get("/",     hello)
        .get("/user", user);

    Server::from_config(&config)?.serve(app).await
}

// GET /
async fn hello(_req: Request, _params: Params) -> &'static str {
    "Hello Bun!"
}

// GET /user
async fn user(_req: Request, _params: Params) -> Json<UserInfo> {
    Json(UserInfo { firstname: "Molly", lastname: "Feral" })
}
