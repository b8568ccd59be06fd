//! Friendship Memory Quiz · Backend
//!
//! - Stratified question sampling, scoring, normalization and result classification
//! - Axum HTTP + WebSocket API for the browser front-end
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   QUIZ_CONFIG_PATH : path to TOML config (bank path, count choices, sampling ratios)
//!   QUIZ_BANK_PATH   : overrides the question bank JSON path from the config
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod config;
mod bank;
mod sampler;
mod ledger;
mod normalizer;
mod classifier;
mod session;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::config::load_quiz_config_from_env;
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = load_quiz_config_from_env();

  // No bank, no quiz: refuse to start rather than serve an empty game.
  let state = match AppState::new(config) {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "memory_quiz", error = %e, "Cannot start: question bank unavailable");
      return Err(e.into());
    }
  };

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "memory_quiz", %addr, questions = state.bank.len(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
