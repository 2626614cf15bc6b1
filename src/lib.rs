//! Bot host: a chat-bot session and a status web endpoint in one process.
//!
//! # Architecture Overview
//!
//! ```text
//!   main ──▶ config ──▶ Lifecycle::startup
//!                          │ 1. database  (ConnectivityProbe)
//!                          │ 2. bot       (TelegramBotFactory)
//!                          │ 3. bot start (TelegramBotClient::start)
//!                          │ 4. hand over
//!                          ▼
//!                      bind, HttpServer (GET /) ◀── SIGTERM/SIGINT ── signals
//!                          │
//!                          ▼
//!                      Lifecycle::shutdown ──▶ stop bot if connected ──▶ exit
//! ```

pub mod bot;
pub mod config;
pub mod database;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, RunOutcome, Shutdown};
