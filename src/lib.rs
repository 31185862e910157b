//! IRIS: a conversational assistant that routes each question to the right
//! backend and keeps a log of what it answered.
//!
//! Questions that look like math or science (by keyword) go to Wolfram|Alpha;
//! everything else goes to an OpenAI chat model together with the session's
//! earlier exchanges. Each answered exchange is then written, best-effort, as
//! a row in a Notion database.
//!
//! # Modules
//!
//! - [`config`] — TOML/env configuration and the credential gate ([`config::Secrets`])
//! - [`router`] — keyword classification into calculation or conversation
//! - [`backend`] — OpenAI and Wolfram|Alpha clients behind async traits
//! - [`notes`] — the Notion recorder
//! - [`conversation`] — per-session append-only memory and the session registry
//! - [`oracle`] — the `process` pipeline tying the above together
//! - [`server`] — the axum HTTP API

pub mod backend;
pub mod config;
pub mod conversation;
pub mod notes;
pub mod oracle;
pub mod router;
pub mod server;
