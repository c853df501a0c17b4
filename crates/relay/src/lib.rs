//! Google Calendar OAuth relay for mostrador.
//!
//! A small separate process that keeps the OAuth client secret off the
//! widget: it redirects the user to the Google consent screen, receives the
//! callback, holds the acquired tokens in an injectable in-process store,
//! and proxies free-busy availability queries for the primary calendar.
//!
//! - [`server`] — the axum router and its handlers.
//! - [`google`] — the upstream OAuth / calendar client behind a trait.
//! - [`token`] — the injectable token store.
//! - [`client`] — reqwest client for consuming the relay from a session.

pub mod client;
pub mod google;
pub mod server;
pub mod token;

pub use client::RelayClient;
pub use google::{BusyInterval, CalendarProvider, GoogleCalendar};
pub use server::{RelayState, build_router, default_port, run};
pub use token::{OAuthTokens, TokenStore};
