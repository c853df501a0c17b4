//! # Mostrador Core
//!
//! Domain types, traits, and error definitions for the mostrador
//! customer-support chat assistant. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (the language-model gateway, the calendar
//! relay) is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod gateway;
pub mod message;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GatewayError, RelayError, Result, SessionError};
pub use gateway::{ChatReply, ChatRequest, Gateway, ModelId, TokenCounts, ToolDefinition};
pub use message::{Message, Role, Transcript, TranscriptId};
