//! The chat session engine for mostrador.
//!
//! Glues the bounded contexts together for one visitor conversation:
//! configuration in, instruction assembly, the gateway call, reply
//! splitting and staggered delivery, usage accounting, and voice output.
//!
//! - [`engine`] — the [`ChatSession`] exchange loop.
//! - [`calendar`] — the calendar function declaration for the model.

pub mod calendar;
pub mod engine;

pub use calendar::{CALENDAR_TOOL_NAME, calendar_tool};
pub use engine::{ChatSession, DeliveredChunk, GREETING_PROMPT};
