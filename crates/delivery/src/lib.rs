//! Humanized reply delivery for mostrador.
//!
//! Three pieces:
//! - [`splitter`] — decides whether a completed reply is delivered as one
//!   message or two human-paced chunks. Pure and deterministic.
//! - [`scheduler`] — emits the chunk(s) on the right cadence, keeping the
//!   single "awaiting" flag consistent and holding a cancellable handle to
//!   the staggered second chunk.
//! - [`speech`] — the narrow voice-output collaborator interface.

pub mod scheduler;
pub mod speech;
pub mod splitter;

pub use scheduler::{
    DeliveryEvent, DeliveryScheduler, DeliveryState, GATEWAY_ERROR_MESSAGE,
    STAGGER_DELAY,
};
pub use speech::{NullSpeech, SpeechSynthesizer, strip_emphasis};
pub use splitter::{SPLIT_THRESHOLD, SplitDecision, find_split_index, split_reply};
