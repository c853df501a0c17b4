//! Gemini gateway implementation for mostrador.
//!
//! Implements the `mostrador_core::Gateway` trait against the hosted
//! generative-language API: chat completion with the assembled business
//! instruction, optional calendar function declarations, and the
//! knowledge-field enhancement operation.

pub mod gemini;

pub use gemini::GeminiGateway;
