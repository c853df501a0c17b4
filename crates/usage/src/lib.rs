//! Usage and cost accounting for mostrador.
//!
//! Converts the token counts reported with each completed exchange into a
//! display-currency cost estimate and keeps per-exchange and per-session
//! running totals.
//!
//! - [`pricing`] — USD-per-million-token price table for the supported
//!   models.
//! - [`accountant`] — per-session stats accumulation.
//! - [`format`] — es-MX display rendering for token counts and amounts.

pub mod accountant;
pub mod format;
pub mod pricing;

pub use accountant::{USD_TO_MXN, UsageAccountant, UsageStats};
pub use format::{format_mxn, format_tokens};
pub use pricing::{ModelPricing, PricingTable};
