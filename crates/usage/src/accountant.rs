//! Per-session usage accumulation.
//!
//! Each completed exchange reports prompt and total token counts. The
//! accountant derives input/output splits, prices them, converts to the
//! display currency, and keeps both last-exchange and session totals.
//! Exchanges that arrive without usage metadata leave the stats untouched.

use serde::{Deserialize, Serialize};

use mostrador_core::{ModelId, TokenCounts};

use crate::pricing::PricingTable;

/// Display-currency conversion rate applied to USD prices.
pub const USD_TO_MXN: f64 = 18.0;

/// Running usage statistics for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Tokens consumed by the most recent exchange.
    pub last_exchange_tokens: u64,
    /// Tokens consumed since the session started.
    pub total_session_tokens: u64,
    /// Cost of the most recent exchange, in MXN.
    pub last_exchange_cost: f64,
    /// Cost accumulated since the session started, in MXN.
    pub total_session_cost: f64,
}

/// Prices token counts and accumulates per-session stats.
pub struct UsageAccountant {
    pricing: PricingTable,
    rate: f64,
    stats: UsageStats,
}

impl UsageAccountant {
    pub fn new() -> Self {
        Self {
            pricing: PricingTable::with_defaults(),
            rate: USD_TO_MXN,
            stats: UsageStats::default(),
        }
    }

    /// Record the usage reported with one completed exchange.
    ///
    /// Input tokens are the prompt count; output tokens are whatever the
    /// total exceeds the prompt by, floored at zero. An exchange without
    /// usage metadata is a no-op; the previous stats remain on display.
    pub fn record(&mut self, model: ModelId, usage: Option<TokenCounts>) {
        let Some(counts) = usage else {
            tracing::debug!("Exchange completed without usage metadata");
            return;
        };

        let input = counts.prompt_tokens;
        let output = counts.total_tokens.saturating_sub(counts.prompt_tokens);
        let cost = self.pricing.compute_cost(model.as_str(), input, output) * self.rate;

        self.stats.last_exchange_tokens = u64::from(input) + u64::from(output);
        self.stats.last_exchange_cost = cost;
        self.stats.total_session_tokens += self.stats.last_exchange_tokens;
        self.stats.total_session_cost += cost;
    }

    /// Current session statistics.
    pub fn stats(&self) -> &UsageStats {
        &self.stats
    }

    /// Reset the session totals. Called when the transcript is cleared.
    pub fn reset(&mut self) {
        self.stats = UsageStats::default();
    }
}

impl Default for UsageAccountant {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(prompt: u32, total: u32) -> TokenCounts {
        TokenCounts {
            prompt_tokens: prompt,
            total_tokens: total,
        }
    }

    #[test]
    fn single_exchange_on_flash() {
        let mut accountant = UsageAccountant::new();
        accountant.record(ModelId::Gemini25Flash, Some(counts(100, 150)));

        let stats = accountant.stats();
        assert_eq!(stats.last_exchange_tokens, 150);
        assert_eq!(stats.total_session_tokens, 150);
        // (100 * 0.35 + 50 * 0.70) / 1M * 18 = 0.00007 * 18 = 0.00126 MXN
        assert!((stats.last_exchange_cost - 0.00126).abs() < 1e-10);
        assert!((stats.total_session_cost - 0.00126).abs() < 1e-10);
    }

    #[test]
    fn totals_accumulate_across_exchanges() {
        let mut accountant = UsageAccountant::new();
        accountant.record(ModelId::Gemini25Flash, Some(counts(100, 150)));
        accountant.record(ModelId::Gemini25Flash, Some(counts(100, 150)));

        let stats = accountant.stats();
        assert_eq!(stats.last_exchange_tokens, 150);
        assert_eq!(stats.total_session_tokens, 300);
        assert!((stats.last_exchange_cost - 0.00126).abs() < 1e-10);
        assert!((stats.total_session_cost - 0.00252).abs() < 1e-10);
    }

    #[test]
    fn missing_usage_leaves_stats_unchanged() {
        let mut accountant = UsageAccountant::new();
        accountant.record(ModelId::Gemini25Flash, Some(counts(100, 150)));
        accountant.record(ModelId::Gemini25Flash, None);

        let stats = accountant.stats();
        assert_eq!(stats.last_exchange_tokens, 150);
        assert_eq!(stats.total_session_tokens, 150);
    }

    #[test]
    fn total_below_prompt_floors_output_at_zero() {
        let mut accountant = UsageAccountant::new();
        accountant.record(ModelId::Gemini25Flash, Some(counts(200, 150)));

        let stats = accountant.stats();
        assert_eq!(stats.last_exchange_tokens, 200);
        // 200 input tokens, zero output: (200 * 0.35) / 1M * 18
        assert!((stats.last_exchange_cost - 0.00126).abs() < 1e-10);
    }

    #[test]
    fn lite_model_uses_its_own_prices() {
        let mut accountant = UsageAccountant::new();
        accountant.record(ModelId::Gemini25FlashLite, Some(counts(100, 150)));

        // (100 * 0.10 + 50 * 0.40) / 1M * 18 = 0.00003 * 18 = 0.00054 MXN
        assert!((accountant.stats().last_exchange_cost - 0.00054).abs() < 1e-10);
    }

    #[test]
    fn reset_clears_session_totals() {
        let mut accountant = UsageAccountant::new();
        accountant.record(ModelId::Gemini25Flash, Some(counts(100, 150)));
        accountant.reset();

        assert_eq!(accountant.stats(), &UsageStats::default());
    }
}
