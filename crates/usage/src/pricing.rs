//! Pricing table for the supported Gemini models.
//!
//! Prices are in USD per 1 million tokens. Each model has an input and
//! output price. Custom pricing can be added at runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Per-million-token pricing for a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per 1M input tokens in USD.
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD.
    pub output_per_m: f64,
}

impl ModelPricing {
    /// Create a new pricing entry.
    pub fn new(input_per_m: f64, output_per_m: f64) -> Self {
        Self {
            input_per_m,
            output_per_m,
        }
    }

    /// Compute the USD cost for the given token counts.
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 * self.input_per_m + output_tokens as f64 * self.output_per_m)
            / 1_000_000.0
    }
}

/// Thread-safe pricing table with built-in defaults and custom overrides.
pub struct PricingTable {
    prices: RwLock<HashMap<String, ModelPricing>>,
}

impl PricingTable {
    /// Create a pricing table with built-in model prices.
    pub fn with_defaults() -> Self {
        let mut prices = HashMap::new();

        prices.insert("gemini-2.5-flash".into(), ModelPricing::new(0.35, 0.70));
        prices.insert(
            "gemini-2.5-flash-lite".into(),
            ModelPricing::new(0.10, 0.40),
        );

        Self {
            prices: RwLock::new(prices),
        }
    }

    /// Create an empty pricing table.
    pub fn empty() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Look up pricing for a model. Returns None if not found.
    pub fn get(&self, model: &str) -> Option<ModelPricing> {
        let prices = self.prices.read().unwrap_or_else(|e| e.into_inner());
        prices.get(model).cloned()
    }

    /// Add or update pricing for a model.
    pub fn set(&self, model: impl Into<String>, pricing: ModelPricing) {
        let mut prices = self.prices.write().unwrap_or_else(|e| e.into_inner());
        prices.insert(model.into(), pricing);
    }

    /// Compute the USD cost for a model call, returning 0.0 if the model is
    /// not in the table.
    ///
    /// Tries an exact match first, then prefix matching so a versioned name
    /// (`gemini-2.5-flash-preview-0514` matches `gemini-2.5-flash`). The
    /// longest matching key wins, so `gemini-2.5-flash-lite` is never
    /// shadowed by `gemini-2.5-flash`.
    pub fn compute_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        let prices = self.prices.read().unwrap_or_else(|e| e.into_inner());

        if let Some(p) = prices.get(model) {
            return p.cost(input_tokens, output_tokens);
        }

        let model_lower = model.to_lowercase();
        let mut best: Option<(&str, &ModelPricing)> = None;
        for (key, pricing) in prices.iter() {
            if model_lower.starts_with(&key.to_lowercase()) {
                if best.is_none() || key.len() > best.unwrap().0.len() {
                    best = Some((key.as_str(), pricing));
                }
            }
        }

        if let Some((_, p)) = best {
            return p.cost(input_tokens, output_tokens);
        }

        0.0
    }

    /// List all known model names.
    pub fn models(&self) -> Vec<String> {
        let prices = self.prices.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = prices.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of models in the pricing table.
    pub fn len(&self) -> usize {
        self.prices.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_both_models() {
        let table = PricingTable::with_defaults();
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn flash_model_cost() {
        let table = PricingTable::with_defaults();

        // (1000 * 0.35 + 500 * 0.70) / 1M = (350 + 350) / 1M = 0.0007
        let cost = table.compute_cost("gemini-2.5-flash", 1000, 500);
        assert!((cost - 0.0007).abs() < 1e-10);
    }

    #[test]
    fn unknown_model_returns_zero() {
        let table = PricingTable::with_defaults();
        let cost = table.compute_cost("claude-sonnet-4", 1000, 500);
        assert!((cost - 0.0).abs() < 1e-10);
    }

    #[test]
    fn versioned_name_matches_by_prefix() {
        let table = PricingTable::with_defaults();
        let exact = table.compute_cost("gemini-2.5-flash", 1000, 500);
        let versioned = table.compute_cost("gemini-2.5-flash-preview-0514", 1000, 500);
        assert!((exact - versioned).abs() < 1e-10);
    }

    #[test]
    fn lite_is_not_shadowed_by_flash() {
        let table = PricingTable::with_defaults();

        // (1000 * 0.10 + 500 * 0.40) / 1M = (100 + 200) / 1M = 0.0003
        let cost = table.compute_cost("gemini-2.5-flash-lite-001", 1000, 500);
        assert!((cost - 0.0003).abs() < 1e-10);
    }

    #[test]
    fn custom_pricing() {
        let table = PricingTable::empty();
        assert!(table.is_empty());

        table.set("custom-model", ModelPricing::new(1.0, 2.0));
        assert_eq!(table.len(), 1);

        let cost = table.compute_cost("custom-model", 1_000_000, 1_000_000);
        // (1M * 1.0 + 1M * 2.0) / 1M = 3.0
        assert!((cost - 3.0).abs() < 1e-10);
    }

    #[test]
    fn model_pricing_cost() {
        let p = ModelPricing::new(0.35, 0.70);
        // (100 * 0.35 + 50 * 0.70) / 1M = (35 + 35) / 1M = 0.00007
        let c = p.cost(100, 50);
        assert!((c - 0.00007).abs() < 1e-10);
    }

    #[test]
    fn set_overrides_existing() {
        let table = PricingTable::with_defaults();
        let old = table.compute_cost("gemini-2.5-flash", 1_000_000, 0);
        assert!((old - 0.35).abs() < 1e-10);

        table.set("gemini-2.5-flash", ModelPricing::new(5.0, 20.0));
        let new_cost = table.compute_cost("gemini-2.5-flash", 1_000_000, 0);
        assert!((new_cost - 5.0).abs() < 1e-10);
    }

    #[test]
    fn list_models_sorted() {
        let table = PricingTable::with_defaults();
        let models = table.models();
        assert!(models.contains(&"gemini-2.5-flash".to_string()));
        assert!(models.contains(&"gemini-2.5-flash-lite".to_string()));
        assert!(models.windows(2).all(|w| w[0] <= w[1]));
    }
}
