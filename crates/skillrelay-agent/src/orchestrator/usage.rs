//! Token accounting and cost estimation for one chat call.

use serde::Serialize;

use crate::types::Usage;

/// USD per million tokens: (input, output).
const MODEL_PRICING: &[(&str, f64, f64)] = &[
    ("claude-opus-4-6", 15.00, 75.00),
    ("claude-sonnet-4-6", 3.00, 15.00),
    ("claude-sonnet-4-5", 3.00, 15.00),
    ("claude-haiku-4-5-20251001", 0.80, 4.00),
];

/// Token counters accumulated over every model call of one chat, selection included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_write_tokens: u64,
    pub cache_read_tokens: u64,
}

impl UsageTotals {
    pub fn add(&mut self, usage: &Usage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.cache_write_tokens += usage.cache_creation_input_tokens.unwrap_or(0);
        self.cache_read_tokens += usage.cache_read_input_tokens.unwrap_or(0);
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostEstimate {
    Usd(f64),
    /// The model is not in the price table.
    Unavailable,
}

impl CostEstimate {
    pub fn usd(&self) -> Option<f64> {
        match self {
            CostEstimate::Usd(v) => Some(*v),
            CostEstimate::Unavailable => None,
        }
    }
}

impl std::fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostEstimate::Usd(v) => write!(f, "${:.6}", v),
            CostEstimate::Unavailable => f.write_str("unknown (model not in pricing map)"),
        }
    }
}

/// Estimated cost from input and output tokens.
pub fn estimate_cost(model: &str, totals: &UsageTotals) -> CostEstimate {
    match MODEL_PRICING.iter().find(|(name, _, _)| *name == model) {
        Some((_, input, output)) => CostEstimate::Usd(
            totals.input_tokens as f64 / 1_000_000.0 * input
                + totals.output_tokens as f64 / 1_000_000.0 * output,
        ),
        None => CostEstimate::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_accumulate_cache_counters() {
        let mut totals = UsageTotals::default();
        totals.add(&Usage {
            input_tokens: 100,
            output_tokens: 20,
            cache_creation_input_tokens: Some(50),
            cache_read_input_tokens: None,
        });
        totals.add(&Usage {
            input_tokens: 10,
            output_tokens: 5,
            cache_creation_input_tokens: None,
            cache_read_input_tokens: Some(50),
        });
        assert_eq!(
            totals,
            UsageTotals {
                input_tokens: 110,
                output_tokens: 25,
                cache_write_tokens: 50,
                cache_read_tokens: 50,
            }
        );
        assert_eq!(totals.total_tokens(), 135);
    }

    #[test]
    fn test_estimate_cost() {
        let totals = UsageTotals {
            input_tokens: 1_000_000,
            output_tokens: 100_000,
            ..Default::default()
        };
        let cost = estimate_cost("claude-sonnet-4-6", &totals).usd().unwrap();
        assert!((cost - 4.5).abs() < 1e-9);
        assert_eq!(estimate_cost("claude-sonnet-4-6", &totals).to_string(), "$4.500000");
    }

    #[test]
    fn test_unknown_model_has_no_cost() {
        let totals = UsageTotals { input_tokens: 10, ..Default::default() };
        assert_eq!(estimate_cost("gpt-4o", &totals), CostEstimate::Unavailable);
        assert_eq!(estimate_cost("gpt-4o", &totals).usd(), None);
    }
}
