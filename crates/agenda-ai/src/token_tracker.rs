//! Token usage accounting across reasoning rounds and providers.

use std::collections::HashMap;

use crate::TokenUsage;

/// Tracks cumulative token usage per provider.
#[derive(Debug, Clone, Default)]
pub struct TokenTracker {
    total: TokenUsage,
    by_provider: HashMap<String, TokenUsage>,
    /// Number of reasoning-service calls recorded.
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the usage reported for one call.
    pub fn record(&mut self, provider: &str, usage: &TokenUsage) {
        self.total.input_tokens += usage.input_tokens;
        self.total.output_tokens += usage.output_tokens;
        self.call_count += 1;

        let entry = self.by_provider.entry(provider.to_string()).or_default();
        entry.input_tokens += usage.input_tokens;
        entry.output_tokens += usage.output_tokens;
    }

    /// Fold another tracker's counts into this one.
    pub fn merge(&mut self, other: &TokenTracker) {
        for (provider, usage) in &other.by_provider {
            let entry = self.by_provider.entry(provider.clone()).or_default();
            entry.input_tokens += usage.input_tokens;
            entry.output_tokens += usage.output_tokens;
        }
        self.total.input_tokens += other.total.input_tokens;
        self.total.output_tokens += other.total.output_tokens;
        self.call_count += other.call_count;
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    /// Usage per provider, sorted by provider name.
    pub fn providers(&self) -> Vec<(&str, &TokenUsage)> {
        let mut providers: Vec<_> = self
            .by_provider
            .iter()
            .map(|(name, usage)| (name.as_str(), usage))
            .collect();
        providers.sort_by_key(|(name, _)| *name);
        providers
    }

    pub fn total_tokens(&self) -> u64 {
        self.total.total_tokens()
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(input: u64, output: u64) -> TokenUsage {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
        }
    }

    #[test]
    fn records_totals_and_per_provider() {
        let mut tracker = TokenTracker::new();
        tracker.record("openai", &usage(10, 5));
        tracker.record("openai", &usage(20, 7));
        tracker.record("claude", &usage(1, 1));

        assert_eq!(tracker.total_tokens(), 44);
        assert_eq!(tracker.call_count(), 3);
        assert_eq!(
            tracker.providers(),
            vec![("claude", &usage(1, 1)), ("openai", &usage(30, 12))]
        );
    }

    #[test]
    fn merge_adds_everything() {
        let mut session = TokenTracker::new();
        session.record("openai", &usage(3, 3));

        let mut run = TokenTracker::new();
        run.record("openai", &usage(4, 1));
        run.record("openai", &usage(0, 2));

        session.merge(&run);
        assert_eq!(session.call_count(), 3);
        assert_eq!(session.total(), &usage(7, 6));
        assert_eq!(session.providers(), vec![("openai", &usage(7, 6))]);
    }
}
