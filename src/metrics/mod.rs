//! Token usage accounting across panels

use crate::api::TokenUsage;
use crate::view::View;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Usage metrics for one process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Total prompt tokens used
    pub total_prompt_tokens: u64,
    /// Total completion tokens used
    pub total_completion_tokens: u64,
    /// Number of successful requests
    pub request_count: u64,
    /// Number of failed requests
    pub failure_count: u64,
    /// Per-panel breakdown
    pub panels: HashMap<View, PanelUsage>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PanelUsage {
    pub requests: u64,
    pub failures: u64,
    pub tokens: u64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self, view: View, usage: TokenUsage) {
        self.total_prompt_tokens += usage.prompt_tokens as u64;
        self.total_completion_tokens += usage.completion_tokens as u64;
        self.request_count += 1;

        let panel = self.panels.entry(view).or_default();
        panel.requests += 1;
        panel.tokens += usage.total_tokens as u64;
    }

    pub fn record_failure(&mut self, view: View) {
        self.failure_count += 1;
        self.panels.entry(view).or_default().failures += 1;
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_prompt_tokens + self.total_completion_tokens
    }

    pub fn average_tokens_per_request(&self) -> f64 {
        if self.request_count == 0 {
            return 0.0;
        }
        self.total_tokens() as f64 / self.request_count as f64
    }
}

/// Thread-safe usage tracker
#[derive(Clone)]
pub struct UsageTracker {
    inner: Arc<Mutex<UsageMetrics>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(UsageMetrics::new())),
        }
    }

    pub fn record_request(&self, view: View, usage: TokenUsage) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.record_request(view, usage);
        }
    }

    pub fn record_failure(&self, view: View) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.record_failure(view);
        }
    }

    pub fn get_metrics(&self) -> UsageMetrics {
        self.inner
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> UsageSummary {
        let metrics = self.get_metrics();
        UsageSummary {
            total_tokens: metrics.total_tokens(),
            prompt_tokens: metrics.total_prompt_tokens,
            completion_tokens: metrics.total_completion_tokens,
            request_count: metrics.request_count,
            failure_count: metrics.failure_count,
            avg_tokens_per_request: metrics.average_tokens_per_request(),
        }
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub request_count: u64,
    pub failure_count: u64,
    pub avg_tokens_per_request: f64,
}

impl std::fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Usage Summary ===")?;
        writeln!(f, "Total tokens used: {}", self.total_tokens)?;
        writeln!(f, "Prompt / completion: {} / {}", self.prompt_tokens, self.completion_tokens)?;
        writeln!(f, "Successful requests: {}", self.request_count)?;
        writeln!(f, "Failed requests: {}", self.failure_count)?;
        writeln!(f, "Avg tokens/request: {:.1}", self.avg_tokens_per_request)?;
        Ok(())
    }
}
