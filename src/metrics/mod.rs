// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Status update attempts and outcomes (by rejection reason)
// - Evaluation latency
// - Cooldown blocks
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the status-update service
pub struct Metrics {
    registry: Registry,

    pub status_update_attempts: IntCounter,
    pub status_update_outcomes: IntCounterVec,
    pub status_update_duration: HistogramVec,
    pub cooldown_blocks: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let status_update_attempts = IntCounter::new(
            "status_update_attempts_total",
            "Total order status update attempts received",
        )?;
        registry.register(Box::new(status_update_attempts.clone()))?;

        let status_update_outcomes = IntCounterVec::new(
            Opts::new(
                "status_update_outcomes_total",
                "Status update outcomes by result",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(status_update_outcomes.clone()))?;

        let status_update_duration = HistogramVec::new(
            HistogramOpts::new(
                "status_update_duration_seconds",
                "End-to-end status update handling duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(status_update_duration.clone()))?;

        let cooldown_blocks = IntCounter::new(
            "cooldown_blocks_total",
            "Attempts rejected by the cooldown guard",
        )?;
        registry.register(Box::new(cooldown_blocks.clone()))?;

        Ok(Self {
            registry,
            status_update_attempts,
            status_update_outcomes,
            status_update_duration,
            cooldown_blocks,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
