use crate::{config::GraphLimits, metrics::PipelineMetrics};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Caps applied to every submitted pipeline
    pub limits: GraphLimits,

    /// Prometheus metrics
    pub metrics: Arc<PipelineMetrics>,

    /// Server start time for uptime calculation
    pub start_time: Instant,

    /// Application version
    pub version: String,
}

impl AppState {
    pub fn new(limits: GraphLimits) -> prometheus::Result<Self> {
        Ok(Self {
            limits,
            metrics: Arc::new(PipelineMetrics::new()?),
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
