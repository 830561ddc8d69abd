//! Prometheus metrics for pipeline analysis

use pipeline_dag::Analysis;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

const NAMESPACE: &str = "pipeline";

/// Service metrics exposed on `/metrics`
pub struct PipelineMetrics {
    /// Graphs analyzed, labelled by verdict ("dag" or "cyclic")
    pub graphs_analyzed: IntCounterVec,

    /// Requests turned away before analysis, labelled by reason
    pub requests_rejected: IntCounterVec,

    /// Edges ignored because an endpoint was unknown
    pub dangling_edges: IntCounter,

    /// Time spent inside the validator
    pub analysis_duration: Histogram,

    registry: Arc<Registry>,
}

impl PipelineMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let graphs_analyzed = IntCounterVec::new(
            Opts::new("graphs_analyzed_total", "Total pipeline graphs analyzed").namespace(NAMESPACE),
            &["verdict"],
        )?;
        registry.register(Box::new(graphs_analyzed.clone()))?;

        let requests_rejected = IntCounterVec::new(
            Opts::new("requests_rejected_total", "Requests rejected before analysis")
                .namespace(NAMESPACE),
            &["reason"],
        )?;
        registry.register(Box::new(requests_rejected.clone()))?;

        let dangling_edges = IntCounter::with_opts(
            Opts::new("dangling_edges_total", "Edges ignored for referencing unknown nodes")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(dangling_edges.clone()))?;

        let analysis_duration = Histogram::with_opts(
            HistogramOpts::new("analysis_duration_seconds", "Validator execution time")
                .namespace(NAMESPACE)
                .buckets(vec![0.00001, 0.0001, 0.001, 0.01, 0.1, 1.0]),
        )?;
        registry.register(Box::new(analysis_duration.clone()))?;

        Ok(Self {
            graphs_analyzed,
            requests_rejected,
            dangling_edges,
            analysis_duration,
            registry: Arc::new(registry),
        })
    }

    /// Record the outcome of one validator pass
    pub fn record_analysis(&self, analysis: &Analysis) {
        let verdict = if analysis.is_acyclic() { "dag" } else { "cyclic" };
        self.graphs_analyzed.with_label_values(&[verdict]).inc();
        self.dangling_edges.inc_by(analysis.dangling_edges as u64);
    }

    pub fn record_rejection(&self, reason: &str) {
        self.requests_rejected.with_label_values(&[reason]).inc();
    }

    /// Get Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(visited: usize, dangling_edges: usize) -> Analysis {
        Analysis {
            distinct_nodes: 3,
            admitted_edges: 2,
            dangling_edges,
            visited,
        }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = PipelineMetrics::new().unwrap();
        assert_eq!(metrics.dangling_edges.get(), 0);
        assert_eq!(metrics.graphs_analyzed.with_label_values(&["dag"]).get(), 0);
    }

    #[test]
    fn test_record_analysis() {
        let metrics = PipelineMetrics::new().unwrap();

        metrics.record_analysis(&analysis(3, 0));
        metrics.record_analysis(&analysis(1, 2));

        assert_eq!(metrics.graphs_analyzed.with_label_values(&["dag"]).get(), 1);
        assert_eq!(metrics.graphs_analyzed.with_label_values(&["cyclic"]).get(), 1);
        assert_eq!(metrics.dangling_edges.get(), 2);
    }

    #[test]
    fn test_export() {
        let metrics = PipelineMetrics::new().unwrap();
        metrics.record_rejection("schema_mismatch");
        metrics.analysis_duration.observe(0.0005);

        let text = metrics.export().unwrap();
        assert!(text.contains("pipeline_requests_rejected_total{reason=\"schema_mismatch\"} 1"));
        assert!(text.contains("pipeline_analysis_duration_seconds_count 1"));
    }

    #[test]
    fn test_registries_are_independent() {
        let first = PipelineMetrics::new().unwrap();
        let second = PipelineMetrics::new().unwrap();

        first.record_rejection("limit_exceeded");
        assert_eq!(
            second.requests_rejected.with_label_values(&["limit_exceeded"]).get(),
            0
        );
        assert!(Arc::ptr_eq(&first.registry(), &first.registry()));
    }
}
