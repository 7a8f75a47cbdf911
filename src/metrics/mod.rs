use prometheus::{Counter, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;

/// Prometheus metrics for the search engine
#[derive(Clone)]
pub struct EngineMetrics {
    pub searches_total: Counter,
    pub documents_indexed: Counter,
    pub builds_total: Counter,
    pub search_latency: Histogram,

    registry: Arc<Registry>,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let searches_total = Counter::with_opts(Opts::new(
            "shoal_searches_total",
            "Total number of search requests",
        ))?;
        registry.register(Box::new(searches_total.clone()))?;

        let documents_indexed = Counter::with_opts(Opts::new(
            "shoal_documents_indexed_total",
            "Total number of documents indexed across all builds",
        ))?;
        registry.register(Box::new(documents_indexed.clone()))?;

        let builds_total = Counter::with_opts(Opts::new(
            "shoal_builds_total",
            "Total number of build jobs started",
        ))?;
        registry.register(Box::new(builds_total.clone()))?;

        let search_latency = Histogram::with_opts(HistogramOpts::new(
            "shoal_search_latency_seconds",
            "Search request latency in seconds",
        ))?;
        registry.register(Box::new(search_latency.clone()))?;

        Ok(Self {
            searches_total,
            documents_indexed,
            builds_total,
            search_latency,
            registry: Arc::new(registry),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_and_count() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.searches_total.inc();
        metrics.searches_total.inc();
        metrics.builds_total.inc();

        assert_eq!(metrics.searches_total.get() as u64, 2);
        assert_eq!(metrics.builds_total.get() as u64, 1);
        assert!(!metrics.registry().gather().is_empty());
    }
}
