//! Named latency distributions and their aggregated summaries

use crate::error::{AppError, Result};
use crate::stats::{calculate_percentile, mean, sorted_samples};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Aggregated values of one trend, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendValues {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub med: f64,
    pub p90: f64,
    pub p95: f64,
}

impl TrendValues {
    /// Summarize a non-empty set of samples
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(AppError::statistics("Cannot summarize a trend with no samples"));
        }

        let sorted = sorted_samples(samples)?;

        Ok(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            avg: mean(&sorted),
            med: calculate_percentile(&sorted, 50.0),
            p90: calculate_percentile(&sorted, 90.0),
            p95: calculate_percentile(&sorted, 95.0),
        })
    }
}

/// Aggregated results handed to summary handlers.
///
/// Trends that never received a sample are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    pub metrics: BTreeMap<String, TrendValues>,
}

impl SummaryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert precomputed values for a trend
    pub fn with_trend(mut self, name: &str, values: TrendValues) -> Self {
        self.metrics.insert(name.to_string(), values);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TrendValues> {
        self.metrics.get(name)
    }

    /// 95th percentile of a trend, if it has samples
    pub fn p95(&self, name: &str) -> Option<f64> {
        self.get(name).map(|v| v.p95)
    }

    pub fn count(&self, name: &str) -> usize {
        self.get(name).map(|v| v.count).unwrap_or(0)
    }
}

/// Thread-safe collection of named trends shared by all virtual users
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    trends: Arc<Mutex<HashMap<String, Vec<f64>>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample into the named trend
    pub fn add(&self, name: &str, value: f64) {
        let mut trends = self.trends.lock().unwrap_or_else(|e| e.into_inner());
        trends.entry(name.to_string()).or_default().push(value);
    }

    /// Number of samples recorded so far for a trend
    pub fn sample_count(&self, name: &str) -> usize {
        let trends = self.trends.lock().unwrap_or_else(|e| e.into_inner());
        trends.get(name).map(Vec::len).unwrap_or(0)
    }

    /// Copy of the raw samples of a trend
    pub fn samples(&self, name: &str) -> Vec<f64> {
        let trends = self.trends.lock().unwrap_or_else(|e| e.into_inner());
        trends.get(name).cloned().unwrap_or_default()
    }

    /// Summarize every trend holding at least one sample
    pub fn snapshot(&self) -> SummaryData {
        let trends = self.trends.lock().unwrap_or_else(|e| e.into_inner());
        let metrics = trends
            .iter()
            .filter_map(|(name, samples)| {
                TrendValues::from_samples(samples)
                    .ok()
                    .map(|values| (name.clone(), values))
            })
            .collect();
        SummaryData { metrics }
    }
}
