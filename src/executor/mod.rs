//! Probe execution engine
//!
//! A run has three phases:
//! - setup: one unmeasured GET to the direct URL and one to the Pocker URL,
//!   logging the region the proxy reports
//! - load: `vus` concurrent virtual users, each running `iterations`
//!   iterations; one iteration visits Direct, Pocker and Pocker CF in order
//! - summary: handled by [`crate::output`] from the returned [`RunResults`]
//!
//! A failing group ends its iteration early. The failure is reported as an
//! [`IterationOutcome`] and the virtual user moves on to its next iteration.

use crate::{
    client::{HttpClient, HttpResponse, ProbeClient},
    error::{AppError, Result},
    logging::Logger,
    models::{MetricsRegistry, ProbeConfig, SummaryData},
    types::Target,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why an iteration stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Response arrived with a status other than 200
    Status(u16),
    /// No response: connection, timeout or body read failure
    Transport(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Status(status) => write!(f, "Expected status 200, got {}", status),
            FailureReason::Transport(error) => write!(f, "Request failed: {}", error),
        }
    }
}

/// Result of one iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IterationOutcome {
    Success,
    Failed { target: Target, reason: FailureReason },
}

impl IterationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IterationOutcome::Success)
    }
}

/// Counters and aggregated metrics of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResults {
    /// Iterations executed across all virtual users
    pub iterations: u64,
    /// Iterations that ended in a failure
    pub failed_iterations: u64,
    /// Failed iterations keyed by the group that failed
    pub failures_by_target: HashMap<Target, u64>,
    /// Wall-clock duration of the load phase
    pub duration: Duration,
    /// Aggregated trends
    pub summary: SummaryData,
}

impl RunResults {
    pub fn successful_iterations(&self) -> u64 {
        self.iterations - self.failed_iterations
    }

    /// Percentage of iterations that completed all three groups
    pub fn success_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.successful_iterations() as f64 / self.iterations as f64 * 100.0
        }
    }
}

#[derive(Debug, Default)]
struct VuTally {
    iterations: u64,
    failures: HashMap<Target, u64>,
}

/// Drives the probe's three phases
#[derive(Clone)]
pub struct ProbeExecutor {
    config: ProbeConfig,
    client: Arc<dyn HttpClient>,
    metrics: MetricsRegistry,
    logger: Logger,
}

impl ProbeExecutor {
    /// Create an executor with an explicit client
    pub fn new(config: ProbeConfig, client: Arc<dyn HttpClient>, logger: Logger) -> Self {
        Self {
            config,
            client,
            metrics: MetricsRegistry::new(),
            logger,
        }
    }

    /// Create an executor backed by a real HTTP client
    pub fn from_config(config: ProbeConfig, logger: Logger) -> Result<Self> {
        config.validate()?;
        let client = ProbeClient::from_config(&config)?;
        Ok(Self::new(config, Arc::new(client), logger))
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Warm-up and diagnostics; nothing here is measured.
    ///
    /// Returns the region reported by the Pocker route, if any.
    pub async fn setup(&self) -> Option<String> {
        let logger = self.logger.named("setup");

        let direct_url = self.config.target_url(Target::Direct);
        if let Err(e) = self.client.get(&direct_url).await {
            logger.warn(&format!("Setup request to {} failed: {}", Target::Direct, e))
                .field("url", &direct_url)
                .error_info(&e)
                .log()
                .await;
        }

        let pocker_url = self.config.target_url(Target::Pocker);
        match self.client.get(&pocker_url).await {
            Ok(response) => {
                let region = response.region().map(str::to_string);
                logger.info(&format!("Pocker Region: {}", region.as_deref().unwrap_or("<missing>")))
                    .field("region", &region)
                    .field("status", response.status_code)
                    .log()
                    .await;
                region
            }
            Err(e) => {
                logger.warn(&format!("Setup request to {} failed: {}", Target::Pocker, e))
                    .field("url", &pocker_url)
                    .error_info(&e)
                    .log()
                    .await;
                None
            }
        }
    }

    /// Run one group: request, validate, record.
    async fn run_group(&self, target: Target, vu: u32) -> std::result::Result<(), FailureReason> {
        let url = self.config.target_url(target);

        let response = match self.client.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.error(&format!("{} request failed: {}", target, e))
                    .field("target", target)
                    .field("vu", vu)
                    .error_info(&e)
                    .log()
                    .await;
                return Err(FailureReason::Transport(e.to_string()));
            }
        };

        if !response.is_ok() {
            self.logger.error(&format!("{} request failed with status {}", target, response.status_code))
                .field("target", target)
                .field("vu", vu)
                .field("status", response.status_code)
                .log()
                .await;
            return Err(FailureReason::Status(response.status_code));
        }

        self.record(target, &response).await;
        Ok(())
    }

    async fn record(&self, target: Target, response: &HttpResponse) {
        self.metrics.add(target.duration_trend(), response.duration_ms());

        if let Some(trend) = target.internal_trend() {
            match response.internal_duration_ms() {
                Some(ms) => self.metrics.add(trend, ms as f64),
                None => {
                    self.logger.warn(&format!(
                        "{} response has no usable {} header",
                        target,
                        crate::defaults::REQUEST_DURATION_HEADER
                    ))
                        .field("target", target)
                        .field("value", response.header(crate::defaults::REQUEST_DURATION_HEADER))
                        .log()
                        .await;
                }
            }
        }
    }

    /// Execute one iteration for the given virtual user
    pub async fn run_iteration(&self, vu: u32) -> IterationOutcome {
        for target in Target::ALL {
            if let Err(reason) = self.run_group(target, vu).await {
                return IterationOutcome::Failed { target, reason };
            }
        }
        IterationOutcome::Success
    }

    async fn run_vu(&self, vu: u32) -> VuTally {
        let mut tally = VuTally::default();
        for iteration in 0..self.config.iterations {
            let outcome = self.run_iteration(vu).await;
            tally.iterations += 1;
            if let IterationOutcome::Failed { target, reason } = outcome {
                *tally.failures.entry(target).or_default() += 1;
                self.logger.debug(&format!("Iteration failed: {}", reason))
                    .field("vu", vu)
                    .field("iteration", iteration)
                    .field("target", target)
                    .log()
                    .await;
            }
        }
        tally
    }

    /// Run the load phase with `vus` concurrent virtual users
    pub async fn run(&self) -> Result<RunResults> {
        self.logger.debug(&format!(
            "Starting load: {} VUs x {} iterations",
            self.config.vus, self.config.iterations
        ))
            .field("vus", self.config.vus)
            .field("iterations", self.config.iterations)
            .log()
            .await;

        let started = Instant::now();

        let handles: Vec<_> = (1..=self.config.vus)
            .map(|vu| {
                let executor = self.clone();
                tokio::spawn(async move { executor.run_vu(vu).await })
            })
            .collect();

        let mut iterations = 0u64;
        let mut failures_by_target: HashMap<Target, u64> = HashMap::new();
        for joined in join_all(handles).await {
            let tally = joined
                .map_err(|e| AppError::test_execution(format!("Virtual user task failed: {}", e)))?;
            iterations += tally.iterations;
            for (target, count) in tally.failures {
                *failures_by_target.entry(target).or_default() += count;
            }
        }

        let results = RunResults {
            iterations,
            failed_iterations: failures_by_target.values().sum(),
            failures_by_target,
            duration: started.elapsed(),
            summary: self.metrics.snapshot(),
        };

        self.logger.debug(&format!(
            "Load finished: {} iterations, {} failed",
            results.iterations, results.failed_iterations
        ))
            .field("duration_ms", results.duration.as_millis() as u64)
            .log()
            .await;

        Ok(results)
    }
}
