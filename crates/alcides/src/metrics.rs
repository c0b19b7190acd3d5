use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::Result;

/// Relay counters, registered on a registry owned by the relay state.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    alert_batches: IntCounterVec,
    job_triggers: IntCounterVec,
    status_checks: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let alert_batches = IntCounterVec::new(
            Opts::new(
                "alcides_alert_batches_total",
                "Alert batches received, by outcome.",
            ),
            &["outcome"],
        )?;
        let job_triggers = IntCounterVec::new(
            Opts::new(
                "alcides_job_triggers_total",
                "Rundeck job run requests, by outcome.",
            ),
            &["outcome"],
        )?;
        let status_checks = IntCounterVec::new(
            Opts::new(
                "alcides_status_checks_total",
                "Rundeck reachability probes, by outcome.",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(alert_batches.clone()))?;
        registry.register(Box::new(job_triggers.clone()))?;
        registry.register(Box::new(status_checks.clone()))?;

        Ok(Self {
            registry,
            alert_batches,
            job_triggers,
            status_checks,
        })
    }

    pub fn batch_accepted(&self) {
        self.alert_batches.with_label_values(&["accepted"]).inc();
    }

    pub fn batch_unauthorized(&self) {
        self.alert_batches.with_label_values(&["unauthorized"]).inc();
    }

    pub fn batch_invalid(&self) {
        self.alert_batches.with_label_values(&["invalid"]).inc();
    }

    pub fn job_triggered(&self) {
        self.job_triggers.with_label_values(&["triggered"]).inc();
    }

    pub fn job_failed(&self) {
        self.job_triggers.with_label_values(&["failed"]).inc();
    }

    pub fn status_check(&self, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        self.status_checks.with_label_values(&[outcome]).inc();
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn gather(&self) -> Result<String> {
        let mut buffer = vec![];
        let encoder = TextEncoder::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
