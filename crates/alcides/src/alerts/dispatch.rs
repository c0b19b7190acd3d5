use tracing::{debug, error, info};

use super::AlertBatch;
use crate::{metrics::Metrics, rundeck::JobRunner};

/// Per-batch counts. Never reported back to the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub triggered: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Runs one Rundeck job per alert carrying a job id, in batch order.
///
/// A failed trigger is logged and does not stop the remaining alerts.
pub async fn dispatch(
    runner: &dyn JobRunner,
    metrics: &Metrics,
    batch: &AlertBatch,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for (index, alert) in batch.alerts.iter().enumerate() {
        let Some(trigger) = alert.job_trigger() else {
            debug!(index, "Alert has no rundeck job id, skipping");
            summary.skipped += 1;
            continue;
        };

        match &trigger.args {
            Some(args) => info!(job_id = %trigger.job_id, job_params = %args, "Triggering rundeck job"),
            None => info!(job_id = %trigger.job_id, "Triggering rundeck job"),
        }

        match runner.run_job(&trigger).await {
            Ok(execution) => {
                info!(
                    job_id = %trigger.job_id,
                    execution_id = execution.id,
                    permalink = execution.permalink.as_deref().unwrap_or(""),
                    "Rundeck job started"
                );
                metrics.job_triggered();
                summary.triggered += 1;
            }
            Err(e) => {
                error!(job_id = %trigger.job_id, error = %e, "Error in rundeck job");
                metrics.job_failed();
                summary.failed += 1;
            }
        }
    }

    summary
}
