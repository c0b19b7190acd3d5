mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use client::RundeckClient;

/// A request to run one Rundeck job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTrigger {
    #[serde(skip)]
    pub job_id: String,
    #[serde(rename = "argString", skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

/// The execution Rundeck starts for a run request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Execution {
    pub id: u64,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The parts of the Rundeck API the relay needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Cheap reachability probe.
    async fn ping(&self) -> Result<()>;

    async fn run_job(&self, trigger: &JobTrigger) -> Result<Execution>;
}
