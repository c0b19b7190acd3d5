mod dispatch;
mod model;

pub use dispatch::{dispatch, DispatchSummary};
pub use model::{Alert, AlertBatch, JOB_ARGS_ANNOTATION, JOB_ID_LABEL};
