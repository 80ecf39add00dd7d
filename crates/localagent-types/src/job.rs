//! The status lattice shared by every asynchronous backend job.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a backend-initiated asynchronous operation.
///
/// Individual resources use different subsets of the labels (the file
/// processor reports `processing`, the code runner `running`), but all of
/// them collapse onto this lattice: the non-terminal states on the left,
/// the terminal states on the right, and transitions only left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// True when no further transition is expected for this job.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement body returned by every job-starting endpoint.
///
/// The backend names the id field after the resource (`executionId`,
/// `jobId`, `operationId`, `requestId`, `crawlerId`, `analysisId`);
/// the aliases fold them onto one shape. Snake_case spellings are
/// accepted too for proxies that rewrite casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    #[serde(
        alias = "executionId",
        alias = "jobId",
        alias = "operationId",
        alias = "requestId",
        alias = "crawlerId",
        alias = "analysisId",
        alias = "execution_id",
        alias = "job_id",
        alias = "operation_id",
        alias = "request_id",
        alias = "crawl_id",
        alias = "analysis_id"
    )]
    pub id: String,
    pub status: JobStatus,
}
