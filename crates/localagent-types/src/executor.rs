use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::job::JobStatus;

/// Executor-flavored status labels. Richer than the shared lattice
/// (`preparing`, `paused`), but collapsible onto it via [`Self::as_job_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Preparing,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    #[must_use]
    pub fn as_job_status(self) -> JobStatus {
        match self {
            Self::Pending => JobStatus::Pending,
            Self::Preparing => JobStatus::Processing,
            Self::Running | Self::Paused => JobStatus::Running,
            Self::Completed => JobStatus::Completed,
            Self::Failed => JobStatus::Failed,
            Self::Cancelled => JobStatus::Cancelled,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.as_job_status().is_terminal()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEnvironment {
    pub working_directory: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    pub task_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<ExecutionEnvironment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub metrics: Option<serde_json::Value>,
    #[serde(default)]
    pub artifacts: Option<Vec<ExecutionArtifact>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionArtifact {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub size: u64,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEvent {
    pub id: String,
    pub execution_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLog {
    pub id: String,
    pub execution_id: String,
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub source: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: String,
    pub task_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub node_id: Option<String>,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub context: Option<ExecutionContext>,
    #[serde(default)]
    pub result: Option<ExecutionResult>,
    #[serde(default)]
    pub events: Vec<ExecutionEvent>,
    #[serde(default)]
    pub logs: Vec<ExecutionLog>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStats {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub average_duration: f64,
    #[serde(default)]
    pub resource_usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    pub priority: i32,
    #[serde(default)]
    pub estimated_start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub pending: u64,
    pub running: u64,
    #[serde(default)]
    pub queue: Vec<QueueEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_is_not_terminal() {
        assert!(!ExecutionStatus::Paused.is_terminal());
        assert_eq!(ExecutionStatus::Paused.as_job_status(), JobStatus::Running);
    }

    #[test]
    fn terminal_labels_collapse_onto_the_lattice_sinks() {
        for (status, expected) in [
            (ExecutionStatus::Completed, JobStatus::Completed),
            (ExecutionStatus::Failed, JobStatus::Failed),
            (ExecutionStatus::Cancelled, JobStatus::Cancelled),
        ] {
            assert_eq!(status.as_job_status(), expected);
            assert!(status.is_terminal());
        }
    }
}
