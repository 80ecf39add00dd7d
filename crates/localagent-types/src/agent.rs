use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Executor,
    Planner,
    Assistant,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Busy,
    Error,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCapability {
    CodeExecution,
    FileProcessing,
    NetworkAccess,
    DataAnalysis,
    TextProcessing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatsSnapshot {
    pub tasks_completed: u64,
    pub tasks_successful: u64,
    pub tasks_failed: u64,
    pub average_response_time: f64,
    pub uptime: f64,
    pub last_active: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AgentType,
    pub status: AgentStatus,
    #[serde(default)]
    pub capabilities: Vec<AgentCapability>,
    #[serde(default)]
    pub description: String,
    /// Free-form operational config (max concurrent tasks, allowed tools,
    /// timeouts); the console edits but never interprets it.
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub stats: Option<AgentStatsSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentFilter {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AgentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<AgentCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
