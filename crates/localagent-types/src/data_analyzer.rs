use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::job::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Numeric,
    Categorical,
    Temporal,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub count: u64,
    pub missing: u64,
    #[serde(default)]
    pub unique: Option<u64>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub std: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub mode: Option<serde_json::Value>,
    #[serde(default)]
    pub frequencies: Option<HashMap<String, u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub statistics: Option<ColumnStatistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub source: String,
    pub format: String,
    pub size: u64,
    pub row_count: u64,
    pub column_count: u64,
    #[serde(default)]
    pub columns: Vec<DataColumn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Statistics,
    Visualization,
    Correlation,
    Clustering,
    Prediction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub dataset_id: String,
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    pub options: AnalysisOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub dataset_id: String,
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    /// Summary / statistics / visualization / model payload, shape depends
    /// on the analysis kind.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<AnalysisError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
