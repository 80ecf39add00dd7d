use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Text,
    Image,
    Pdf,
    Office,
    Archive,
    Binary,
}

impl FileType {
    /// Best-effort classification from a file extension, used when a job
    /// result omits the type.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "md" | "csv" | "json" | "xml" | "html" | "log" => Self::Text,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "svg" => Self::Image,
            "pdf" => Self::Pdf,
            "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "odt" => Self::Office,
            "zip" | "gz" | "tar" | "rar" | "7z" => Self::Archive,
            _ => Self::Binary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileType,
    pub size: u64,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOperationConfig {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FileType>,
    /// Encoding/compression/image/pdf/office knobs; opaque to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOperationResult {
    pub success: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<FileType>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionTarget {
    #[serde(rename = "type")]
    pub kind: FileType,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionJob {
    pub id: String,
    #[serde(default)]
    pub source: Option<FileInfo>,
    #[serde(default)]
    pub target: Option<ConversionTarget>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub result: Option<FileOperationResult>,
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    Convert,
    Compress,
    Extract,
    Merge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BatchKind,
    #[serde(default)]
    pub files: Vec<FileInfo>,
    #[serde(default)]
    pub config: Option<FileOperationConfig>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub results: Vec<FileOperationResult>,
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_from_extension_covers_known_families() {
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("tar"), FileType::Archive);
        assert_eq!(FileType::from_extension("md"), FileType::Text);
        assert_eq!(FileType::from_extension("webp"), FileType::Image);
        assert_eq!(FileType::from_extension("so"), FileType::Binary);
    }

    #[test]
    fn conversion_job_decodes_server_snapshot() {
        let raw = r#"{
            "id": "job-1",
            "status": "completed",
            "progress": 100,
            "result": {"success": true, "path": "/out/f.pdf", "size": 1024},
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:05Z"
        }"#;
        let job: ConversionJob = serde_json::from_str(raw).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.status.is_terminal());
        let result = job.result.unwrap();
        assert_eq!(result.path.as_deref(), Some("/out/f.pdf"));
        assert_eq!(result.size, Some(1024));
    }
}
