//! [`JobRecord`] impls for the wire snapshot types, so each one can sit in
//! a [`crate::tracker::JobTracker`].

use chrono::Utc;
use localagent_types::executor::ExecutionStatus;
use localagent_types::{
    AnalysisKind, AnalysisResult, BatchKind, BatchOperation, ConversionJob, CrawlJob, Execution,
    ExecutionRecord, FsOperation, FsOperationKind, JobStatus, PlanExecution, RequestJob,
};

use crate::tracker::JobRecord;

impl JobRecord for ConversionJob {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        self.progress
    }
    fn submitted(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            source: None,
            target: None,
            status: JobStatus::Pending,
            progress: Some(0.0),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl JobRecord for BatchOperation {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        self.progress
    }
    fn submitted(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            kind: BatchKind::Convert,
            files: Vec::new(),
            config: None,
            status: JobStatus::Pending,
            progress: Some(0.0),
            results: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl JobRecord for ExecutionRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        None
    }
    fn submitted(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: JobStatus::Pending,
            input: None,
            output: None,
            error: None,
            start_time: None,
            end_time: None,
        }
    }
}

impl JobRecord for RequestJob {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        None
    }
    fn submitted(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            status: JobStatus::Pending,
            config: None,
            response: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl JobRecord for CrawlJob {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        None
    }
    fn submitted(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            status: JobStatus::Pending,
            config: None,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl JobRecord for AnalysisResult {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        self.progress
    }
    fn submitted(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            dataset_id: String::new(),
            kind: AnalysisKind::Statistics,
            status: JobStatus::Pending,
            progress: Some(0.0),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl JobRecord for FsOperation {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        self.progress
    }
    fn submitted(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            kind: FsOperationKind::Copy,
            source: None,
            target: None,
            permissions: None,
            owner: None,
            group: None,
            recursive: None,
            status: JobStatus::Pending,
            progress: Some(0.0),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl JobRecord for PlanExecution {
    fn id(&self) -> &str {
        &self.plan_id
    }
    fn status(&self) -> JobStatus {
        self.status
    }
    fn progress(&self) -> Option<f64> {
        None
    }
    fn submitted(id: &str) -> Self {
        Self {
            plan_id: id.to_string(),
            status: JobStatus::Pending,
            current_nodes: Vec::new(),
            completed_nodes: Vec::new(),
            failed_nodes: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }
}

impl JobRecord for Execution {
    fn id(&self) -> &str {
        &self.id
    }
    fn status(&self) -> JobStatus {
        self.status.as_job_status()
    }
    fn progress(&self) -> Option<f64> {
        None
    }
    fn submitted(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            task_id: String::new(),
            plan_id: String::new(),
            node_id: None,
            status: ExecutionStatus::Pending,
            context: None,
            result: None,
            events: Vec::new(),
            logs: Vec::new(),
            children: Vec::new(),
            parent: None,
            created_at: now,
            updated_at: now,
        }
    }
}
