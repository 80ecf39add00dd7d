//! Wire-level data model for the LocalAgent backend API.
//!
//! Every struct here mirrors a server-side resource representation; the
//! client never invents fields, it deserializes whatever snapshot the
//! backend returns and replaces local copies wholesale.

pub mod agent;
pub mod auth;
pub mod code_runner;
pub mod data_analyzer;
pub mod executor;
pub mod file_processor;
pub mod job;
pub mod network;
pub mod planner;
pub mod system;
pub mod system_operator;
pub mod task;
pub mod tool;

pub use agent::{Agent, AgentFilter, AgentStatus, AgentType};
pub use auth::{AuthSession, LoginCredentials, RegisterData, User};
pub use code_runner::{
    CodeInput, CodeOutput, ExecutionRecord, PackageInfo, RuntimeConfig, RuntimeInstance,
    RuntimeState, RuntimeType,
};
pub use data_analyzer::{AnalysisConfig, AnalysisKind, AnalysisResult, DataColumn, DatasetInfo};
pub use executor::{
    Execution, ExecutionContext, ExecutionEvent, ExecutionLog, ExecutionStats, ExecutionStatus,
    QueueSnapshot,
};
pub use file_processor::{
    BatchKind, BatchOperation, ConversionJob, ConversionTarget, FileInfo, FileOperationConfig,
    FileOperationResult, FileType,
};
pub use job::{JobAccepted, JobStatus};
pub use network::{
    CacheConfig, CacheStats, CrawlJob, CrawlRequest, CrawlResult, HttpRequestConfig, ProxyConfig,
    RequestJob, ResponseData,
};
pub use planner::{PlanExecution, PlanNode, PlanValidation, PlanningContext, TaskPlan};
pub use system::{
    DashboardMetrics, HistoryKind, HistoryRecord, SystemEvent, SystemMetrics, SystemStatus,
};
pub use system_operator::{
    CommandOutput, FsOperation, FsOperationKind, FsOperationRequest, LogEntry, ProcessInfo,
    ServiceInfo,
};
pub use task::{
    Task, TaskFilter, TaskPriority, TaskResult, TaskStats, TaskStatus, TaskStep, TaskType,
};
pub use tool::{Tool, ToolExecution, ToolFilter};
