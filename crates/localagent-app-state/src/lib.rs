//! Client-side state for the LocalAgent console: resource stores, a
//! generic submit-and-poll job tracker, and per-resource containers
//! that keep cached state consistent with the backend and the session.

pub mod containers;
pub mod error;
pub mod records;
pub mod store;
pub mod tracker;

pub use containers::{
    AgentContainer, AppState, AuthContainer, AuthState, BatchRequest, CodeExecutionRequest,
    CodeRunnerContainer, DataAnalyzerContainer, ExecutorContainer, FileProcessorContainer,
    NetworkContainer, PlannerContainer, SystemOperatorContainer, TaskContainer, ToolContainer,
};
pub use error::StateError;
pub use store::{Change, ResourceStore};
pub use tracker::{JobDriver, JobRecord, JobTracker, JobTrackerConfig, DEFAULT_POLL_INTERVAL_MS};
