//! One container per backend resource, plus [`AppState`] tying them to
//! a shared client and session.

pub mod agent;
pub mod app;
pub mod auth;
pub mod code_runner;
pub mod data_analyzer;
pub mod executor;
pub mod file_processor;
pub mod network;
pub mod planner;
pub mod system_operator;
pub mod task;
pub mod tool;

pub use agent::AgentContainer;
pub use app::AppState;
pub use auth::{AuthContainer, AuthState};
pub use code_runner::{CodeExecutionRequest, CodeRunnerContainer};
pub use data_analyzer::DataAnalyzerContainer;
pub use executor::ExecutorContainer;
pub use file_processor::{BatchRequest, FileProcessorContainer};
pub use network::NetworkContainer;
pub use planner::PlannerContainer;
pub use system_operator::SystemOperatorContainer;
pub use task::TaskContainer;
pub use tool::ToolContainer;
