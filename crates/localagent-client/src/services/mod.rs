//! One thin wrapper per backend resource. No logic here: path helpers,
//! request bodies, typed responses.

pub mod agents;
pub mod auth;
pub mod code_runner;
pub mod data_analyzer;
pub mod executor;
pub mod file_processor;
pub mod network;
pub mod planner;
pub mod system;
pub mod system_operator;
pub mod tasks;
pub mod tools;

pub use agents::AgentService;
pub use auth::AuthService;
pub use code_runner::CodeRunnerService;
pub use data_analyzer::DataAnalyzerService;
pub use executor::ExecutorService;
pub use file_processor::FileProcessorService;
pub use network::NetworkService;
pub use planner::PlannerService;
pub use system::SystemService;
pub use system_operator::SystemOperatorService;
pub use tasks::TaskService;
pub use tools::ToolService;

/// Builds a `?key=value&...` suffix, empty when there are no pairs.
pub(crate) fn query_suffix(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    format!("?{}", serializer.finish())
}

/// Wire label of a unit enum variant, as serde would encode it.
pub(crate) fn wire_label<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_suffix_is_empty_without_pairs() {
        assert_eq!(query_suffix(&[]), "");
    }

    #[test]
    fn query_suffix_percent_encodes_values() {
        let suffix = query_suffix(&[
            ("search", "needs encoding".to_string()),
            ("status", "pending".to_string()),
        ]);
        assert_eq!(suffix, "?search=needs+encoding&status=pending");
    }
}
