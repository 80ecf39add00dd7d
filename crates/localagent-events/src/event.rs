//! Typed server events and their `{type, data}` wire format.

use localagent_types::system::SystemMetrics;
use localagent_types::{AgentStatus, TaskStatus};
use serde_json::Value;

use crate::error::{EventsError, Result};

/// A push event from the backend. Unknown types pass through as
/// [`ServerEvent::Other`] so new backend event kinds never break the
/// stream.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    TaskUpdate {
        id: String,
        status: TaskStatus,
        progress: Option<f64>,
    },
    AgentUpdate {
        id: String,
        status: AgentStatus,
    },
    SystemEvent {
        level: String,
        message: String,
    },
    Metrics(SystemMetrics),
    ExecutionLog {
        execution_id: String,
        line: String,
    },
    Other {
        kind: String,
        data: Value,
    },
}

/// Parses one text frame. Frames without a string `type` field are
/// protocol errors; a known type with a malformed `data` payload is too.
pub fn parse_server_event(text: &str) -> Result<ServerEvent> {
    let value: Value = serde_json::from_str(text)?;
    let object = value
        .as_object()
        .ok_or_else(|| EventsError::Protocol("expected JSON object event".to_string()))?;

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| EventsError::Protocol("missing event type".to_string()))?;
    let data = object.get("data").cloned().unwrap_or(Value::Null);

    match kind {
        "task_update" => {
            let id = require_str(&data, "id", "task_update")?;
            let status: TaskStatus = field(&data, "status", "task_update")?;
            let progress = data.get("progress").and_then(Value::as_f64);
            Ok(ServerEvent::TaskUpdate {
                id,
                status,
                progress,
            })
        }
        "agent_update" => {
            let id = require_str(&data, "id", "agent_update")?;
            let status: AgentStatus = field(&data, "status", "agent_update")?;
            Ok(ServerEvent::AgentUpdate { id, status })
        }
        "system_event" => {
            let level = require_str(&data, "level", "system_event")?;
            let message = require_str(&data, "message", "system_event")?;
            Ok(ServerEvent::SystemEvent { level, message })
        }
        "metrics" => {
            let metrics: SystemMetrics = serde_json::from_value(data).map_err(|error| {
                EventsError::Protocol(format!("invalid metrics payload: {error}"))
            })?;
            Ok(ServerEvent::Metrics(metrics))
        }
        "execution_log" => {
            let execution_id = require_str(&data, "execution_id", "execution_log")?;
            let line = require_str(&data, "line", "execution_log")?;
            Ok(ServerEvent::ExecutionLog { execution_id, line })
        }
        _ => Ok(ServerEvent::Other {
            kind: kind.to_string(),
            data,
        }),
    }
}

fn require_str(data: &Value, key: &str, kind: &str) -> Result<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EventsError::Protocol(format!("invalid {kind} {key}")))
}

fn field<T: serde::de::DeserializeOwned>(data: &Value, key: &str, kind: &str) -> Result<T> {
    let value = data
        .get(key)
        .cloned()
        .ok_or_else(|| EventsError::Protocol(format!("invalid {kind} {key}")))?;
    serde_json::from_value(value)
        .map_err(|error| EventsError::Protocol(format!("invalid {kind} {key}: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_known_event_kinds() -> Result<()> {
        let event = parse_server_event(
            r#"{"type":"task_update","data":{"id":"t1","status":"running","progress":0.5}}"#,
        )?;
        match event {
            ServerEvent::TaskUpdate {
                id,
                status,
                progress,
            } => {
                assert_eq!(id, "t1");
                assert_eq!(status, TaskStatus::Running);
                assert_eq!(progress, Some(0.5));
            }
            other => return Err(EventsError::Protocol(format!("wrong variant: {other:?}"))),
        }

        let event =
            parse_server_event(r#"{"type":"agent_update","data":{"id":"a1","status":"busy"}}"#)?;
        match event {
            ServerEvent::AgentUpdate { id, status } => {
                assert_eq!(id, "a1");
                assert_eq!(status, AgentStatus::Busy);
            }
            other => return Err(EventsError::Protocol(format!("wrong variant: {other:?}"))),
        }

        let event = parse_server_event(
            r#"{"type":"metrics","data":{"cpuUsage":0.2,"memoryUsage":0.4,"diskUsage":0.6}}"#,
        )?;
        match event {
            ServerEvent::Metrics(metrics) => assert_eq!(metrics.cpu_usage, 0.2),
            other => return Err(EventsError::Protocol(format!("wrong variant: {other:?}"))),
        }

        let event = parse_server_event(
            r#"{"type":"execution_log","data":{"execution_id":"e1","line":"started"}}"#,
        )?;
        match event {
            ServerEvent::ExecutionLog { execution_id, line } => {
                assert_eq!(execution_id, "e1");
                assert_eq!(line, "started");
            }
            other => return Err(EventsError::Protocol(format!("wrong variant: {other:?}"))),
        }

        Ok(())
    }

    #[test]
    fn unknown_event_kind_passes_through() -> Result<()> {
        let event = parse_server_event(r#"{"type":"deploy_started","data":{"version":"1.2"}}"#)?;
        match event {
            ServerEvent::Other { kind, data } => {
                assert_eq!(kind, "deploy_started");
                assert_eq!(data["version"], "1.2");
            }
            other => return Err(EventsError::Protocol(format!("wrong variant: {other:?}"))),
        }
        Ok(())
    }

    #[test]
    fn parse_malformed_frames() {
        struct Case {
            name: &'static str,
            input: &'static str,
            expected_error_fragment: &'static str,
        }

        let cases = vec![
            Case {
                name: "non-object payload",
                input: r#"["task_update"]"#,
                expected_error_fragment: "expected JSON object event",
            },
            Case {
                name: "missing type",
                input: r#"{"data":{}}"#,
                expected_error_fragment: "missing event type",
            },
            Case {
                name: "type is not a string",
                input: r#"{"type":42,"data":{}}"#,
                expected_error_fragment: "missing event type",
            },
            Case {
                name: "task update without id",
                input: r#"{"type":"task_update","data":{"status":"running"}}"#,
                expected_error_fragment: "invalid task_update id",
            },
            Case {
                name: "task update with unknown status",
                input: r#"{"type":"task_update","data":{"id":"t1","status":"exploded"}}"#,
                expected_error_fragment: "invalid task_update status",
            },
            Case {
                name: "agent update without status",
                input: r#"{"type":"agent_update","data":{"id":"a1"}}"#,
                expected_error_fragment: "invalid agent_update status",
            },
            Case {
                name: "metrics with wrong shape",
                input: r#"{"type":"metrics","data":{"cpuUsage":"high"}}"#,
                expected_error_fragment: "invalid metrics payload",
            },
            Case {
                name: "execution log without line",
                input: r#"{"type":"execution_log","data":{"execution_id":"e1"}}"#,
                expected_error_fragment: "invalid execution_log line",
            },
        ];

        for case in cases {
            let result = parse_server_event(case.input);
            assert!(result.is_err(), "{}: expected an error", case.name);

            if let Err(error) = result {
                let rendered = error.to_string();
                assert!(
                    rendered.contains(case.expected_error_fragment),
                    "{}: expected error fragment '{}' in '{}'",
                    case.name,
                    case.expected_error_fragment,
                    rendered
                );
            }
        }
    }
}
