use thiserror::Error;

/// Failure taxonomy of the state layer. Submission failures come from
/// starting a job, poll failures from tracking one, action failures from
/// every other backend call, auth failures from the session flow.
#[derive(Debug, Clone, Error)]
pub enum StateError {
    #[error("submission_failed:{message}")]
    Submission { message: String },
    #[error("poll_failed:{id}:{message}")]
    Poll { id: String, message: String },
    #[error("action_failed:{message}")]
    Action { message: String },
    #[error("auth_failed:{message}")]
    Auth { message: String },
}

impl StateError {
    pub(crate) fn submission(error: impl std::fmt::Display) -> Self {
        Self::Submission {
            message: error.to_string(),
        }
    }

    pub(crate) fn poll(id: &str, error: impl std::fmt::Display) -> Self {
        Self::Poll {
            id: id.to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn action(error: impl std::fmt::Display) -> Self {
        Self::Action {
            message: error.to_string(),
        }
    }

    pub(crate) fn auth(error: impl std::fmt::Display) -> Self {
        Self::Auth {
            message: error.to_string(),
        }
    }
}
