//! Error types for Queryflow

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A plan step names an agent nobody registered. Never retried:
    /// retrying cannot make the name appear.
    #[error("agent not registered: {0}")]
    UnknownAgent(String),

    /// An agent invocation failed. The controller retries these up to the
    /// step's configured budget before propagating.
    #[error("agent failed: {agent} - {message}")]
    AgentFailed { agent: String, message: String },

    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("plan source not found: {0}")]
    SourceNotFound(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn agent_failed(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AgentFailed {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Whether the controller may retry the step that produced this error.
    /// Only collaborator failures are retryable; name-resolution and
    /// configuration errors are fatal immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AgentFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_agent_failures_are_retryable() {
        assert!(Error::agent_failed("execute_sql", "locked").is_retryable());
        assert!(!Error::UnknownAgent("ghost".to_string()).is_retryable());
        assert!(!Error::PlanNotFound("p".to_string()).is_retryable());
        assert!(!Error::SourceNotFound("plans.yaml".to_string()).is_retryable());
        assert!(!Error::ConfigError("bad settings".to_string()).is_retryable());
    }
}
