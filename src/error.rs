//! Error types with fix suggestions (v0.1)
//!
//! Two failure kinds reach the host:
//! - [`EngineError`] / [`ActionError::Transport`]: the engine call did not complete
//! - [`ActionError::Domain`]: the engine completed and reported a failure

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Failure to complete the engine call (no structured result).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to spawn '{bin}': {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{bin} exited with {code}: {stderr}")]
    Exit {
        bin: String,
        code: String,
        stderr: String,
    },

    #[error("malformed engine response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Opaque transport error (network, RPC, test doubles)
    #[error("{0}")]
    Transport(String),
}

/// Failure writing to the CI host.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to write output '{key}': {source}")]
    Output {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ActionError {
    /// Message is the engine error verbatim, matching the `error` output.
    #[error("{0}")]
    Transport(#[from] EngineError),

    #[error("{0}")]
    Domain(String),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Config error: {0}")]
    Config(String),
}

impl FixSuggestion for ActionError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ActionError::Transport(EngineError::Spawn { .. }) => {
                Some("Install the atlas CLI or point --atlas-bin / ATLAS_ACTION_BIN at it")
            }
            ActionError::Transport(EngineError::Exit { .. }) => {
                Some("Check the url, dir and config inputs passed to the action")
            }
            ActionError::Transport(EngineError::Decode(_)) => {
                Some("Upgrade atlas to a version supporting --format '{{ json . }}'")
            }
            ActionError::Transport(EngineError::DeadlineExceeded) => {
                Some("Raise --timeout or ATLAS_ACTION_TIMEOUT")
            }
            ActionError::Transport(_) => None,
            ActionError::Domain(_) => {
                Some("Inspect the migration directory and the target schema revision table")
            }
            ActionError::Host(_) => Some("Check that GITHUB_OUTPUT points to a writable file"),
            ActionError::Config(_) => Some("Check ATLAS_ACTION_* environment variables"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display_is_engine_message() {
        let err = ActionError::from(EngineError::Transport("connection refused".into()));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn domain_display_is_message() {
        let err = ActionError::Domain("checksum mismatch".into());
        assert_eq!(err.to_string(), "checksum mismatch");
    }

    #[test]
    fn config_error_has_fix() {
        let err = ActionError::Config("bad timeout".into());
        assert_eq!(err.to_string(), "Config error: bad timeout");
        assert!(err.fix_suggestion().is_some());
    }

    #[test]
    fn cancellation_messages() {
        assert_eq!(EngineError::Cancelled.to_string(), "context canceled");
        assert_eq!(
            EngineError::DeadlineExceeded.to_string(),
            "context deadline exceeded"
        );
    }
}
