use crate::commands::dev::sync::ReloadOutcome;
use thiserror::Error;

/// Failures surfaced by the developer toolkit.
///
/// Every variant is rendered to the invoker through [`DevError::user_message`];
/// none of them are allowed to escape the dispatch boundary.
#[derive(Debug, Error)]
pub enum DevError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{failed} of {attempted} reloads failed: {}", .names.join(", "))]
    PartialReload {
        attempted: usize,
        failed: usize,
        names: Vec<String>,
        outcomes: Vec<ReloadOutcome>,
    },

    #[error("remote sync failed during {stage}: {message}")]
    RemoteSync { stage: &'static str, message: String },

    #[error("duplicate command names remain after retry: {}", .0.join(", "))]
    DuplicateDetected(Vec<String>),

    #[error("the bot is still starting up")]
    NotReady,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl DevError {
    /// `PartialReload` built from the per-cog outcomes, or `None` when
    /// every cog reloaded.
    pub fn partial_reload(outcomes: Vec<ReloadOutcome>) -> Option<Self> {
        let names: Vec<String> = outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.name.clone())
            .collect();
        if names.is_empty() {
            return None;
        }
        Some(DevError::PartialReload {
            attempted: outcomes.len(),
            failed: names.len(),
            names,
            outcomes,
        })
    }

    pub fn remote(stage: &'static str, err: anyhow::Error) -> Self {
        DevError::RemoteSync {
            stage,
            message: format!("{:#}", err),
        }
    }

    /// Short tag used in logs and history.
    pub fn kind(&self) -> &'static str {
        match self {
            DevError::Configuration(_) => "ConfigurationError",
            DevError::PermissionDenied(_) => "PermissionDenied",
            DevError::PartialReload { .. } => "PartialReloadFailure",
            DevError::RemoteSync { .. } => "RemoteSyncFailure",
            DevError::DuplicateDetected(_) => "DuplicateDetected",
            DevError::NotReady => "NotReady",
            DevError::InvalidArgument(_) => "InvalidArgument",
            DevError::Unknown(_) => "UnknownError",
        }
    }

    /// Text shown to the operator. Unexpected errors only carry their raw
    /// message when the bot runs in development mode.
    pub fn user_message(&self, dev_mode: bool) -> String {
        match self {
            DevError::Configuration(msg) => format!("Configuration problem: {}", msg),
            DevError::PermissionDenied(msg) => msg.clone(),
            DevError::PartialReload { .. }
            | DevError::RemoteSync { .. }
            | DevError::DuplicateDetected(_)
            | DevError::InvalidArgument(_) => self.to_string(),
            DevError::NotReady => "The bot is still starting up, please wait a moment.\n\
                 `sync` and `status` are available during startup."
                .to_string(),
            DevError::Unknown(err) => {
                if dev_mode {
                    format!("Unexpected error: {:?}", err)
                } else {
                    "An unexpected error occurred, please try again.".to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_error_hides_details_in_production() {
        let err = DevError::from(anyhow::anyhow!("socket exploded"));
        assert!(!err.user_message(false).contains("socket exploded"));
        assert!(err.user_message(true).contains("socket exploded"));
        assert_eq!(err.kind(), "UnknownError");
    }

    #[test]
    fn partial_reload_lists_failed_names() {
        let outcome = |name: &str, success: bool| ReloadOutcome {
            name: name.to_string(),
            success,
            error: (!success).then(|| "boom".to_string()),
        };
        let err = DevError::partial_reload(vec![
            outcome("general", true),
            outcome("fun", false),
            outcome("dev", true),
        ])
        .unwrap();
        assert_eq!(err.user_message(false), "1 of 3 reloads failed: fun");
        assert!(DevError::partial_reload(vec![outcome("general", true)]).is_none());
    }

    #[test]
    fn remote_keeps_the_error_chain() {
        let inner = anyhow::anyhow!("503").context("PUT commands");
        let err = DevError::remote("submit", inner);
        assert_eq!(
            err.to_string(),
            "remote sync failed during submit: PUT commands: 503"
        );
    }
}
