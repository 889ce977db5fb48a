//! Error type shared by actions and runners.

use thiserror::Error;

/// Errors returned from [`Action::run`](crate::Action::run).
///
/// Every variant except [`ActionError::SkipRemainder`] is a genuine failure
/// and is surfaced to the caller of a composition. The sentinel is consumed
/// by the runner that observes it.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ActionError {
    /// Stop starting further sibling actions. Not a failure: a composition
    /// that stops because of it reports success.
    #[error("skip remainder")]
    SkipRemainder,

    /// A child action failed. Added by runners so the caller can tell
    /// which child produced the error.
    #[error("action {action} failed: {source}")]
    Failed {
        /// Name of the child action.
        action: String,
        /// The error the child returned.
        #[source]
        source: Box<ActionError>,
    },

    /// A child task panicked or was aborted before returning.
    #[error("action {action} panicked: {message}")]
    Panicked {
        /// Name of the child action.
        action: String,
        /// Panic payload or join error text.
        message: String,
    },

    /// The action gave up because its execution context was canceled.
    #[error("cancelled")]
    Cancelled,

    /// Plain failure text.
    #[error("{0}")]
    Message(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    /// Build a [`ActionError::Message`] from anything string-like.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap `self` with the name of the action that returned it.
    pub fn in_action(self, action: impl Into<String>) -> Self {
        Self::Failed {
            action: action.into(),
            source: Box::new(self),
        }
    }

    /// True for the skip-remainder sentinel only.
    pub fn is_skip_remainder(&self) -> bool {
        matches!(self, Self::SkipRemainder)
    }

    /// The innermost error underneath any [`ActionError::Failed`] wrappers.
    ///
    /// Compare against this rather than the top-level error: nesting depth
    /// depends on how deep the failing action sits in the composition.
    pub fn root(&self) -> &ActionError {
        let mut current = self;
        while let Self::Failed { source, .. } = current {
            current = source;
        }
        current
    }

    /// Name of the outermost failing action, if the error was wrapped.
    pub fn action(&self) -> Option<&str> {
        match self {
            Self::Failed { action, .. } | Self::Panicked { action, .. } => Some(action),
            _ => None,
        }
    }

    /// Names of the failing actions from outermost to innermost.
    pub fn chain(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self;
        loop {
            match current {
                Self::Failed { action, source } => {
                    names.push(action.as_str());
                    current = source;
                }
                Self::Panicked { action, .. } => {
                    names.push(action.as_str());
                    break;
                }
                _ => break,
            }
        }
        names
    }
}
