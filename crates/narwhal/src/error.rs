#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input; `element` names the offending node, edge or box.
    #[error("precondition violated at {element}: {reason}")]
    PreconditionViolation { element: String, reason: String },
    #[error("unsupported configuration: {reason}")]
    UnsupportedConfiguration { reason: String },
    #[error("layout cancelled before {phase}")]
    Cancelled { phase: &'static str },
}

impl Error {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Error::UnsupportedConfiguration {
            reason: reason.into(),
        }
    }
}

impl From<narwhal_graph::Error> for Error {
    fn from(err: narwhal_graph::Error) -> Self {
        Error::PreconditionViolation {
            element: err.element(),
            reason: err.to_string(),
        }
    }
}

impl From<narwhal_compaction::Error> for Error {
    fn from(err: narwhal_compaction::Error) -> Self {
        match err {
            narwhal_compaction::Error::PreconditionViolation { element, reason } => {
                Error::PreconditionViolation { element, reason }
            }
            narwhal_compaction::Error::UnsupportedConfiguration { reason } => {
                Error::UnsupportedConfiguration { reason }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
