#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("precondition violated at {element}: {reason}")]
    PreconditionViolation { element: String, reason: String },
    #[error("unsupported configuration: {reason}")]
    UnsupportedConfiguration { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
