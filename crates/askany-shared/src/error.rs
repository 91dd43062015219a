use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid session slug: {0:?}")]
    InvalidSlug(String),

    #[error("Invalid question id: {0:?}")]
    InvalidQuestionId(String),

    #[error("Unknown session mode: {0:?} (expected \"normal\" or \"spotlight\")")]
    InvalidMode(String),
}
