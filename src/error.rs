use dom::NodeId;
use style::StyleError;
use thiserror::Error;

/// Errors that abort a scope resolution pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("style engine failure: {0}")]
    Engine(#[from] StyleError),
    #[error("style block node {0} is no longer in the document")]
    MissingNode(NodeId),
    #[error("style block {0} was never backed up")]
    MissingBackup(usize),
    #[error("no style block with index {0}")]
    UnknownBlock(usize),
    #[error("snapshot for {found} reached element {expected}")]
    SnapshotMismatch { expected: NodeId, found: NodeId },
}

pub type Result<T, E = ScopeError> = std::result::Result<T, E>;
