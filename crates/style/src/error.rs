use dom::NodeId;
use thiserror::Error;

/// Reasons a style computation can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("node {0} does not exist in this document")]
    UnknownNode(NodeId),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
}
