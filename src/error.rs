//! Error types for the PointsBuilder engine.
//!
//! Evaluation and emission never fail. Errors only come from edits that
//! address something that is not there, or from parameter writes whose
//! key or type is not declared by the node's kind.

use thiserror::Error;

use crate::node::NodeId;
use crate::params::ParamKind;

/// Errors from writing a parameter by name.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// The node kind declares no parameter with this key.
    #[error("unknown parameter `{0}`")]
    UnknownKey(String),
    /// The value does not fit the declared parameter type.
    #[error("parameter `{key}` expects {expected}")]
    TypeMismatch { key: String, expected: ParamKind },
}

/// Errors from structural tree edits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),
    #[error("node {0} cannot hold children")]
    NotAContainer(NodeId),
    #[error("node {0} has no Fourier terms")]
    NoTerms(NodeId),
    #[error("cannot move node {0} into its own subtree")]
    MoveIntoSelf(NodeId),
    #[error("index {index} is out of range for a list of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Param(#[from] ParamError),
}
