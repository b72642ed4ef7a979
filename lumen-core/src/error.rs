/// Error types for the fallible corners of the core
use thiserror::Error;

use crate::stack::MatrixMode;

/// Failure of a checked matrix operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("matrix is singular (determinant is zero)")]
    Singular,
}

/// Misuse of a [`TransformStack`](crate::stack::TransformStack).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("invalid matrix mode: {0}")]
    InvalidMode(String),
    #[error("cannot pop the {0} stack: no saved matrix")]
    StackUnderflow(MatrixMode),
}

/// Failure while reading a Wavefront OBJ document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: vertex index {index} is out of range")]
    IndexOutOfRange { line: usize, index: i64 },
}
