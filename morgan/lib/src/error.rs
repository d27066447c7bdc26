//! Error types for the ways that building a graph can fail.  Ranking itself never fails.

use std::fmt::{Display, Formatter};

/// Alias for `Result<T, morgan::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The ways that a [`SimpleGraph`](crate::SimpleGraph) can refuse a modification.  Node IDs are
/// stored in their `Debug` representation, so that `Error` doesn't need to be generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An atom was added with an ID which is already taken
    DuplicateNode(String),
    /// A bond refers to an atom which doesn't exist
    UnknownNode(String),
    /// A bond tried to join an atom to itself
    SelfLoop(String),
    /// A bond was added between two atoms which are already bonded
    DuplicateBond(String, String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateNode(id) => write!(f, "Atom {} is defined twice", id),
            Error::UnknownNode(id) => write!(f, "Bond refers to undefined atom {}", id),
            Error::SelfLoop(id) => write!(f, "Atom {} can't be bonded to itself", id),
            Error::DuplicateBond(a, b) => {
                write!(f, "Atoms {} and {} are bonded more than once", a, b)
            }
        }
    }
}

impl std::error::Error for Error {}
