//! Error types shared by the expression tree and the filter algebra.

/// Result type for tree and projection operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input string violates the infix grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The projection replacement map has no entry for a key in the tree.
    #[error("no replacement for key {0:?}")]
    MissingReplacement(String),

    /// `group`/`break_group` found no group whose key set covers the request.
    #[error("no group encloses keys [{0}]")]
    NoEnclosingGroup(String),

    /// `break_group` targeted the root group, which has no parent to splice into.
    #[error("cannot dissolve the root group")]
    RootGroup,

    /// `break_group` targeted a negated group; splicing its members into the
    /// parent would drop the negation and change the expression's meaning.
    #[error("cannot dissolve a negated group")]
    NegatedGroup,

    /// The keys setter was asked to insert a new key whose placement relative
    /// to the tree's negation is ambiguous.
    #[error("ambiguous placement for new key {0:?} in a negated expression")]
    AmbiguousInsert(String),
}
