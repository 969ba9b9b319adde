use thiserror::Error;

/// Error type for version string parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version: {0:?}")]
    Invalid(String),
}

/// Error type for requires-python range expressions.
///
/// These indicate a malformed expression rather than user data variance,
/// so they propagate to the caller instead of being downgraded to a warning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequiresError {
    #[error("Expression spans multiple lines")]
    MultiLine,

    #[error("No lower bound in {0:?}")]
    MissingLowerBound(String),

    #[error("Unsupported specifier: {0:?}")]
    UnsupportedSpecifier(String),

    #[error(transparent)]
    Version(#[from] VersionError),
}
