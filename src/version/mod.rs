//! Version layer
//! - types.rs: Version value type and SortedVersionList
//! - classifiers.rs: trove classifier codec
//! - requires.rs: requires-python range expression codec
//! - error.rs: error types for parsing versions and range expressions

pub mod classifiers;
pub mod error;
pub mod requires;
pub mod types;

pub use classifiers::{get_versions_from_classifiers, update_classifiers, version_classifiers};
pub use error::{RequiresError, VersionError};
pub use requires::{Style, compute_python_requires, parse_python_requires};
pub use types::{SortedVersionList, Version, sorted_versions};
