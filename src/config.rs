//! Known Python release universe
//!
//! Range expressions only make sense against a universe of versions that
//! exist: `>=3.6` says nothing about where the 3.x series ends. The codecs
//! take that universe as a parameter; this module builds the default one.

use crate::version::types::{SortedVersionList, Version};

// =============================================================================
// Release series constants
// =============================================================================

/// Final minor release of the Python 2 series
pub const MAX_PYTHON_2_MINOR: u32 = 7;

/// Newest Python 3 minor release assumed to exist when the caller
/// does not override it
pub const DEFAULT_MAX_PYTHON_3_MINOR: u32 = 13;

/// Enumerate every known Python release up to the given 3.x minor:
/// `2.0` through `2.7` plus `3.0` through `3.<max>`, ascending.
pub fn known_python_versions(max_python_3_minor: u32) -> SortedVersionList {
    let python_2 = (0..=MAX_PYTHON_2_MINOR).map(|minor| Version::new(2, minor));
    let python_3 = (0..=max_python_3_minor).map(|minor| Version::new(3, minor));
    python_2.chain(python_3).collect()
}

/// The universe implied by [`DEFAULT_MAX_PYTHON_3_MINOR`].
pub fn default_known_versions() -> SortedVersionList {
    known_python_versions(DEFAULT_MAX_PYTHON_3_MINOR)
}
