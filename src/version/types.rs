//! Python version value type

use std::fmt;
use std::str::FromStr;

use crate::version::error::VersionError;

/// A single Python release, `major.minor` with an optional micro part.
///
/// Ordering is lexicographic over (major, minor, micro); a missing micro
/// sorts below any explicit one, so `3.6` < `3.6.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: Option<u32>,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            micro: None,
        }
    }

    /// Whether this version belongs to the given `major.minor` series,
    /// ignoring the micro part.
    pub fn in_series(&self, series: &Version) -> bool {
        self.major == series.major && self.minor == series.minor
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| VersionError::Invalid(s.to_string()))
        };
        let parts: Vec<&str> = s.split('.').collect();
        let (major, minor, micro) = match parts.as_slice() {
            [major, minor] => (*major, *minor, None),
            [major, minor, micro] => (*major, *minor, Some(*micro)),
            _ => return Err(VersionError::Invalid(s.to_string())),
        };
        Ok(Self {
            major: parse(major)?,
            minor: parse(minor)?,
            micro: micro.map(parse).transpose()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(micro) = self.micro {
            write!(f, ".{micro}")?;
        }
        Ok(())
    }
}

/// Ascending list of versions without duplicates; the canonical
/// intermediate representation between all codecs.
pub type SortedVersionList = Vec<Version>;

/// Normalize any collection of versions into a `SortedVersionList`.
pub fn sorted_versions(versions: impl IntoIterator<Item = Version>) -> SortedVersionList {
    let mut list: Vec<Version> = versions.into_iter().collect();
    list.sort();
    list.dedup();
    list
}
