//! requires-python range expression codec
//!
//! Translates compact constraint expressions into explicit version lists
//! and back. An expression is one lower bound plus zero or more exclusions:
//!
//! ```text
//! >=2.7,!=3.0.*,!=3.1.*
//! ```
//!
//! Expansion needs a caller-supplied universe of versions known to exist,
//! since `>=3.6` alone does not say where the series ends.

use std::sync::LazyLock;

use regex::Regex;

use crate::version::error::RequiresError;
use crate::version::types::{SortedVersionList, Version, sorted_versions};

/// Matches one clause: `>=` or `!=`, optional space, a version,
/// and an optional `.*` wildcard suffix.
static SPECIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(>=|!=)\s*(\d+(?:\.\d+){1,2})(\.\*)?$").unwrap());

/// Separator and operator spacing conventions of a range expression.
///
/// Derived once from the existing text at the editor boundary and threaded
/// through encoding, so a rewrite that does not change the version set
/// reproduces the original text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Clause separator, `","` or `", "`
    pub comma: String,
    /// Spacing after `>=` and `!=`, `""` or `" "`
    pub space: String,
}

impl Style {
    /// Infer both conventions from existing expression text.
    ///
    /// The two heuristics are independent and fall back to their own
    /// defaults when they disagree.
    pub fn detect(expression: &str) -> Self {
        let comma = if expression.contains(',') && !expression.contains(", ") {
            ","
        } else {
            ", "
        };
        let space = if expression.contains("> ") || expression.contains("= ") {
            " "
        } else {
            ""
        };
        Self {
            comma: comma.to_string(),
            space: space.to_string(),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            comma: ", ".to_string(),
            space: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Exclusion {
    version: Version,
    wildcard: bool,
}

impl Exclusion {
    fn matches(&self, version: &Version) -> bool {
        if self.wildcard {
            version.in_series(&self.version)
        } else {
            *version == self.version
        }
    }
}

/// Expand a requires-python expression into the explicit list of known
/// versions it admits, ascending.
///
/// Multiple lower bounds intersect; the highest one wins. Anything other
/// than `>=` and `!=` clauses is rejected.
pub fn parse_python_requires(
    expression: &str,
    known: &[Version],
) -> Result<SortedVersionList, RequiresError> {
    if expression.contains('\n') {
        return Err(RequiresError::MultiLine);
    }

    let mut lower_bound: Option<Version> = None;
    let mut exclusions: Vec<Exclusion> = Vec::new();

    for clause in expression.split(',').map(str::trim) {
        let Some(caps) = SPECIFIER_RE.captures(clause) else {
            return Err(RequiresError::UnsupportedSpecifier(clause.to_string()));
        };
        let version: Version = caps[2].parse()?;
        let wildcard = caps.get(3).is_some();
        match &caps[1] {
            ">=" if wildcard => {
                return Err(RequiresError::UnsupportedSpecifier(clause.to_string()));
            }
            ">=" => {
                lower_bound = Some(lower_bound.map_or(version, |bound| bound.max(version)));
            }
            _ => exclusions.push(Exclusion { version, wildcard }),
        }
    }

    let Some(lower_bound) = lower_bound else {
        return Err(RequiresError::MissingLowerBound(expression.to_string()));
    };

    Ok(sorted_versions(known.iter().copied().filter(|version| {
        *version >= lower_bound && !exclusions.iter().any(|excl| excl.matches(version))
    })))
}

/// Encode an explicit version list back into a range expression.
///
/// Emits `>=` for the first version and a wildcard `!=` for every known
/// version above it that is absent from the list, ascending. The input
/// must not be empty; an empty list encodes as an empty string, which no
/// caller should ever ask for.
pub fn compute_python_requires(versions: &[Version], known: &[Version], style: &Style) -> String {
    let Some(first) = versions.iter().min() else {
        return String::new();
    };
    let Style { comma, space } = style;

    let mut specifiers = vec![format!(">={space}{first}")];
    for version in sorted_versions(known.iter().copied()) {
        if version >= *first && !versions.contains(&version) {
            specifiers.push(format!("!={space}{version}.*"));
        }
    }
    specifiers.join(comma.as_str())
}
