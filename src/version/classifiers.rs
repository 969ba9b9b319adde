//! Trove classifier codec
//!
//! Declarations of the form `Programming Language :: Python :: 3.10`,
//! one supported version per classifier. Lines that do not carry a
//! version (framework tags, implementation tags) are passed through
//! untouched and never treated as errors.

use crate::version::types::{SortedVersionList, Version, sorted_versions};

/// Prefix shared by all version classifiers
pub const CLASSIFIER_PREFIX: &str = "Programming Language :: Python :: ";

/// Extract the version from a single classifier, if it carries one.
///
/// A trailing ` :: Only` marker is stripped before parsing.
fn classifier_version(classifier: &str) -> Option<Version> {
    let suffix = classifier.strip_prefix(CLASSIFIER_PREFIX)?;
    let suffix = suffix.strip_suffix(" :: Only").unwrap_or(suffix);
    suffix.trim().parse().ok()
}

/// Whether a classifier is a version declaration, including forms such as
/// a bare major that carry no parseable `major.minor` version.
fn is_version_classifier(classifier: &str) -> bool {
    classifier
        .strip_prefix(CLASSIFIER_PREFIX)
        .is_some_and(|suffix| suffix.starts_with(|c: char| c.is_ascii_digit()))
}

/// Decode a classifier list into the versions it declares, ascending.
pub fn get_versions_from_classifiers<'a>(
    classifiers: impl IntoIterator<Item = &'a str>,
) -> SortedVersionList {
    sorted_versions(classifiers.into_iter().filter_map(classifier_version))
}

/// Encode a version list as classifiers, one per version, ascending.
pub fn version_classifiers(versions: &[Version]) -> Vec<String> {
    versions
        .iter()
        .map(|version| format!("{CLASSIFIER_PREFIX}{version}"))
        .collect()
}

/// Replace the version classifiers in an existing list with a new set.
///
/// The new classifiers are spliced in at the position of the first
/// existing version classifier (appended when there is none); everything
/// else keeps its place and order.
pub fn update_classifiers(classifiers: &[String], new_versions: &[Version]) -> Vec<String> {
    let position = classifiers
        .iter()
        .position(|classifier| is_version_classifier(classifier))
        .unwrap_or(classifiers.len());

    let mut result: Vec<String> = classifiers[..position].to_vec();
    result.extend(version_classifiers(new_versions));
    result.extend(
        classifiers[position..]
            .iter()
            .filter(|classifier| !is_version_classifier(classifier))
            .cloned(),
    );
    result
}
