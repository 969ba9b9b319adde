//! pyproject.toml version declarations
//!
//! There are two ways a pyproject.toml declares supported Python versions:
//! classifiers like
//!
//! ```text
//! Programming Language :: Python :: 3.8
//! ```
//!
//! and a requires-python range expression. Where those live depends on the
//! packaging convention: poetry keeps them under `[tool.poetry]`, setuptools
//! and flit use the `[project]` table. Both declaration styles and all three
//! conventions are supported.
//!
//! Updates never touch the file; they return the rewritten document as
//! lines and leave persistence to the caller.

use thiserror::Error;
use toml_edit::{Array, Item, Value};
use tracing::warn;

use crate::document::{Document, DocumentError};
use crate::version::classifiers::{get_versions_from_classifiers, update_classifiers};
use crate::version::error::RequiresError;
use crate::version::requires::{Style, compute_python_requires, parse_python_requires};
use crate::version::types::{SortedVersionList, Version};

const POETRY_CLASSIFIERS: &[&str] = &["tool", "poetry", "classifiers"];
const PROJECT_CLASSIFIERS: &[&str] = &["project", "classifiers"];
const POETRY_PYTHON: &[&str] = &["tool", "poetry", "dependencies", "python"];
const PROJECT_REQUIRES_PYTHON: &[&str] = &["project", "requires-python"];

/// Error type for pyproject.toml operations
#[derive(Debug, Error)]
pub enum PyprojectError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Requires(#[from] RequiresError),
}

/// Whether a build-system field mentions the given convention marker,
/// either in the build-backend string or in any requires entry.
fn build_system_mentions(doc: &Document, marker: &str) -> bool {
    if let Some(backend) = doc
        .get(&["build-system", "build-backend"])
        .and_then(Item::as_str)
        && backend.contains(marker)
    {
        return true;
    }
    if let Some(requires) = doc.get(&["build-system", "requires"]).and_then(Item::as_array) {
        return requires
            .iter()
            .filter_map(Value::as_str)
            .any(|entry| entry.contains(marker));
    }
    false
}

/// Whether the document is governed by poetry.
pub fn is_poetry_toml(doc: &Document) -> bool {
    doc.get(&["tool", "poetry"]).is_some() || build_system_mentions(doc, "poetry")
}

/// Whether the document is governed by setuptools.
pub fn is_setuptools_toml(doc: &Document) -> bool {
    build_system_mentions(doc, "setuptools") || doc.get(&["tool", "setuptools"]).is_some()
}

/// Whether the document is governed by flit.
pub fn is_flit_toml(doc: &Document) -> bool {
    doc.get(&["tool", "flit"]).is_some() || build_system_mentions(doc, "flit")
}

// The detectors are independent: a transitional document can satisfy more
// than one. Field resolution applies them in sequence with the later checks
// winning, so "both poetry and setuptools" reads the [project] table.

fn classifiers_path(doc: &Document) -> Option<&'static [&'static str]> {
    let mut path = None;
    if is_poetry_toml(doc) {
        path = Some(POETRY_CLASSIFIERS);
    }
    if is_setuptools_toml(doc) || is_flit_toml(doc) {
        path = Some(PROJECT_CLASSIFIERS);
    }
    path
}

fn python_requires_path(doc: &Document) -> Option<&'static [&'static str]> {
    let mut path = None;
    if is_poetry_toml(doc) {
        path = Some(POETRY_PYTHON);
    }
    if is_setuptools_toml(doc) || is_flit_toml(doc) {
        path = Some(PROJECT_REQUIRES_PYTHON);
    }
    path
}

/// The string entries of an array item; `None` when the item is not an array.
fn string_array(item: &Item) -> Option<Vec<String>> {
    let array = item.as_array()?;
    Some(
        array
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

/// A string item that fits on one line. Multi-line strings are not a valid
/// carrier for a range expression, so they count as the wrong shape.
fn single_line_str(item: &Item) -> Option<&str> {
    item.as_str().filter(|s| !s.contains('\n'))
}

/// Extract supported Python versions from classifiers in a pyproject.toml.
///
/// Returns an empty list when no classifiers are declared; warns and
/// returns an empty list when the field is present with the wrong shape.
pub fn get_supported_python_versions(content: &str) -> Result<SortedVersionList, PyprojectError> {
    let doc = Document::parse(content)?;
    let Some(path) = classifiers_path(&doc) else {
        return Ok(Vec::new());
    };
    let Some(item) = doc.get(path) else {
        return Ok(Vec::new());
    };
    let Some(classifiers) = string_array(item) else {
        warn!("The value specified for classifiers is not an array");
        return Ok(Vec::new());
    };
    Ok(get_versions_from_classifiers(
        classifiers.iter().map(String::as_str),
    ))
}

/// Extract supported Python versions from the requires-python expression
/// (or poetry's python dependency), expanded against `known`.
///
/// Returns `None` when the field is absent, or (with a diagnostic) when its
/// value is not a single-line string. A malformed expression is a hard
/// error, not user data variance.
pub fn get_python_requires(
    content: &str,
    known: &[Version],
) -> Result<Option<SortedVersionList>, PyprojectError> {
    let doc = Document::parse(content)?;
    let Some(path) = python_requires_path(&doc) else {
        return Ok(None);
    };
    let Some(item) = doc.get(path) else {
        return Ok(None);
    };
    let Some(expression) = single_line_str(item) else {
        warn!("The value specified for python dependency is not a string");
        return Ok(None);
    };
    Ok(Some(parse_python_requires(expression, known)?))
}

/// Update the version classifiers in a pyproject.toml.
///
/// Does not touch the file; returns the rewritten document as lines, or
/// `None` when there is nothing to update.
pub fn update_supported_python_versions(
    content: &str,
    new_versions: &[Version],
) -> Result<Option<Vec<String>>, PyprojectError> {
    let mut doc = Document::parse(content)?;
    let Some(path) = classifiers_path(&doc) else {
        return Ok(None);
    };
    let Some(item) = doc.get(path) else {
        return Ok(None);
    };
    let Some(classifiers) = string_array(item) else {
        warn!("The value specified for classifiers is not an array");
        return Ok(None);
    };
    if classifiers.is_empty() {
        return Ok(None);
    }
    let updated: Array = update_classifiers(&classifiers, new_versions)
        .into_iter()
        .collect();
    doc.set(path, Value::Array(updated))?;
    Ok(Some(doc.to_lines()))
}

/// Update the requires-python expression in a pyproject.toml, if declared,
/// keeping the separator and spacing conventions of the existing value.
///
/// Does not touch the file; returns the rewritten document as lines, or
/// `None` when there is nothing to update.
pub fn update_python_requires(
    content: &str,
    new_versions: &[Version],
    known: &[Version],
) -> Result<Option<Vec<String>>, PyprojectError> {
    let mut doc = Document::parse(content)?;
    let Some(path) = python_requires_path(&doc) else {
        return Ok(None);
    };
    let Some(item) = doc.get(path) else {
        return Ok(None);
    };
    let Some(expression) = single_line_str(item) else {
        warn!("The value specified for python dependency is not a string");
        return Ok(None);
    };
    let style = Style::detect(expression);
    let expression = compute_python_requires(new_versions, known, &style);
    doc.set(path, Value::from(expression))?;
    Ok(Some(doc.to_lines()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::known_python_versions;
    use rstest::rstest;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn v(versions: &[&str]) -> Vec<Version> {
        versions.iter().map(|s| s.parse().unwrap()).collect()
    }

    /// Run a closure with tracing output captured, so tests can assert on
    /// the exact diagnostic wording.
    fn with_captured_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let capture = Capture::default();
        let sink = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let bytes = capture.0.lock().unwrap().clone();
        (result, String::from_utf8(bytes).unwrap())
    }

    const SETUPTOOLS_TOML: &str = "\
[project]
    name='foo'
    classifiers=[
        'Programming Language :: Python :: 2.7',
        'Programming Language :: Python :: 3.6',
        'Programming Language :: Python :: 3.10',
    ]
[build-system]
    requires = [\"setuptools\", \"setuptools-scm\"]
    build-backend = \"setuptools.build_meta\"
";

    const FLIT_TOML: &str = "\
[project]
    name='foo'
    classifiers=[
        'Programming Language :: Python :: 2.7',
        'Programming Language :: Python :: 3.6',
        'Programming Language :: Python :: 3.10',
    ]
[build-system]
    requires = [\"flit_core >=3.2,<4\"]
    build-backend = \"flit_core.buildapi\"
";

    const POETRY_TOML: &str = "\
[tool.poetry]
name = \"foo\"
classifiers = [
    'Programming Language :: Python :: 3.8',
    'Programming Language :: Python :: 3.9',
]

[tool.poetry.dependencies]
python = \">=3.8\"
";

    #[rstest]
    #[case::setuptools(SETUPTOOLS_TOML)]
    #[case::flit(FLIT_TOML)]
    fn get_supported_python_versions_reads_project_classifiers(#[case] content: &str) {
        assert_eq!(
            get_supported_python_versions(content).unwrap(),
            v(&["2.7", "3.6", "3.10"])
        );
    }

    #[test]
    fn get_supported_python_versions_reads_poetry_classifiers() {
        assert_eq!(
            get_supported_python_versions(POETRY_TOML).unwrap(),
            v(&["3.8", "3.9"])
        );
    }

    #[test]
    fn get_supported_python_versions_warns_when_classifiers_not_an_array() {
        let content = "\
[project]
    name='foo'
    classifiers='''
        Programming Language :: Python :: 2.7
        Programming Language :: Python :: 3.6
    '''
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let (result, diagnostics) =
            with_captured_warnings(|| get_supported_python_versions(content).unwrap());
        assert_eq!(result, v(&[]));
        assert!(diagnostics.contains("The value specified for classifiers is not an array"));
    }

    #[test]
    fn get_supported_python_versions_silent_when_classifiers_absent() {
        let content = "\
[project]
    name='foo'
[build-system]
    build-backend = \"flit_core.buildapi\"
";
        let (result, diagnostics) =
            with_captured_warnings(|| get_supported_python_versions(content).unwrap());
        assert_eq!(result, v(&[]));
        assert_eq!(diagnostics, "");
    }

    #[test]
    fn get_supported_python_versions_ignores_unrecognized_documents() {
        // No convention marker anywhere, so no field location is selected.
        let content = "\
[project]
    name='foo'
    classifiers=['Programming Language :: Python :: 3.9']
";
        assert_eq!(get_supported_python_versions(content).unwrap(), v(&[]));
    }

    #[test]
    fn get_supported_python_versions_propagates_load_errors() {
        assert!(matches!(
            get_supported_python_versions("[project\nname='foo'"),
            Err(PyprojectError::Document(DocumentError::Load(_)))
        ));
    }

    #[test]
    fn get_python_requires_expands_against_known_versions() {
        let content = "\
[project]
    name='foo'
    requires-python = \">=3.6\"
[build-system]
    requires = [\"setuptools\", \"setuptools-scm\"]
    build-backend = \"setuptools.build_meta\"
";
        assert_eq!(
            get_python_requires(content, &known_python_versions(7)).unwrap(),
            Some(v(&["3.6", "3.7"]))
        );
        assert_eq!(
            get_python_requires(content, &known_python_versions(10)).unwrap(),
            Some(v(&["3.6", "3.7", "3.8", "3.9", "3.10"]))
        );
    }

    #[test]
    fn get_python_requires_reads_poetry_python_dependency() {
        assert_eq!(
            get_python_requires(POETRY_TOML, &known_python_versions(9)).unwrap(),
            Some(v(&["3.8", "3.9"]))
        );
    }

    #[test]
    fn get_python_requires_silent_when_absent() {
        let content = "\
[project]
    name='foo'
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let (result, diagnostics) =
            with_captured_warnings(|| get_python_requires(content, &known_python_versions(10)));
        assert_eq!(result.unwrap(), None);
        assert_eq!(diagnostics, "");
    }

    #[test]
    fn get_python_requires_warns_when_not_a_string() {
        let content = "\
[project]
    name='foo'
    requires-python = [\">=3.6\"]
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let (result, diagnostics) =
            with_captured_warnings(|| get_python_requires(content, &known_python_versions(10)));
        assert_eq!(result.unwrap(), None);
        assert!(diagnostics.contains("The value specified for python dependency is not a string"));
    }

    #[test]
    fn get_python_requires_warns_on_multiline_string() {
        let content = "\
[project]
    name='foo'
    requires-python = '''
        >=3.6
    '''
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let (result, diagnostics) =
            with_captured_warnings(|| get_python_requires(content, &known_python_versions(10)));
        assert_eq!(result.unwrap(), None);
        assert!(diagnostics.contains("The value specified for python dependency is not a string"));
    }

    #[test]
    fn get_python_requires_propagates_parse_errors() {
        let content = "\
[tool.poetry.dependencies]
python = \"^3.8\"
";
        assert!(matches!(
            get_python_requires(content, &known_python_versions(10)),
            Err(PyprojectError::Requires(RequiresError::UnsupportedSpecifier(clause)))
                if clause == "^3.8"
        ));
    }

    #[test]
    fn update_python_requires_rewrites_lower_bound() {
        let content = "\
[project]
    name='foo'
    requires-python = \">=3.4\"
[build-system]
    requires = [\"setuptools\", \"setuptools-scm\"]
    build-backend = \"setuptools.build_meta\"
";
        let result = update_python_requires(content, &v(&["3.5", "3.6", "3.7"]), &known_python_versions(7))
            .unwrap()
            .unwrap();
        assert_eq!(
            result.join("\n"),
            content.replace(">=3.4", ">=3.5")
        );
    }

    #[test]
    fn update_python_requires_returns_none_when_missing() {
        let content = "\
[project]
    name='foo'
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let (result, diagnostics) = with_captured_warnings(|| {
            update_python_requires(content, &v(&["3.5", "3.6"]), &known_python_versions(7))
        });
        assert_eq!(result.unwrap(), None);
        assert_eq!(diagnostics, "");
    }

    #[test]
    fn update_python_requires_preserves_compact_style() {
        let content = "\
[project]
    name='foo'
    requires-python = \">=2.7,!=3.0.*\"
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let result = update_python_requires(content, &v(&["2.7", "3.2"]), &known_python_versions(2))
            .unwrap()
            .unwrap();
        assert_eq!(
            result.join("\n"),
            content.replace(">=2.7,!=3.0.*", ">=2.7,!=3.0.*,!=3.1.*")
        );
    }

    #[test]
    fn update_python_requires_excludes_known_versions_above_target() {
        // The original value is a single-quoted literal string with spaced
        // commas; the rewrite keeps the comma style and switches to a
        // regular quoted string.
        let content = "\
[project]
    name='foo'
    requires-python = '>=2.7, !=3.0.*'
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let result = update_python_requires(content, &v(&["2.7", "3.2"]), &known_python_versions(11))
            .unwrap()
            .unwrap();
        assert_eq!(
            result.join("\n"),
            content.replace(
                "'>=2.7, !=3.0.*'",
                "\">=2.7, !=3.0.*, !=3.1.*, !=3.3.*, !=3.4.*, !=3.5.*, !=3.6.*, \
                 !=3.7.*, !=3.8.*, !=3.9.*, !=3.10.*, !=3.11.*\""
            )
        );
    }

    #[test]
    fn update_python_requires_rewrites_poetry_python_dependency() {
        let result = update_python_requires(POETRY_TOML, &v(&["3.9"]), &known_python_versions(9))
            .unwrap()
            .unwrap();
        assert_eq!(
            result.join("\n"),
            POETRY_TOML.replace("\">=3.8\"", "\">=3.9\"")
        );
    }

    #[test]
    fn update_supported_python_versions_replaces_classifier_array() {
        let content = "\
[project]
    name='foo'
    classifiers=[
        'Programming Language :: Python :: 3.6'
    ]
[build-system]
    requires = [\"flit_core >=3.2,<4\"]
    build-backend = \"flit_core.buildapi\"
";
        let result = update_supported_python_versions(content, &v(&["3.7", "3.8"]))
            .unwrap()
            .unwrap();
        assert_eq!(
            result,
            vec![
                "[project]",
                "    name='foo'",
                "    classifiers=[\"Programming Language :: Python :: 3.7\", \
                 \"Programming Language :: Python :: 3.8\"]",
                "[build-system]",
                "    requires = [\"flit_core >=3.2,<4\"]",
                "    build-backend = \"flit_core.buildapi\"",
                "",
            ]
        );
    }

    #[test]
    fn update_supported_python_versions_keeps_other_classifiers() {
        let content = "\
[project]
name = \"foo\"
classifiers = [
    \"Development Status :: 4 - Beta\",
    \"Programming Language :: Python :: 3.6\",
    \"License :: OSI Approved :: MIT License\",
]
[build-system]
build-backend = \"setuptools.build_meta\"
";
        let result = update_supported_python_versions(content, &v(&["3.9"]))
            .unwrap()
            .unwrap()
            .join("\n");
        assert!(result.contains("Development Status :: 4 - Beta"));
        assert!(result.contains("License :: OSI Approved :: MIT License"));
        assert!(result.contains("Programming Language :: Python :: 3.9"));
        assert!(!result.contains("Programming Language :: Python :: 3.6"));
    }

    #[test]
    fn update_supported_python_versions_warns_when_not_an_array() {
        let content = "\
[project]
    name='foo'
    classifiers='''
        Programming Language :: Python :: 2.7
    '''
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let (result, diagnostics) =
            with_captured_warnings(|| update_supported_python_versions(content, &v(&["3.9"])));
        assert_eq!(result.unwrap(), None);
        assert!(diagnostics.contains("The value specified for classifiers is not an array"));
    }

    #[test]
    fn update_supported_python_versions_returns_none_when_absent() {
        let content = "\
[project]
    name='foo'
[build-system]
    build-backend = \"setuptools.build_meta\"
";
        let (result, diagnostics) =
            with_captured_warnings(|| update_supported_python_versions(content, &v(&["3.9"])));
        assert_eq!(result.unwrap(), None);
        assert_eq!(diagnostics, "");
    }

    #[rstest]
    #[case::from_tool("[tool.setuptools.packages]\nname='foo'\n")]
    #[case::from_backend("[build-system]\nbuild-backend = \"setuptools.build_meta\"\n")]
    #[case::from_requires("[build-system]\nrequires = [\"setuptools\"]\n")]
    fn detects_setuptools_documents(#[case] content: &str) {
        let doc = Document::parse(content).unwrap();
        assert!(is_setuptools_toml(&doc));
        assert!(!is_poetry_toml(&doc));
        assert!(!is_flit_toml(&doc));
    }

    #[rstest]
    #[case::from_tool("[tool.flit.metadata]\nmodule='foo'\n")]
    #[case::from_backend("[build-system]\nbuild-backend = \"flit_core.buildapi\"\n")]
    #[case::from_requires("[build-system]\nrequires = [\"flit_core >=3.2,<4\"]\n")]
    fn detects_flit_documents(#[case] content: &str) {
        let doc = Document::parse(content).unwrap();
        assert!(is_flit_toml(&doc));
        assert!(!is_poetry_toml(&doc));
        assert!(!is_setuptools_toml(&doc));
    }

    #[rstest]
    #[case::from_tool("[tool.poetry]\nname='foo'\n")]
    #[case::from_backend("[build-system]\nbuild-backend = \"poetry.core.masonry.api\"\n")]
    #[case::from_requires("[build-system]\nrequires = [\"poetry-core\"]\n")]
    fn detects_poetry_documents(#[case] content: &str) {
        let doc = Document::parse(content).unwrap();
        assert!(is_poetry_toml(&doc));
        assert!(!is_setuptools_toml(&doc));
        assert!(!is_flit_toml(&doc));
    }

    #[test]
    fn ambiguous_documents_satisfy_multiple_detectors() {
        let content = "\
[tool.poetry]
classifiers = ['Programming Language :: Python :: 2.7']

[project]
classifiers = ['Programming Language :: Python :: 3.9']

[build-system]
build-backend = \"setuptools.build_meta\"
";
        let doc = Document::parse(content).unwrap();
        assert!(is_poetry_toml(&doc));
        assert!(is_setuptools_toml(&doc));
        // The later check wins: the [project] table governs extraction.
        assert_eq!(get_supported_python_versions(content).unwrap(), v(&["3.9"]));
    }
}
