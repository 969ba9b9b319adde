//! Check and update the Python versions a package declares in pyproject.toml.
//!
//! A pyproject.toml declares supported Python versions in two ways: trove
//! classifiers (one version per tag) and a requires-python range expression
//! (a lower bound plus exclusions). This crate extracts both into one
//! normalized, ascending version list and rewrites them to a new target set
//! without disturbing comments, whitespace, or separator conventions.
//!
//! # Architecture
//!
//! - [`version`]: the `Version` value type plus the two declaration codecs
//!   (classifier list, range expression)
//! - [`document`]: format-preserving TOML editor over `toml_edit`
//! - [`pyproject`]: convention detection (poetry / setuptools / flit) and
//!   the extract/update operations
//! - [`config`]: the default universe of Python releases known to exist
//!
//! # Examples
//!
//! ```
//! use check_py_versions::pyproject::get_supported_python_versions;
//!
//! let content = r#"
//! [project]
//! name = "foo"
//! classifiers = [
//!     "Programming Language :: Python :: 3.10",
//!     "Programming Language :: Python :: 3.11",
//! ]
//! [build-system]
//! build-backend = "setuptools.build_meta"
//! "#;
//!
//! let versions = get_supported_python_versions(content).unwrap();
//! let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
//! assert_eq!(rendered, ["3.10", "3.11"]);
//! ```

pub mod config;
pub mod document;
pub mod pyproject;
pub mod version;

pub use document::{Document, DocumentError};
pub use pyproject::{
    PyprojectError, get_python_requires, get_supported_python_versions, is_flit_toml,
    is_poetry_toml, is_setuptools_toml, update_python_requires, update_supported_python_versions,
};
pub use version::{
    RequiresError, SortedVersionList, Style, Version, VersionError, compute_python_requires,
    get_versions_from_classifiers, parse_python_requires, sorted_versions, update_classifiers,
    version_classifiers,
};
