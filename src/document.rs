//! Format-preserving TOML document editor
//!
//! Thin wrapper over `toml_edit` that exposes exactly what the version
//! extractors need: path-based reads that fail silently, path-based writes
//! that refuse to create missing tables, and line-oriented serialization.
//! A document parsed and serialized without a write round-trips to its
//! source byte for byte, comments and whitespace included.

use std::str::FromStr;

use thiserror::Error;
use toml_edit::{DocumentMut, Item, Value};

/// Error type for document loading and field writes
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid TOML: {0}")]
    Load(#[from] toml_edit::TomlError),

    #[error("Missing table: {0}")]
    MissingPath(String),

    #[error("Not a table: {0}")]
    NotATable(String),
}

/// An editable, comment-preserving TOML document
#[derive(Debug, Clone)]
pub struct Document {
    inner: DocumentMut,
}

impl Document {
    /// Parse a document from source text.
    pub fn parse(source: &str) -> Result<Self, DocumentError> {
        Ok(Self {
            inner: DocumentMut::from_str(source)?,
        })
    }

    /// Read the item at a path of table keys.
    ///
    /// Returns `None` when any path segment is absent; an absent field is
    /// a valid "not declared" state, not an error.
    pub fn get(&self, path: &[&str]) -> Option<&Item> {
        let mut item = self.inner.as_item();
        for segment in path {
            item = item.as_table_like()?.get(segment)?;
        }
        Some(item)
    }

    /// Replace the value at a path of table keys.
    ///
    /// Every segment except the leaf must already exist; missing tables
    /// are never created. When an old value is replaced, its surrounding
    /// decor is copied onto the new one so separator and whitespace
    /// conventions survive the edit.
    pub fn set(&mut self, path: &[&str], value: Value) -> Result<(), DocumentError> {
        let Some((leaf, parents)) = path.split_last() else {
            return Err(DocumentError::MissingPath(String::new()));
        };

        let mut item = self.inner.as_item_mut();
        for segment in parents {
            let table = item
                .as_table_like_mut()
                .ok_or_else(|| DocumentError::NotATable(segment.to_string()))?;
            item = table
                .get_mut(segment)
                .ok_or_else(|| DocumentError::MissingPath(segment.to_string()))?;
        }
        let table = item
            .as_table_like_mut()
            .ok_or_else(|| DocumentError::NotATable(leaf.to_string()))?;

        let mut value = value;
        if let Some(old) = table.get(leaf).and_then(Item::as_value) {
            if let Some(prefix) = old.decor().prefix() {
                value.decor_mut().set_prefix(prefix.clone());
            }
            if let Some(suffix) = old.decor().suffix() {
                value.decor_mut().set_suffix(suffix.clone());
            }
        }
        table.insert(leaf, Item::Value(value));
        Ok(())
    }

    /// Serialize the whole document as lines.
    pub fn to_lines(&self) -> Vec<String> {
        self.inner.to_string().split('\n').map(str::to_string).collect()
    }
}
