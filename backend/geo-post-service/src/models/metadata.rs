//! Schema-less post metadata.
//!
//! Metadata is an unordered string-keyed map whose values may be any JSON
//! shape. It is stored as JSON text (SQLite) or JSONB (PostgreSQL) and never
//! takes part in filtering.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A loosely-typed metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
}

/// Post metadata map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) -> Option<MetaValue> {
        self.0.insert(key.into(), value)
    }

    /// Decode the stored column. NULL, empty text and JSON `null` are all an empty map.
    pub fn from_column(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("null") => Ok(Self::default()),
            Some(text) => serde_json::from_str(text).map_err(|e| {
                AppError::DataIntegrity(format!("undecodable post metadata: {}", e))
            }),
        }
    }

    /// Encode for storage; an empty map is stored as NULL.
    pub fn to_column(&self) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(self)?))
    }
}

impl FromIterator<(String, MetaValue)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, MetaValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_is_empty() {
        assert!(Metadata::from_column(None).unwrap().is_empty());
        assert!(Metadata::from_column(Some("")).unwrap().is_empty());
        assert!(Metadata::from_column(Some("null")).unwrap().is_empty());
    }

    #[test]
    fn decodes_mixed_values() {
        let meta = Metadata::from_column(Some(
            r#"{"likes": 3, "score": 0.5, "tags": ["food", "sf"], "pinned": false, "extra": null, "venue": {"name": "Ferry Building"}}"#,
        ))
        .unwrap();

        assert_eq!(meta.len(), 6);
        assert_eq!(meta.get("likes"), Some(&MetaValue::Int(3)));
        assert_eq!(meta.get("score"), Some(&MetaValue::Float(0.5)));
        assert_eq!(meta.get("pinned"), Some(&MetaValue::Bool(false)));
        assert_eq!(meta.get("extra"), Some(&MetaValue::Null));
        assert_eq!(
            meta.get("tags"),
            Some(&MetaValue::List(vec![
                MetaValue::Text("food".into()),
                MetaValue::Text("sf".into()),
            ]))
        );
        assert!(matches!(meta.get("venue"), Some(MetaValue::Map(m)) if m.len() == 1));
    }

    #[test]
    fn rejects_non_object_json() {
        let err = Metadata::from_column(Some("[1, 2]")).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn empty_map_is_stored_as_null() {
        assert_eq!(Metadata::new().to_column().unwrap(), None);

        let mut meta = Metadata::new();
        meta.insert("mood", MetaValue::Text("sunny".into()));
        assert_eq!(
            meta.to_column().unwrap().as_deref(),
            Some(r#"{"mood":"sunny"}"#)
        );
    }
}
