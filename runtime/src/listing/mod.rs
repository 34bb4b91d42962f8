// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Listing sources: where job postings come from.
//!
//! A source returns one fixed-size page of listings whose title matches
//! any of the requested keywords. Matching is a case-insensitive substring
//! test; an empty keyword list matches everything.

pub mod airtable;
pub mod http_client;
pub mod remoteok;

pub use airtable::AirtableSource;
pub use remoteok::RemoteOkSource;

use crate::model::Listing;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    /// Fetch listings matching `keywords` (comma-separated).
    async fn fetch(&self, keywords: &str) -> Result<Vec<Listing>>;
}

/// Split a comma-separated keyword string into lowercase terms.
pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Whether `title` contains any of the (lowercase) `terms`.
pub fn matches_keywords(title: &str, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let title = title.to_lowercase();
    terms.iter().any(|t| title.contains(t.as_str()))
}

/// String field of a JSON object, or `default` when absent or not a string.
pub(crate) fn str_field<'a>(obj: &'a Map<String, Value>, key: &str, default: &'a str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Copy of `obj` without the keys already mapped onto [`Listing`] fields.
pub(crate) fn passthrough(obj: &Map<String, Value>, consumed: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| !consumed.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keywords() {
        assert_eq!(
            split_keywords(" Rust, Backend ,,GO "),
            vec!["rust".to_string(), "backend".to_string(), "go".to_string()]
        );
        assert!(split_keywords("").is_empty());
    }

    #[test]
    fn test_keyword_match_is_any_and_case_insensitive() {
        let terms = split_keywords("rust,python");
        assert!(matches_keywords("Senior RUST Engineer", &terms));
        assert!(matches_keywords("Python Developer", &terms));
        assert!(!matches_keywords("Go Developer", &terms));
        assert!(matches_keywords("Anything", &[]));
    }

    #[test]
    fn test_passthrough_drops_consumed_keys() {
        let obj = serde_json::json!({"position": "x", "tags": ["a"], "url": "u"});
        let rest = passthrough(obj.as_object().unwrap(), &["position", "url"]);
        assert_eq!(rest.len(), 1);
        assert!(rest.contains_key("tags"));
    }
}
