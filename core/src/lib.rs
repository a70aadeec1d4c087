use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

mod store;

pub use store::{InsertError, LoadError, Store};

/// Rendered in place of a translation when a lookup misses.
pub const MISS_SENTINEL: &str = "empty";

pub const DEFAULT_CSV_NAME: &str = "english_to_urdu.csv";
pub const CSV_HEADER: [&str; 2] = ["English", "Urdu"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Urdu,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Urdu => write!(f, "Urdu"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub english: String,
    pub urdu: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    Miss,
}

impl<'a> Lookup<'a> {
    pub fn translation(self) -> Option<&'a str> {
        match self {
            Lookup::Found(text) => Some(text),
            Lookup::Miss => None,
        }
    }

    pub fn is_miss(self) -> bool {
        matches!(self, Lookup::Miss)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub slots: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { slots: 5 }
    }
}

/// Lookup key form shared by load, lookup and insert.
pub fn canonical_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// `hello translation is "salam"`, or `"empty"` on a miss.
pub fn format_lookup(query: &str, lookup: Lookup<'_>) -> String {
    let translation = lookup.translation().unwrap_or(MISS_SENTINEL);
    format!("{} translation is \"{}\"", canonical_key(query), translation)
}

/// Looks up every slot in order, blank slots included, one line each.
pub fn translate_batch<S: AsRef<str>>(store: &Store, queries: &[S]) -> String {
    queries
        .iter()
        .map(|query| {
            let query = query.as_ref();
            format_lookup(query, store.lookup(query))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
