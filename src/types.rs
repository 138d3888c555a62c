//! Shared identity and key types.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

/// Surrogate identity assigned to a value when it is added.
///
/// Ids are monotonic per index and never reused, so two structurally equal
/// values added separately are always two distinct entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    /// Raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Process-unique opaque key.
///
/// Two tokens compare equal only if one was cloned from the other. Tokens have
/// no serialized form, so a token can only be reached by whoever holds a clone,
/// and it does not outlive the process that minted it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
    id: u64,
    label: Option<String>,
}

impl Token {
    /// Mints a fresh token.
    pub fn new() -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            label: None,
        }
    }

    /// Mints a fresh token carrying a debug label.
    ///
    /// The label is descriptive only; two tokens with the same label are
    /// still distinct.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new()
        }
    }

    /// Debug label, if one was given.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "Token({label})"),
            None => write!(f, "Token(#{})", self.id),
        }
    }
}

/// General-purpose key for indexes whose facets produce different kinds of key.
///
/// Every facet of an index shares one key namespace, so a string username and
/// a string national id land in the same table and compare by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacetKey {
    /// Text key.
    Str(String),
    /// Signed integer key.
    Int(i64),
    /// Unsigned integer key.
    Uint(u64),
    /// Raw byte key.
    Bytes(Vec<u8>),
    /// Unique token key. Never serialized; encoding it is an error.
    #[serde(skip)]
    Token(Token),
}

impl From<&str> for FacetKey {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FacetKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for FacetKey {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for FacetKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for FacetKey {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<Vec<u8>> for FacetKey {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Token> for FacetKey {
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<&Token> for FacetKey {
    fn from(value: &Token) -> Self {
        Self::Token(value.clone())
    }
}
