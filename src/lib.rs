//! In-memory collection that indexes each value under several derived keys.
//!
//! Every [`Facet`](core::facet::Facet) of a [`MultiKeyIndex`](core::index::MultiKeyIndex)
//! turns a value into one key. All keys share a single lookup table, so a
//! value can be fetched, replaced, or removed through any of them.
//!
//! # Examples
//!
//! ```
//! use facetmap::{
//!     core::index::MultiKeyIndex,
//!     types::{FacetKey, Token},
//! };
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct User {
//!     username: String,
//!     ssn: String,
//!     token: Token,
//! }
//!
//! let mut users = MultiKeyIndex::builder()
//!     .facet("ssn", |u: &User| FacetKey::from(&u.ssn))
//!     .facet("username", |u: &User| FacetKey::from(&u.username))
//!     .facet("token", |u: &User| FacetKey::from(&u.token))
//!     .build()
//!     .expect("facets given");
//!
//! let mut user = User {
//!     username: "john.doe".to_string(),
//!     ssn: "123-45-6789".to_string(),
//!     token: Token::labeled("John Doe"),
//! };
//! users.add(user.clone());
//! assert_eq!(users.get(&FacetKey::from("123-45-6789")), Some(&user));
//!
//! user.username = "john.doe.1".to_string();
//! users.replace(&FacetKey::from("john.doe"), user.clone()).expect("key present");
//! assert!(users.get(&FacetKey::from("john.doe")).is_none());
//! assert_eq!(users.get(&FacetKey::from("john.doe.1")), Some(&user));
//! ```
#![deny(missing_docs)]

/// Behavior configuration.
pub mod config;
/// Core index, facets, and iterators.
pub mod core;
/// Error types.
pub mod error;
/// Collision reporting hooks.
pub mod observer;
/// Serializable value snapshots.
pub mod snapshot;
/// Shared identity and key types.
pub mod types;

pub use crate::{
    config::{CollisionPolicy, IndexConfig, RemovalPolicy},
    core::{
        facet::Facet,
        index::{MultiKeyIndex, MultiKeyIndexBuilder, Replaced},
    },
    error::{IndexError, Rejected},
    types::{EntryId, FacetKey, Token},
};
