// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// See the LICENSE file at the top-level directory of this distribution.

//! A small YAML library over libyaml's event API.
//!
//! # Usage
//!
//! This crate can be used by adding `gamble` to the dependencies in your project's `Cargo.toml`:
//! ```sh
//! cargo add gamble
//! ```
//!
//! # Examples
//! Parse a string into a [`Node`] and then marshal it back into a YAML string.
//!
//! ```
//! use gamble::{marshal, parse, Node};
//!
//! let doc = parse("[1, 2, null, 'null']").unwrap();
//! assert_eq!(doc[0].as_str(), Some("1"));
//! assert!(doc[2].is_null());
//! assert_eq!(doc[3].as_str(), Some("null"));
//!
//! let out = marshal(&doc).unwrap();
//! assert_eq!(parse(&out).unwrap(), doc);
//! ```
//!
//! # The node tree
//! A [`Node`] is either null, a string, a sequence or a mapping with string keys. Scalars are not
//! typed: `1` loads as the string `"1"`. Only plain `null` and empty scalars load as
//! [`Node::Null`]; a quoted `"null"` stays a string.
//!
//! Typed (de)serialization is provided by `gamble-serde`. Raw events are available through
//! [`gamble_parser`].

#![warn(missing_docs, clippy::pedantic)]

mod loader;
mod marshal;
mod node;

pub use crate::loader::{parse, parse_all, LoadError, Loader, ALIAS_EXPANSION_FACTOR};
pub use crate::marshal::{marshal, MarshalError, Marshaller};
pub use crate::node::{Mapping, Node, Sequence, DEFAULT_FLOAT_PRECISION};

// Re-export main components.
pub use gamble_parser;
