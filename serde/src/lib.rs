#![doc = include_str!("../README.md")]
#![deny(missing_docs, unsafe_code)]
// Suppressed clippy_pedantic lints
#![allow(
    // private Deserializer::from_str
    clippy::should_implement_trait,
    // things are often more readable this way
    clippy::if_not_else,
    clippy::match_same_arms,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    // noisy
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
)]

pub use crate::de::{from_str, Deserializer};
pub use crate::error::{DeserializeError, Result, SerializeError};
pub use crate::ser::{to_node, to_string, Serializer};

pub mod de;
mod error;
pub mod ser;
