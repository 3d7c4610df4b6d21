//! Deserialization of YAML documents into Rust values.

mod deserializer;
mod mapping;
mod seq;
mod variant;

pub use deserializer::{from_str, Deserializer};
