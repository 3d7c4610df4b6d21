//! Serialization of Rust values into YAML documents.

use gamble::{Marshaller, Node, DEFAULT_FLOAT_PRECISION};
use serde::Serialize;

use crate::error::SerializeError;

mod serializer;

use serializer::NodeSerializer;

/// Alias for a [`Result`](std::result::Result) with a [`SerializeError`].
pub type Result<T> = std::result::Result<T, SerializeError>;

/// Turns values into YAML, going through a [`Node`] tree and a [`Marshaller`].
///
/// ```
/// use gamble_serde::Serializer;
///
/// let mut serializer = Serializer::new();
/// serializer.float_precision(1);
/// serializer.marshaller().explicit_document_markers(false);
/// assert_eq!(serializer.to_string(&[1.26, 2.0]).unwrap(), "- 1.3\n- 2.0\n");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Serializer {
    /// See [`Self::float_precision()`]
    float_precision: usize,
    marshaller: Marshaller,
}

impl Default for Serializer {
    fn default() -> Self {
        Self {
            float_precision: DEFAULT_FLOAT_PRECISION,
            marshaller: Marshaller::default(),
        }
    }
}

impl Serializer {
    /// Create a serializer with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of decimals floating point numbers are written with (default 2).
    pub fn float_precision(&mut self, precision: usize) {
        self.float_precision = precision;
    }

    /// Access the settings of the YAML output.
    pub fn marshaller(&mut self) -> &mut Marshaller {
        &mut self.marshaller
    }

    /// Turn `value` into a [`Node`].
    pub fn to_node<T>(&self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(NodeSerializer {
            float_precision: self.float_precision,
        })
    }

    /// Turn `value` into a YAML document.
    pub fn to_string<T>(&self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        let node = self.to_node(value)?;
        tracing::trace!(?node, "serialized value");
        Ok(self.marshaller.marshal(&node)?)
    }
}

/// Serialize the given value to a YAML string using the default settings.
///
/// The document is written with explicit `---` and `...` markers.
///
/// ```
/// use std::collections::BTreeMap;
///
/// let map = BTreeMap::from([("key1", Some(5.0)), ("key2", None)]);
/// assert_eq!(
///     gamble_serde::to_string(&map).unwrap(),
///     "---\nkey1: 5.00\nkey2: null\n...\n"
/// );
/// ```
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Serializer::default().to_string(value)
}

/// Turn the given value into a [`Node`] using the default settings.
pub fn to_node<T>(value: &T) -> Result<Node>
where
    T: ?Sized + Serialize,
{
    Serializer::default().to_node(value)
}
