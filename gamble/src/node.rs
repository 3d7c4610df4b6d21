//! The untyped YAML tree.

use std::ops::{Index, IndexMut};

use hashlink::LinkedHashMap;

/// The number of decimals used when converting floating point numbers into nodes.
pub const DEFAULT_FLOAT_PRECISION: usize = 2;

/// The type contained in the `Node::Sequence` variant.
pub type Sequence = Vec<Node>;

/// The type contained in the `Node::Mapping` variant.
///
/// Iteration order matches the order of insertion into the map and that of the document.
pub type Mapping = LinkedHashMap<String, Node>;

/// A YAML node.
///
/// Scalars are not resolved to numbers or booleans: every scalar that is not null is kept as the
/// string the parser reported. Typed access goes through `gamble-serde`.
///
/// ```
/// use gamble::{parse, Node};
///
/// let doc = parse("name: seas\nage: 55\nshores: [north, south]").unwrap();
/// assert_eq!(doc["name"].as_str(), Some("seas"));
/// assert_eq!(doc["age"].as_str(), Some("55"));
/// assert_eq!(doc["shores"][1].as_str(), Some("south"));
/// assert!(doc["missing"].is_null());
/// ```
#[derive(Clone, PartialEq, Debug, Eq, Default)]
pub enum Node {
    /// A plain `null`, or an empty value.
    #[default]
    Null,
    /// Any other scalar.
    String(String),
    /// A YAML sequence.
    Sequence(Sequence),
    /// A YAML mapping with string keys.
    Mapping(Mapping),
}

static NULL: Node = Node::Null;

impl Node {
    /// Create a node holding `value` printed with `precision` decimals.
    #[must_use]
    pub fn from_float(value: f64, precision: usize) -> Node {
        Node::String(format!("{value:.precision$}"))
    }

    /// Return whether `self` is [`Node::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Return whether `self` is a [`Node::String`].
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Node::String(_))
    }

    /// Return whether `self` is a [`Node::Sequence`].
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    /// Return whether `self` is a [`Node::Mapping`].
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    /// Get the string of a [`Node::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(v) => Some(v),
            _ => None,
        }
    }

    /// Get the elements of a [`Node::Sequence`].
    #[must_use]
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Get the elements of a [`Node::Sequence`] (mutable).
    #[must_use]
    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Node::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Get the entries of a [`Node::Mapping`].
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(v) => Some(v),
            _ => None,
        }
    }

    /// Get the entries of a [`Node::Mapping`] (mutable).
    #[must_use]
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(v) => Some(v),
            _ => None,
        }
    }

    /// Get the string of a [`Node::String`], consuming `self`.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Node::String(v) => Some(v),
            _ => None,
        }
    }

    /// Get the elements of a [`Node::Sequence`], consuming `self`.
    #[must_use]
    pub fn into_sequence(self) -> Option<Sequence> {
        match self {
            Node::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Get the entries of a [`Node::Mapping`], consuming `self`.
    #[must_use]
    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            Node::Mapping(v) => Some(v),
            _ => None,
        }
    }

    /// Look `key` up if `self` is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|mapping| mapping.get(key))
    }

    /// Take the contained node out of `self`, leaving [`Node::Null`] in its place.
    #[must_use]
    pub fn take(&mut self) -> Node {
        std::mem::take(self)
    }
}

impl Index<&str> for Node {
    type Output = Node;

    /// Perform indexing if `self` is a mapping.
    ///
    /// Returns [`Node::Null`] if `self` is not a mapping or the key is absent.
    fn index(&self, key: &str) -> &Node {
        self.get(key).unwrap_or(&NULL)
    }
}

impl IndexMut<&str> for Node {
    /// Perform indexing if `self` is a mapping, inserting [`Node::Null`] for absent keys.
    ///
    /// # Panics
    /// This function panics if `self` is not a mapping.
    fn index_mut(&mut self, key: &str) -> &mut Node {
        match self.as_mapping_mut() {
            Some(mapping) => mapping.entry(key.to_owned()).or_insert(Node::Null),
            None => panic!("Not a mapping: cannot index with {key:?}"),
        }
    }
}

impl Index<usize> for Node {
    type Output = Node;

    /// Perform indexing if `self` is a sequence.
    ///
    /// Returns [`Node::Null`] if `self` is not a sequence or the index is out of bounds.
    fn index(&self, idx: usize) -> &Node {
        self.as_sequence()
            .and_then(|sequence| sequence.get(idx))
            .unwrap_or(&NULL)
    }
}

impl IndexMut<usize> for Node {
    /// Perform indexing if `self` is a sequence.
    ///
    /// # Panics
    /// This function panics if `self` is not a sequence or the index is out of bounds.
    fn index_mut(&mut self, idx: usize) -> &mut Node {
        match self.as_sequence_mut() {
            Some(sequence) => &mut sequence[idx],
            None => panic!("Not a sequence: cannot index with {idx}"),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_owned())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::String(value.to_string())
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::String(value.to_string())
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<f32> for Node {
    fn from(value: f32) -> Self {
        Node::from_float(f64::from(value), DEFAULT_FLOAT_PRECISION)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::from_float(value, DEFAULT_FLOAT_PRECISION)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Null, Into::into)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(value: Vec<T>) -> Self {
        Node::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(value)
    }
}

impl FromIterator<Node> for Node {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Node::Sequence(iter.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Node {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Node::Mapping(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
