use gamble_parser::EventKind;
use serde::de::{DeserializeSeed, SeqAccess};

use crate::{de::Deserializer, error::DeserializeError};

pub struct YamlSequence<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    empty: bool,
}

impl<'a, 'de> YamlSequence<'a, 'de> {
    pub(crate) fn new(de: &'a mut Deserializer<'de>) -> Self {
        Self { de, empty: false }
    }

    /// A sequence with no items, read from a null scalar.
    pub(crate) fn empty(de: &'a mut Deserializer<'de>) -> Self {
        Self { de, empty: true }
    }
}

impl<'de, 'a> SeqAccess<'de> for YamlSequence<'a, 'de> {
    type Error = DeserializeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        if self.empty || self.de.peek_kind()? == EventKind::SequenceEnd {
            Ok(None)
        } else {
            seed.deserialize(&mut *self.de).map(Some)
        }
    }
}
