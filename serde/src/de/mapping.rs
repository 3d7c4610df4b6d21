use gamble_parser::EventKind;
use serde::de::{DeserializeSeed, MapAccess};

use crate::{de::Deserializer, error::DeserializeError};

pub struct YamlMapping<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    empty: bool,
}

impl<'a, 'de> YamlMapping<'a, 'de> {
    pub(crate) fn new(de: &'a mut Deserializer<'de>) -> Self {
        Self { de, empty: false }
    }

    /// A mapping with no entries, read from a null scalar.
    pub(crate) fn empty(de: &'a mut Deserializer<'de>) -> Self {
        Self { de, empty: true }
    }
}

impl<'de, 'a> MapAccess<'de> for YamlMapping<'a, 'de> {
    type Error = DeserializeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        if self.empty {
            return Ok(None);
        }
        match self.de.peek_kind()? {
            EventKind::MappingEnd => Ok(None),
            EventKind::Scalar => seed.deserialize(&mut *self.de).map(Some),
            _ => {
                let (event, span) = self.de.next_event()?;
                Err(DeserializeError::unexpected(&event, span, "mapping key"))
            }
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }
}
