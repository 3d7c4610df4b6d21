use gamble::{Mapping, Node};
use serde::{ser, Serialize};

use crate::error::SerializeError;

pub type Result<T> = std::result::Result<T, SerializeError>;

/// Serializes values into [`Node`]s.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeSerializer {
    pub(crate) float_precision: usize,
}

impl NodeSerializer {
    fn float(self, v: f64) -> Node {
        if v.is_nan() {
            Node::from(".nan")
        } else if v.is_infinite() {
            Node::from(if v > 0.0 { ".inf" } else { "-.inf" })
        } else {
            Node::from_float(v, self.float_precision)
        }
    }

    fn variant(variant: &'static str, content: Node) -> Node {
        let mut mapping = Mapping::new();
        mapping.insert(variant.to_owned(), content);
        Node::Mapping(mapping)
    }
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;

    type Error = SerializeError;

    type SerializeSeq = SerializeVec;

    type SerializeTuple = SerializeVec;

    type SerializeTupleStruct = SerializeVec;

    type SerializeTupleVariant = SerializeTupleVariant;

    type SerializeMap = SerializeMap;

    type SerializeStruct = SerializeMap;

    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(Node::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(Node::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(self.float(v))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::from(v))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Node> {
        Err(SerializeError::UnsupportedType("bytes"))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        Ok(Self::variant(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeVec {
            ser: self,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            ser: self,
            map: Mapping::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            inner: self.serialize_map(Some(len))?,
        })
    }
}

pub(crate) struct SerializeVec {
    ser: NodeSerializer,
    items: Vec<Node>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Node;
    type Error = SerializeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(self.ser)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Sequence(self.items))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Node;
    type Error = SerializeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Node;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        ser::SerializeSeq::end(self)
    }
}

pub(crate) struct SerializeTupleVariant {
    variant: &'static str,
    inner: SerializeVec,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Node;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Node> {
        let content = ser::SerializeSeq::end(self.inner)?;
        Ok(NodeSerializer::variant(self.variant, content))
    }
}

pub(crate) struct SerializeMap {
    ser: NodeSerializer,
    map: Mapping,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Node;
    type Error = SerializeError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(self.ser)? {
            Node::String(key) => {
                self.next_key = Some(key);
                Ok(())
            }
            _ => Err(SerializeError::KeyMustBeAString),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| <SerializeError as ser::Error>::custom("value without a key"))?;
        self.map.insert(key, value.serialize(self.ser)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Mapping(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Node;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_owned(), value.serialize(self.ser)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        ser::SerializeMap::end(self)
    }
}

pub(crate) struct SerializeStructVariant {
    variant: &'static str,
    inner: SerializeMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Node;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Node> {
        let content = ser::SerializeMap::end(self.inner)?;
        Ok(NodeSerializer::variant(self.variant, content))
    }
}
