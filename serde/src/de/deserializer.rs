use std::{
    collections::{HashMap, VecDeque},
    str::FromStr,
    sync::OnceLock,
};

use gamble::ALIAS_EXPANSION_FACTOR;
use gamble_parser::{Event, EventKind, Parser, Span};
use regex::{Regex, RegexSet};
use serde::de::{value::UnitDeserializer, DeserializeOwned, IntoDeserializer, Visitor};

use super::mapping::YamlMapping;
use super::seq::YamlSequence;
use super::variant::Enum;

use crate::error::{DeserializeError, Result};

fn boolean_re() -> &'static RegexSet {
    static RE: OnceLock<RegexSet> = OnceLock::new();
    RE.get_or_init(|| {
        RegexSet::new([
            r"^(y|Y|yes|Yes|YES|true|True|TRUE|on|On|ON)$",
            r"^(n|N|no|No|NO|false|False|FALSE|off|Off|OFF)$",
        ])
        .expect("boolean patterns are valid")
    })
}

fn null_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(null|Null|NULL|~|)$").expect("null pattern is valid"))
}

fn float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?$")
            .expect("float pattern is valid")
    })
}

/// Whether `event` is a plain scalar that reads as null.
fn is_null(event: &Event<'_>) -> bool {
    match event {
        Event::Scalar(scalar) => {
            scalar.is_plain() && scalar.as_str().is_ok_and(|s| null_re().is_match(s))
        }
        _ => false,
    }
}

/// The YAML spellings of non-finite floats.
fn special_float(s: &str) -> Option<f32> {
    match s {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f32::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f32::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f32::NAN),
        _ => None,
    }
}

/// The number of parsed events the expansion budget assumes for short inputs.
const ALIAS_EXPANSION_MIN_EVENTS: usize = 100;

/// The events of an anchored node, collected while it is being read.
struct Recording {
    name: Vec<u8>,
    depth: usize,
    events: Vec<(Event<'static>, Span)>,
}

/// A serde [`Deserializer`](serde::Deserializer) reading events from the native parser.
///
/// Aliases are replaced with the events of the node they refer to. Replayed events are limited to
/// [`ALIAS_EXPANSION_FACTOR`] per event of the input.
pub struct Deserializer<'de> {
    yaml: Parser<'de>,
    peeked: Option<(Event<'static>, Span)>,
    /// Events of resolved aliases, read before the parser is polled again.
    replay: VecDeque<(Event<'static>, Span)>,
    anchors: HashMap<Vec<u8>, Vec<(Event<'static>, Span)>>,
    recordings: Vec<Recording>,
    /// Events read from the parser so far.
    parsed: usize,
    /// Events queued for replay so far.
    replayed: usize,
}

impl<'de> Deserializer<'de> {
    /// Create a deserializer reading the YAML stream in `input`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Deserializer {
            yaml: Parser::new_from_str(input),
            peeked: None,
            replay: VecDeque::new(),
            anchors: HashMap::new(),
            recordings: vec![],
            parsed: 0,
            replayed: 0,
        }
    }

    pub(crate) fn next_event(&mut self) -> Result<(Event<'static>, Span)> {
        match self.peeked.take() {
            Some(next) => Ok(next),
            None => self.fetch_event(),
        }
    }

    pub(crate) fn peek_event(&mut self) -> Result<&(Event<'static>, Span)> {
        if self.peeked.is_none() {
            self.peeked = Some(self.fetch_event()?);
        }
        self.peeked.as_ref().ok_or(DeserializeError::EarlyTermination)
    }

    pub(crate) fn peek_kind(&mut self) -> Result<EventKind> {
        Ok(self.peek_event()?.0.kind())
    }

    /// Whether the next event is a plain scalar that reads as null.
    pub(crate) fn peek_is_null(&mut self) -> Result<bool> {
        Ok(is_null(&self.peek_event()?.0))
    }

    fn fetch_event(&mut self) -> Result<(Event<'static>, Span)> {
        loop {
            let ((event, span), replayed) = match self.replay.pop_front() {
                Some(next) => (next, true),
                None => {
                    let next = self.yaml.next().ok_or(DeserializeError::EarlyTermination)??;
                    self.parsed += 1;
                    (next, false)
                }
            };
            if let Event::Alias(name) = &event {
                let Some(events) = self.anchors.get(&**name) else {
                    return Err(DeserializeError::UnknownAnchor {
                        name: String::from_utf8_lossy(name).into_owned(),
                        span,
                    });
                };
                self.replayed += events.len();
                let budget = ALIAS_EXPANSION_FACTOR * self.parsed.max(ALIAS_EXPANSION_MIN_EVENTS);
                if self.replayed > budget {
                    return Err(DeserializeError::AliasExpansionLimit { span });
                }
                tracing::trace!(events = events.len(), "replaying alias");
                for next in events.iter().rev() {
                    self.replay.push_front(next.clone());
                }
                continue;
            }
            self.record(&event, span, replayed);
            return Ok((event, span));
        }
    }

    /// Add `event` to the anchored nodes being read, and start recording if it is anchored.
    ///
    /// Anchors inside a replayed node were defined where the node was first read, so they are
    /// not defined again.
    fn record(&mut self, event: &Event<'static>, span: Span, replayed: bool) {
        for recording in &mut self.recordings {
            recording.events.push((event.clone(), span));
            match event.kind() {
                EventKind::SequenceStart | EventKind::MappingStart => recording.depth += 1,
                EventKind::SequenceEnd | EventKind::MappingEnd => recording.depth -= 1,
                _ => {}
            }
        }
        while self.recordings.last().is_some_and(|r| r.depth == 0) {
            if let Some(recording) = self.recordings.pop() {
                self.anchors.insert(recording.name, recording.events);
            }
        }

        if replayed {
            return;
        }
        let (anchor, depth) = match event {
            Event::Scalar(scalar) => (scalar.properties.anchor.as_ref(), 0),
            Event::SequenceStart(properties) | Event::MappingStart(properties) => {
                (properties.anchor.as_ref(), 1)
            }
            _ => (None, 0),
        };
        if let Some(name) = anchor {
            let events = vec![(event.clone(), span)];
            if depth == 0 {
                self.anchors.insert(name.to_vec(), events);
            } else {
                self.recordings.push(Recording {
                    name: name.to_vec(),
                    depth,
                    events,
                });
            }
        }
    }

    pub(crate) fn read_boolean(&mut self) -> Result<bool> {
        let (s, span) = self.read_scalar_string()?;
        let matches = boolean_re().matches(&s);
        if matches.matched(0) {
            Ok(true)
        } else if matches.matched(1) {
            Ok(false)
        } else {
            Err(DeserializeError::not_a_bool(&s, span))
        }
    }

    pub(crate) fn start_stream(&mut self) -> Result<()> {
        let (next_event, span) = self.next_event()?;
        if !matches!(next_event, Event::StreamStart) {
            Err(DeserializeError::unexpected(
                &next_event,
                span,
                "start_stream",
            ))
        } else {
            Ok(())
        }
    }

    pub(crate) fn end_stream(&mut self) -> Result<()> {
        let (next_event, span) = self.next_event()?;
        match next_event {
            Event::StreamEnd => Ok(()),
            Event::DocumentStart(_) => Err(DeserializeError::TrailingCharacters),
            _ => Err(DeserializeError::unexpected(&next_event, span, "end_stream")),
        }
    }

    pub(crate) fn start_document(&mut self) -> Result<bool> {
        if self.peek_kind()? == EventKind::DocumentStart {
            self.next_event()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn end_document(&mut self) -> Result<()> {
        let (next_event, span) = self.next_event()?;
        if !matches!(next_event, Event::DocumentEnd(_)) {
            Err(DeserializeError::unexpected(
                &next_event,
                span,
                "end_document",
            ))
        } else {
            // Anchors do not carry over documents.
            self.anchors.clear();
            Ok(())
        }
    }

    pub(crate) fn end_sequence(&mut self) -> Result<()> {
        let (next_event, span) = self.next_event()?;
        if next_event != Event::SequenceEnd {
            Err(DeserializeError::unexpected(
                &next_event,
                span,
                "end_sequence",
            ))
        } else {
            Ok(())
        }
    }

    pub(crate) fn end_map(&mut self) -> Result<()> {
        let (next_event, span) = self.next_event()?;
        if !matches!(next_event, Event::MappingEnd) {
            Err(DeserializeError::unexpected(&next_event, span, "end_map"))
        } else {
            Ok(())
        }
    }

    /// Consume the next node, including everything nested in it.
    pub(crate) fn skip_node(&mut self) -> Result<()> {
        let mut depth = 0_usize;
        loop {
            let (next_event, span) = self.next_event()?;
            match next_event {
                Event::SequenceStart(_) | Event::MappingStart(_) => depth += 1,
                Event::SequenceEnd | Event::MappingEnd if depth > 0 => depth -= 1,
                Event::Scalar(_) => {}
                _ => return Err(DeserializeError::unexpected(&next_event, span, "skip_node")),
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    pub(crate) fn parse_scalar<T>(&mut self, type_string: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        let (s, span) = self.read_scalar_string()?;
        let parse_result = s.parse::<T>();
        parse_result.map_err(|e| {
            DeserializeError::number_parse_failure(&s, span, type_string, &format!("{}", e))
        })
    }

    pub(crate) fn parse_float<T>(&mut self, type_string: &str) -> Result<T>
    where
        T: FromStr + From<f32>,
        <T as FromStr>::Err: std::fmt::Display,
    {
        let (s, span) = self.read_scalar_string()?;
        if let Some(v) = special_float(&s) {
            return Ok(T::from(v));
        }
        s.parse::<T>().map_err(|e| {
            DeserializeError::number_parse_failure(&s, span, type_string, &format!("{}", e))
        })
    }

    pub(crate) fn read_scalar_string(&mut self) -> Result<(String, Span)> {
        match self.next_event()? {
            (Event::Scalar(scalar), span) => match scalar.as_str() {
                Ok(s) => Ok((s.to_owned(), span)),
                Err(_) => Err(DeserializeError::InvalidUtf8 { span }),
            },
            (event, span) => Err(DeserializeError::unexpected(
                &event,
                span,
                "deserialize_str",
            )),
        }
    }

    /// Read a plain null scalar, failing with a type error mentioning `expected` otherwise.
    fn read_null(&mut self, expected: &'static str) -> Result<()> {
        let (next_event, span) = self.next_event()?;
        if is_null(&next_event) {
            Ok(())
        } else {
            Err(DeserializeError::TypeError { expected, span })
        }
    }
}

impl<'de> serde::de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = crate::error::DeserializeError;

    fn deserialize_any<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.next_event()? {
            (Event::Scalar(scalar), span) => {
                let Ok(value) = scalar.as_str() else {
                    return Err(DeserializeError::InvalidUtf8 { span });
                };
                if !scalar.is_plain() {
                    return visitor.visit_str(value);
                }
                // Plain scalars are resolved the way the core schema does.
                if null_re().is_match(value) {
                    visitor.visit_unit()
                } else if let Ok(v) = value.parse::<u64>() {
                    visitor.visit_u64(v)
                } else if let Ok(v) = value.parse::<i64>() {
                    visitor.visit_i64(v)
                } else if float_re().is_match(value) {
                    match value.parse::<f64>() {
                        Ok(v) => visitor.visit_f64(v),
                        Err(_) => visitor.visit_str(value),
                    }
                } else if let Some(v) = special_float(value) {
                    visitor.visit_f64(f64::from(v))
                } else {
                    match value {
                        "true" | "True" | "TRUE" => visitor.visit_bool(true),
                        "false" | "False" | "FALSE" => visitor.visit_bool(false),
                        _ => visitor.visit_str(value),
                    }
                }
            }
            (Event::MappingStart(_), _span) => {
                let result = visitor.visit_map(YamlMapping::new(self))?;
                self.end_map()?;
                Ok(result)
            }
            (Event::SequenceStart(_), _span) => {
                let result = visitor.visit_seq(YamlSequence::new(self))?;
                self.end_sequence()?;
                Ok(result)
            }
            (event, span) => Err(DeserializeError::unexpected(
                &event,
                span,
                "deserialize_any",
            )),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.skip_node()?;
        visitor.visit_unit()
    }

    fn deserialize_bool<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_bool(self.read_boolean()?)
    }

    fn deserialize_i8<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i8(self.parse_scalar("i8")?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i16(self.parse_scalar("i16")?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i32(self.parse_scalar("i32")?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i64(self.parse_scalar("i64")?)
    }

    fn deserialize_u8<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u8(self.parse_scalar("u8")?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u16(self.parse_scalar("u16")?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u32(self.parse_scalar("u32")?)
    }

    fn deserialize_u64<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u64(self.parse_scalar("u64")?)
    }

    fn deserialize_f32<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_f32(self.parse_float("f32")?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_f64(self.parse_float("f64")?)
    }

    fn deserialize_char<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let (s, _span) = self.read_scalar_string()?;
        visitor.visit_string(s)
    }

    fn deserialize_string<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let (s, _span) = self.read_scalar_string()?;
        visitor.visit_byte_buf(s.into_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.peek_is_null()? {
            self.next_event()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.read_null("null")?;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.peek_is_null()? {
            self.next_event()?;
            return visitor.visit_seq(YamlSequence::empty(self));
        }
        match self.next_event()? {
            (Event::SequenceStart(_), _span) => {
                let value = visitor.visit_seq(YamlSequence::new(self))?;
                self.end_sequence()?;
                Ok(value)
            }
            (_, span) => Err(DeserializeError::TypeError {
                expected: "a sequence",
                span,
            }),
        }
    }

    fn deserialize_tuple<V>(
        self,
        _len: usize,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.peek_is_null()? {
            self.next_event()?;
            return visitor.visit_map(YamlMapping::empty(self));
        }
        match self.next_event()? {
            (Event::MappingStart(_), _span) => {
                let value = visitor.visit_map(YamlMapping::new(self))?;
                self.end_map()?;
                Ok(value)
            }
            (_, span) => Err(DeserializeError::TypeError {
                expected: "a mapping",
                span,
            }),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.next_event()? {
            (Event::Scalar(scalar), span) => match scalar.as_str() {
                Ok(s) => visitor.visit_enum(s.to_owned().into_deserializer()),
                Err(_) => Err(DeserializeError::InvalidUtf8 { span }),
            },
            (Event::MappingStart(_), _span) => {
                let value = visitor.visit_enum(Enum::new(self))?;
                self.end_map()?;
                Ok(value)
            }
            (event, span) => Err(DeserializeError::unexpected(
                &event,
                span,
                "deserialize_enum",
            )),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }
}

/// Deserialize an instance of `T` from the single YAML document in `s`.
///
/// An input without any document reads as null.
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Sea {
///     name: String,
///     age: u32,
/// }
///
/// let sea: Sea = gamble_serde::from_str("name: seas\nage: 55").unwrap();
/// assert_eq!(sea, Sea { name: "seas".into(), age: 55 });
/// ```
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut deserializer = Deserializer::from_str(s);
    deserializer.start_stream()?;
    let t = if deserializer.start_document()? {
        let t = T::deserialize(&mut deserializer)?;
        deserializer.end_document()?;
        t
    } else {
        let null: UnitDeserializer<DeserializeError> = ().into_deserializer();
        T::deserialize(null)?
    };
    deserializer.end_stream()?;
    Ok(t)
}
