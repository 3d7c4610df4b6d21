//! Owned-or-borrowed YAML events and their classification tags.

use std::{borrow::Cow, fmt, str::Utf8Error};

use unsafe_libyaml as sys;

/// A location in the input stream.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Default, Hash)]
pub struct Marker {
    /// The offset in the input, as counted by libyaml.
    index: usize,
    /// The line (1-indexed).
    line: usize,
    /// The column (0-indexed).
    col: usize,
}

impl Marker {
    /// Create a new [`Marker`] at the given position.
    #[must_use]
    pub fn new(index: usize, line: usize, col: usize) -> Marker {
        Marker { index, line, col }
    }

    /// Return the offset of the marker in the source.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the line of the marker in the source.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Return the column of the marker in the source.
    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    pub(crate) fn from_sys(mark: sys::yaml_mark_t) -> Marker {
        // libyaml counts lines from 0.
        Marker {
            index: mark.index as usize,
            line: mark.line as usize + 1,
            col: mark.column as usize,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "byte {} line {} column {}",
            self.index,
            self.line,
            self.col + 1
        )
    }
}

/// A range of locations in a YAML document.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Default, Hash)]
pub struct Span {
    /// The start (inclusive) of the range.
    pub start: Marker,
    /// The end (exclusive) of the range.
    pub end: Marker,
}

impl Span {
    /// Create a new [`Span`] for the given range.
    #[must_use]
    pub fn new(start: Marker, end: Marker) -> Span {
        Span { start, end }
    }

    /// Whether the span covers no input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.index == self.end.index
    }
}

/// The type tag of an event, as stored by the parser when it emitted it.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash)]
pub enum EventKind {
    /// The parser has no more events to produce.
    Nothing,
    /// Start of the stream.
    StreamStart,
    /// End of the stream.
    StreamEnd,
    /// Start of a document.
    DocumentStart,
    /// End of a document.
    DocumentEnd,
    /// A reference to an anchored node.
    Alias,
    /// A leaf value.
    Scalar,
    /// Start of a sequence.
    SequenceStart,
    /// End of a sequence.
    SequenceEnd,
    /// Start of a mapping.
    MappingStart,
    /// End of a mapping.
    MappingEnd,
}

impl EventKind {
    pub(crate) fn from_sys(kind: sys::yaml_event_type_t) -> EventKind {
        match kind {
            sys::YAML_STREAM_START_EVENT => EventKind::StreamStart,
            sys::YAML_STREAM_END_EVENT => EventKind::StreamEnd,
            sys::YAML_DOCUMENT_START_EVENT => EventKind::DocumentStart,
            sys::YAML_DOCUMENT_END_EVENT => EventKind::DocumentEnd,
            sys::YAML_ALIAS_EVENT => EventKind::Alias,
            sys::YAML_SCALAR_EVENT => EventKind::Scalar,
            sys::YAML_SEQUENCE_START_EVENT => EventKind::SequenceStart,
            sys::YAML_SEQUENCE_END_EVENT => EventKind::SequenceEnd,
            sys::YAML_MAPPING_START_EVENT => EventKind::MappingStart,
            sys::YAML_MAPPING_END_EVENT => EventKind::MappingEnd,
            _ => EventKind::Nothing,
        }
    }

    /// A short lowercase name for the kind, used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Nothing => "nothing",
            EventKind::StreamStart => "stream start",
            EventKind::StreamEnd => "stream end",
            EventKind::DocumentStart => "document start",
            EventKind::DocumentEnd => "document end",
            EventKind::Alias => "alias",
            EventKind::Scalar => "scalar",
            EventKind::SequenceStart => "sequence start",
            EventKind::SequenceEnd => "sequence end",
            EventKind::MappingStart => "mapping start",
            EventKind::MappingEnd => "mapping end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The surface syntax used to write a scalar.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash)]
pub enum ScalarStyle {
    /// An unquoted scalar.
    Plain,
    /// A scalar between `'` quotes.
    SingleQuoted,
    /// A scalar between `"` quotes.
    DoubleQuoted,
    /// A block scalar introduced with `|`.
    Literal,
    /// A block scalar introduced with `>`.
    Folded,
}

impl ScalarStyle {
    pub(crate) fn from_sys(style: sys::yaml_scalar_style_t) -> ScalarStyle {
        match style {
            sys::YAML_SINGLE_QUOTED_SCALAR_STYLE => ScalarStyle::SingleQuoted,
            sys::YAML_DOUBLE_QUOTED_SCALAR_STYLE => ScalarStyle::DoubleQuoted,
            sys::YAML_LITERAL_SCALAR_STYLE => ScalarStyle::Literal,
            sys::YAML_FOLDED_SCALAR_STYLE => ScalarStyle::Folded,
            // The parser never reports `YAML_ANY_SCALAR_STYLE`.
            _ => ScalarStyle::Plain,
        }
    }

    pub(crate) fn to_sys(self) -> sys::yaml_scalar_style_t {
        match self {
            ScalarStyle::Plain => sys::YAML_PLAIN_SCALAR_STYLE,
            ScalarStyle::SingleQuoted => sys::YAML_SINGLE_QUOTED_SCALAR_STYLE,
            ScalarStyle::DoubleQuoted => sys::YAML_DOUBLE_QUOTED_SCALAR_STYLE,
            ScalarStyle::Literal => sys::YAML_LITERAL_SCALAR_STYLE,
            ScalarStyle::Folded => sys::YAML_FOLDED_SCALAR_STYLE,
        }
    }
}

/// Node properties: the optional anchor and tag preceding a node.
#[derive(Clone, PartialEq, Debug, Eq, Default)]
pub struct Properties<'a> {
    /// The anchor name, without the leading `&`.
    pub anchor: Option<Cow<'a, [u8]>>,
    /// The fully resolved tag (e.g. `tag:yaml.org,2002:str` for `!!str`).
    pub tag: Option<Cow<'a, [u8]>>,
}

impl<'a> Properties<'a> {
    /// Copy the borrowed parts of `self`, detaching it from the event it was read from.
    #[must_use]
    pub fn into_owned(self) -> Properties<'static> {
        Properties {
            anchor: self.anchor.map(|anchor| Cow::Owned(anchor.into_owned())),
            tag: self.tag.map(|tag| Cow::Owned(tag.into_owned())),
        }
    }
}

/// The payload of a scalar event.
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct Scalar<'a> {
    /// The scalar's value, exactly as the parser reported it.
    pub value: Cow<'a, [u8]>,
    /// How the scalar was written in the source.
    pub style: ScalarStyle,
    /// Anchor and tag of the scalar.
    pub properties: Properties<'a>,
}

impl<'a> Scalar<'a> {
    /// Create an untagged, unanchored scalar.
    pub fn new(value: impl Into<Cow<'a, [u8]>>, style: ScalarStyle) -> Self {
        Scalar {
            value: value.into(),
            style,
            properties: Properties::default(),
        }
    }

    /// Return the value as a `str`.
    ///
    /// # Errors
    /// Returns an error if the value is not valid UTF-8.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.value)
    }

    /// Whether the scalar was written without quotes or block indicators.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.style == ScalarStyle::Plain
    }

    /// See [`Properties::into_owned`].
    #[must_use]
    pub fn into_owned(self) -> Scalar<'static> {
        Scalar {
            value: Cow::Owned(self.value.into_owned()),
            style: self.style,
            properties: self.properties.into_owned(),
        }
    }
}

/// An event generated by the YAML parser.
///
/// Only [`Event::Scalar`] carries a value and a style: there is no way to ask a collection event
/// for its text.
#[derive(Clone, PartialEq, Debug, Eq)]
pub enum Event<'a> {
    /// The parser has no more events to produce.
    Nothing,
    /// Start of the stream.
    StreamStart,
    /// End of the stream.
    StreamEnd,
    /// Start of a document. The flag is `true` when the document began with an explicit `---`.
    DocumentStart(bool),
    /// End of a document. The flag is `true` when the document ended with an explicit `...`.
    DocumentEnd(bool),
    /// A reference to the node anchored under the given name.
    Alias(Cow<'a, [u8]>),
    /// A leaf value.
    Scalar(Scalar<'a>),
    /// Start of a sequence.
    SequenceStart(Properties<'a>),
    /// End of a sequence.
    SequenceEnd,
    /// Start of a mapping.
    MappingStart(Properties<'a>),
    /// End of a mapping.
    MappingEnd,
}

impl<'a> Event<'a> {
    /// Return the type tag of the event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Nothing => EventKind::Nothing,
            Event::StreamStart => EventKind::StreamStart,
            Event::StreamEnd => EventKind::StreamEnd,
            Event::DocumentStart(_) => EventKind::DocumentStart,
            Event::DocumentEnd(_) => EventKind::DocumentEnd,
            Event::Alias(_) => EventKind::Alias,
            Event::Scalar(_) => EventKind::Scalar,
            Event::SequenceStart(_) => EventKind::SequenceStart,
            Event::SequenceEnd => EventKind::SequenceEnd,
            Event::MappingStart(_) => EventKind::MappingStart,
            Event::MappingEnd => EventKind::MappingEnd,
        }
    }

    /// Shorthand for a plain, untagged scalar event.
    pub fn plain(value: &'a str) -> Self {
        Event::Scalar(Scalar::new(value.as_bytes(), ScalarStyle::Plain))
    }

    /// Copy the borrowed parts of `self`, detaching it from the event it was read from.
    #[must_use]
    pub fn into_owned(self) -> Event<'static> {
        match self {
            Event::Nothing => Event::Nothing,
            Event::StreamStart => Event::StreamStart,
            Event::StreamEnd => Event::StreamEnd,
            Event::DocumentStart(explicit) => Event::DocumentStart(explicit),
            Event::DocumentEnd(explicit) => Event::DocumentEnd(explicit),
            Event::Alias(anchor) => Event::Alias(Cow::Owned(anchor.into_owned())),
            Event::Scalar(scalar) => Event::Scalar(scalar.into_owned()),
            Event::SequenceStart(properties) => Event::SequenceStart(properties.into_owned()),
            Event::SequenceEnd => Event::SequenceEnd,
            Event::MappingStart(properties) => Event::MappingStart(properties.into_owned()),
            Event::MappingEnd => Event::MappingEnd,
        }
    }
}
