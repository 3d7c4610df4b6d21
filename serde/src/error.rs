use std::fmt::Display;

use gamble::MarshalError;
use gamble_parser::{Event, ScanError, Span};
use thiserror::Error;

/// An error that happened when serializing a value into YAML.
#[derive(Error, Debug)]
pub enum SerializeError {
    /// The value contains a type that has no YAML representation.
    #[error("error marshaling unknown type: {0}")]
    UnsupportedType(&'static str),

    /// A map key did not serialize to a string.
    #[error("map keys must serialize to strings")]
    KeyMustBeAString,

    /// The native emitter failed.
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    /// An error raised by a [`Serialize`](serde::Serialize) implementation.
    #[error("Error during serialization: {0}")]
    SerdeError(String),
}

impl serde::ser::Error for SerializeError {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::SerdeError(format!("{}", msg))
    }
}

/// An error that happened when deserializing a value from YAML.
#[derive(Error, Debug, PartialEq)]
pub enum DeserializeError {
    /// The input holds more than one document.
    #[error("Trailing characters")]
    TrailingCharacters,

    /// A node was not of the type the value requires.
    #[error("Invalid type: expected {expected} at line {}, column {}", .span.start.line(), .span.start.col())]
    TypeError {
        /// What the value requires.
        expected: &'static str,
        /// Where the offending node starts.
        span: Span,
    },

    /// An event was out of place for the value being read.
    #[error("Unexpected element {event_name} at line {}, column {}", .span.start.line(), .span.start.col())]
    UnexpectedElement {
        /// The event, and what was being read when it was found.
        event_name: String,
        /// Where the event starts.
        span: Span,
    },

    /// An error raised by a [`Deserialize`](serde::Deserialize) implementation.
    #[error("Error during deserialization: {0}")]
    SerdeError(String),

    /// A scalar could not be parsed as a number.
    #[error("Unable to parse {text} as a {type_string} at line {}, column {}: {err}", .span.start.line(), .span.start.col())]
    NumberParseError {
        /// The text of the scalar.
        text: String,
        /// Why parsing failed.
        err: String,
        /// The requested numeric type.
        type_string: String,
        /// Where the scalar starts.
        span: Span,
    },

    /// A scalar could not be parsed as a boolean.
    #[error("Unable to parse {text} as a boolean at line {}, column {}", .span.start.line(), .span.start.col())]
    BoolParseError {
        /// The text of the scalar.
        text: String,
        /// Where the scalar starts.
        span: Span,
    },

    /// An alias referred to an anchor that was not defined before it.
    #[error("Unknown anchor {name} at line {}, column {}", .span.start.line(), .span.start.col())]
    UnknownAnchor {
        /// The name of the anchor, without the `*`.
        name: String,
        /// Where the alias starts.
        span: Span,
    },

    /// Aliases expanded to more events than the input can reasonably describe.
    #[error("Alias expansion limit exceeded at line {}, column {}", .span.start.line(), .span.start.col())]
    AliasExpansionLimit {
        /// Where the alias that crossed the limit starts.
        span: Span,
    },

    /// A scalar was not valid UTF-8.
    #[error("Invalid UTF-8 at line {}, column {}", .span.start.line(), .span.start.col())]
    InvalidUtf8 {
        /// Where the scalar starts.
        span: Span,
    },

    /// The stream ended in the middle of a value.
    #[error("Unexpected early termination")]
    EarlyTermination,

    /// The native parser rejected the input.
    #[error("Scan error: {0}")]
    ScanError(#[from] ScanError),
}

impl DeserializeError {
    pub(crate) fn unexpected(event: &Event<'_>, span: Span, location: &str) -> Self {
        Self::UnexpectedElement {
            event_name: format!("{} (in {})", event.kind(), location),
            span,
        }
    }

    pub(crate) fn number_parse_failure(
        value: &str,
        span: Span,
        type_string: &str,
        parse_error: &str,
    ) -> DeserializeError {
        Self::NumberParseError {
            text: String::from(value),
            err: String::from(parse_error),
            type_string: String::from(type_string),
            span,
        }
    }

    pub(crate) fn not_a_bool(value: &str, span: Span) -> DeserializeError {
        Self::BoolParseError {
            text: String::from(value),
            span,
        }
    }
}

impl serde::de::Error for DeserializeError {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::SerdeError(format!("{}", msg))
    }
}

/// Alias for a [`Result`](std::result::Result) with a [`DeserializeError`].
pub type Result<T> = std::result::Result<T, DeserializeError>;
