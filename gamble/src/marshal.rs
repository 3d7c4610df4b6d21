//! YAML serialization of [`Node`]s through the native emitter.

use std::{io, string::FromUtf8Error};

use gamble_parser::{EmitError, Emitter, EmitterConfig, Event, Properties, Scalar, ScalarStyle};

use crate::Node;

/// An error that happened when marshalling a node.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// The native emitter or the output failed.
    #[error(transparent)]
    Emit(#[from] EmitError),
    /// The emitter produced invalid UTF-8.
    #[error(transparent)]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Marshal `node` as a single YAML document with explicit `---` and `...` markers.
///
/// ```
/// use gamble::{marshal, Node};
///
/// let node: Node = [("name", "seas"), ("empty", "")].into_iter().collect();
/// assert_eq!(marshal(&node).unwrap(), "---\nname: seas\nempty: \"\"\n...\n");
/// ```
///
/// # Errors
/// Returns an error if the native emitter fails.
pub fn marshal(node: &Node) -> Result<String, MarshalError> {
    Marshaller::default().marshal(node)
}

/// The YAML serializer for [`Node`]s.
///
/// Strings that would load back as [`Node::Null`] (e.g. `null` or the empty string) are written
/// double-quoted, so that loading the output gives back the marshalled node.
#[derive(Clone, Copy, Debug)]
pub struct Marshaller {
    config: EmitterConfig,
    /// See [`Self::explicit_document_markers()`]
    explicit_document_markers: bool,
}

impl Default for Marshaller {
    fn default() -> Self {
        Self {
            config: EmitterConfig::default(),
            explicit_document_markers: true,
        }
    }
}

impl Marshaller {
    /// Create a marshaller with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of spaces used per indentation level (default 2).
    pub fn indent(&mut self, indent: i32) {
        self.config.indent = indent;
    }

    /// Set the preferred line width, or `None` to never break lines (default).
    pub fn width(&mut self, width: Option<i32>) {
        self.config.width = width;
    }

    /// Whether non-ASCII characters may be written unescaped (default `true`).
    pub fn unicode(&mut self, unicode: bool) {
        self.config.unicode = unicode;
    }

    /// Whether documents begin with `---` and end with `...` (default `true`).
    pub fn explicit_document_markers(&mut self, explicit: bool) {
        self.explicit_document_markers = explicit;
    }

    /// Return the settings handed to the native emitter.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Marshal `node` as a single document.
    ///
    /// # Errors
    /// Returns an error if the native emitter fails.
    pub fn marshal(&self, node: &Node) -> Result<String, MarshalError> {
        self.marshal_all(std::slice::from_ref(node))
    }

    /// Marshal each of `docs` as a document of the same stream.
    ///
    /// # Errors
    /// Returns an error if the native emitter fails.
    pub fn marshal_all(&self, docs: &[Node]) -> Result<String, MarshalError> {
        let mut out = Vec::new();
        self.write_all(docs, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    /// Write each of `docs` as a document of the same stream into `write`.
    ///
    /// # Errors
    /// Returns an error if the native emitter or `write` fails.
    pub fn write_all(&self, docs: &[Node], write: impl io::Write) -> Result<(), MarshalError> {
        tracing::debug!(documents = docs.len(), "marshalling YAML stream");
        let mut emitter = Emitter::new(write, &self.config);
        emitter.emit(&Event::StreamStart)?;
        for doc in docs {
            emitter.emit(&Event::DocumentStart(self.explicit_document_markers))?;
            emit_node(&mut emitter, doc)?;
            emitter.emit(&Event::DocumentEnd(self.explicit_document_markers))?;
        }
        emitter.emit(&Event::StreamEnd)?;
        emitter.flush()?;
        Ok(())
    }
}

fn emit_node(emitter: &mut Emitter<'_>, node: &Node) -> Result<(), EmitError> {
    match node {
        Node::Null => emitter.emit(&Event::plain("null")),
        Node::String(v) => emit_str(emitter, v),
        Node::Sequence(sequence) => {
            emitter.emit(&Event::SequenceStart(Properties::default()))?;
            for item in sequence {
                emit_node(emitter, item)?;
            }
            emitter.emit(&Event::SequenceEnd)
        }
        Node::Mapping(mapping) => {
            emitter.emit(&Event::MappingStart(Properties::default()))?;
            for (key, value) in mapping {
                emit_str(emitter, key)?;
                emit_node(emitter, value)?;
            }
            emitter.emit(&Event::MappingEnd)
        }
    }
}

fn emit_str(emitter: &mut Emitter<'_>, v: &str) -> Result<(), EmitError> {
    let style = if reads_as_null(v) {
        ScalarStyle::DoubleQuoted
    } else {
        // The native emitter quotes plain scalars it cannot write as such.
        ScalarStyle::Plain
    };
    emitter.emit(&Event::Scalar(Scalar::new(v.as_bytes(), style)))
}

/// Whether a plain scalar with this text reads back as a null value.
fn reads_as_null(v: &str) -> bool {
    matches!(v, "" | "~" | "null" | "Null" | "NULL")
}
