//! The default loader.

use std::collections::HashMap;

use gamble_parser::{Event, EventKind, Marker, Parser, Scalar, ScanError, Span};

use crate::{Mapping, Node};

/// An error that happened when loading a YAML document.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// An error within the native parser. This indicates a malformed YAML input.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// A collection was used as a mapping key.
    #[error("mapping keys must be scalars, found a {kind} at {mark}")]
    NonScalarKey {
        /// The kind of the event that started the key.
        kind: EventKind,
        /// Where the key starts.
        mark: Marker,
    },
    /// An alias referred to an anchor that was not defined before it.
    #[error("unknown anchor `{name}` at {mark}")]
    UnknownAnchor {
        /// The name of the anchor, without the `*`.
        name: String,
        /// Where the alias starts.
        mark: Marker,
    },
    /// Aliases expanded to more nodes than the input can reasonably describe.
    #[error("alias expansion limit exceeded at {mark}")]
    AliasExpansionLimit {
        /// Where the alias that crossed the limit starts.
        mark: Marker,
    },
    /// A scalar, anchor or alias was not valid UTF-8.
    #[error("invalid UTF-8 at {mark}")]
    InvalidUtf8 {
        /// Where the offending event starts.
        mark: Marker,
    },
}

/// Aliases may expand to at most this many nodes per event of the input.
pub const ALIAS_EXPANSION_FACTOR: usize = 100;

/// The number of events the expansion budget assumes for short inputs.
const ALIAS_EXPANSION_MIN_EVENTS: usize = 100;

/// Load the first document of `input`.
///
/// An input with no document at all yields [`Node::Null`]. Documents after the first are not
/// parsed, so syntax errors in them are not reported.
///
/// # Errors
/// Returns an error if the first document is malformed.
pub fn parse(input: &str) -> Result<Node, LoadError> {
    Loader::default().load_first(input)
}

/// Load every document of `input`.
///
/// # Errors
/// Returns an error if any document is malformed.
pub fn parse_all(input: &str) -> Result<Vec<Node>, LoadError> {
    Loader::default().load_from_str(input)
}

/// Main structure for loading YAML into [`Node`]s.
///
/// ```
/// use gamble::{Loader, Node};
///
/// let mut loader = Loader::new();
/// loader.resolve_aliases(false);
/// let docs = loader.load_from_str("- &a x\n- *a\n").unwrap();
/// assert_eq!(docs, [Node::from(vec!["x"])]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Loader {
    /// See [`Self::resolve_aliases()`]
    resolve_aliases: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            resolve_aliases: true,
        }
    }
}

impl Loader {
    /// Create a loader with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to replace aliases with the node they refer to.
    ///
    /// If set to `true` (default), an alias is replaced with a copy of its anchored node and an
    /// alias to an unknown anchor is an error. Copies are limited to
    /// [`ALIAS_EXPANSION_FACTOR`] nodes per event of the input; going over fails with
    /// [`LoadError::AliasExpansionLimit`].
    /// If set to `false`, aliases are dropped from the tree: an aliased sequence item disappears
    /// and a mapping entry whose key or value is an alias is not inserted.
    pub fn resolve_aliases(&mut self, enabled: bool) {
        self.resolve_aliases = enabled;
    }

    /// Load every document of `input`.
    ///
    /// # Errors
    /// Returns an error if the input is malformed or if a document cannot be represented as a
    /// [`Node`].
    pub fn load_from_str(&self, input: &str) -> Result<Vec<Node>, LoadError> {
        self.load(input, false)
    }

    /// Load the first document of `input`, or [`Node::Null`] if there is none.
    ///
    /// # Errors
    /// Returns an error if the first document is malformed or cannot be represented as a
    /// [`Node`].
    pub fn load_first(&self, input: &str) -> Result<Node, LoadError> {
        let docs = self.load(input, true)?;
        Ok(docs.into_iter().next().unwrap_or_default())
    }

    fn load(&self, input: &str, first_only: bool) -> Result<Vec<Node>, LoadError> {
        let mut builder = TreeBuilder::new(self.resolve_aliases);
        let mut parser = Parser::new_from_str(input);
        loop {
            let event = parser.next_event()?;
            let span = event.span();
            match event.as_event() {
                Event::StreamEnd | Event::Nothing => break,
                Event::DocumentEnd(_) if first_only => {
                    builder.on_event(Event::DocumentEnd(false), span)?;
                    break;
                }
                event => builder.on_event(event, span)?,
            }
        }
        tracing::debug!(documents = builder.docs.len(), "loaded YAML stream");
        Ok(builder.docs)
    }
}

/// A key in a mapping that is being built.
enum Key {
    /// The next node is a key.
    Pending,
    /// The next node is the value for this key.
    Ready(String),
    /// The key was an unresolved alias; the next node is dropped.
    Skipped,
}

/// A node an alias may refer to.
struct Anchored {
    node: Node,
    /// The text of an anchored scalar, which an alias used as a key stands for.
    text: Option<String>,
    /// The number of nodes in `node`.
    size: usize,
}

/// Builds [`Node`]s from parser events.
struct TreeBuilder {
    /// The different YAML documents that are loaded.
    docs: Vec<Node>,
    // (current node, anchor) tuple
    doc_stack: Vec<(Node, Option<String>)>,
    key_stack: Vec<Key>,
    anchors: HashMap<String, Anchored>,
    resolve_aliases: bool,
    /// Events received so far.
    events: usize,
    /// Nodes copied from anchors so far.
    expanded: usize,
}

impl TreeBuilder {
    fn new(resolve_aliases: bool) -> Self {
        Self {
            docs: vec![],
            doc_stack: vec![],
            key_stack: vec![],
            anchors: HashMap::new(),
            resolve_aliases,
            events: 0,
            expanded: 0,
        }
    }

    fn on_event(&mut self, event: Event<'_>, span: Span) -> Result<(), LoadError> {
        self.events += 1;
        match event {
            Event::Nothing | Event::StreamStart | Event::StreamEnd => {}
            Event::DocumentStart(_) => {
                // Anchors do not carry over documents.
                self.anchors.clear();
            }
            Event::DocumentEnd(_) => {
                let doc = self.doc_stack.pop().map(|(node, _)| node).unwrap_or_default();
                self.doc_stack.clear();
                self.key_stack.clear();
                self.docs.push(doc);
            }
            Event::SequenceStart(properties) => {
                self.check_not_key(EventKind::SequenceStart, span)?;
                let anchor = utf8(properties.anchor.as_deref(), span)?;
                self.doc_stack.push((Node::Sequence(Vec::new()), anchor));
            }
            Event::MappingStart(properties) => {
                self.check_not_key(EventKind::MappingStart, span)?;
                let anchor = utf8(properties.anchor.as_deref(), span)?;
                self.doc_stack.push((Node::Mapping(Mapping::new()), anchor));
                self.key_stack.push(Key::Pending);
            }
            Event::SequenceEnd => self.end_collection(),
            Event::MappingEnd => {
                self.key_stack.pop();
                self.end_collection();
            }
            Event::Scalar(scalar) => {
                let anchor = utf8(scalar.properties.anchor.as_deref(), span)?;
                let node = scalar_node(&scalar, span)?;
                // Keys keep their text, even when it would load as null.
                let text = utf8(Some(scalar.value.as_ref()), span)?.unwrap_or_default();
                if let Some(anchor) = anchor {
                    self.define_anchor(anchor, node.clone(), Some(text.clone()));
                }
                if self.expects_key() {
                    self.set_key(Key::Ready(text));
                } else {
                    self.insert_new_node(node);
                }
            }
            Event::Alias(name) => {
                let name = utf8(Some(name.as_ref()), span)?.unwrap_or_default();
                if self.resolve_aliases {
                    self.resolve_alias(name, span)?;
                } else {
                    tracing::trace!(%name, "skipped alias");
                    self.skip_node();
                }
            }
        }
        Ok(())
    }

    /// Whether the next node of the innermost collection is a mapping key.
    fn expects_key(&self) -> bool {
        matches!(self.doc_stack.last(), Some((Node::Mapping(_), _)))
            && matches!(self.key_stack.last(), Some(Key::Pending))
    }

    fn set_key(&mut self, new_key: Key) {
        if let Some(key) = self.key_stack.last_mut() {
            *key = new_key;
        }
    }

    /// Fail if the next node of the innermost mapping is a key.
    fn check_not_key(&self, kind: EventKind, span: Span) -> Result<(), LoadError> {
        if self.expects_key() {
            Err(LoadError::NonScalarKey {
                kind,
                mark: span.start,
            })
        } else {
            Ok(())
        }
    }

    fn end_collection(&mut self) {
        if let Some((node, anchor)) = self.doc_stack.pop() {
            if let Some(anchor) = anchor {
                self.define_anchor(anchor, node.clone(), None);
            }
            self.insert_new_node(node);
        }
    }

    /// Record `node` under `name`, replacing any earlier node with that name.
    fn define_anchor(&mut self, name: String, node: Node, text: Option<String>) {
        let size = node_count(&node);
        self.anchors.insert(name, Anchored { node, text, size });
    }

    /// Insert a copy of the node anchored as `name`, or its text if a key is expected.
    fn resolve_alias(&mut self, name: String, span: Span) -> Result<(), LoadError> {
        let Some(anchored) = self.anchors.get(&name) else {
            return Err(LoadError::UnknownAnchor {
                name,
                mark: span.start,
            });
        };
        if self.expects_key() {
            let Some(text) = anchored.text.clone() else {
                return Err(LoadError::NonScalarKey {
                    kind: EventKind::Alias,
                    mark: span.start,
                });
            };
            self.set_key(Key::Ready(text));
            return Ok(());
        }

        self.expanded += anchored.size;
        if self.expanded > ALIAS_EXPANSION_FACTOR * self.events.max(ALIAS_EXPANSION_MIN_EVENTS) {
            return Err(LoadError::AliasExpansionLimit { mark: span.start });
        }
        let node = anchored.node.clone();
        tracing::trace!(%name, expanded = self.expanded, "resolved alias");
        self.insert_new_node(node);
        Ok(())
    }

    fn insert_new_node(&mut self, node: Node) {
        match self.doc_stack.last_mut() {
            Some((Node::Sequence(sequence), _)) => sequence.push(node),
            Some((Node::Mapping(mapping), _)) => {
                let Some(key) = self.key_stack.last_mut() else {
                    return;
                };
                // Keys are set from scalars and aliases before their value arrives.
                if let Key::Ready(key) = std::mem::replace(key, Key::Pending) {
                    mapping.insert(key, node);
                }
            }
            _ => self.doc_stack.push((node, None)),
        }
    }

    /// Account for a node that is not part of the tree.
    fn skip_node(&mut self) {
        if !matches!(self.doc_stack.last(), Some((Node::Mapping(_), _))) {
            return;
        }
        let next = if self.expects_key() {
            Key::Skipped
        } else {
            Key::Pending
        };
        self.set_key(next);
    }
}

/// Turn a scalar into a node, treating plain `null` and empty scalars as [`Node::Null`].
fn scalar_node(scalar: &Scalar<'_>, span: Span) -> Result<Node, LoadError> {
    let text = scalar
        .as_str()
        .map_err(|_| LoadError::InvalidUtf8 { mark: span.start })?;
    if scalar.is_plain() && (text.is_empty() || text == "null") {
        Ok(Node::Null)
    } else {
        Ok(Node::String(text.to_owned()))
    }
}

/// The number of nodes in the tree rooted at `node`.
fn node_count(node: &Node) -> usize {
    1 + match node {
        Node::Sequence(sequence) => sequence.iter().map(node_count).sum(),
        Node::Mapping(mapping) => mapping.values().map(node_count).sum(),
        Node::Null | Node::String(_) => 0,
    }
}

fn utf8(bytes: Option<&[u8]>, span: Span) -> Result<Option<String>, LoadError> {
    bytes
        .map(|bytes| {
            std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| LoadError::InvalidUtf8 { mark: span.start })
        })
        .transpose()
}
