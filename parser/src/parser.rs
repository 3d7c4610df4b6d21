//! Safe, event-at-a-time access to libyaml's parser.
//!
//! The native parser hands out `yaml_event_t` values whose fields live behind a C union. A
//! [`RawEvent`] owns one such value for exactly one parse step and exposes its fields through
//! read-only projections. It mutably borrows the [`Parser`] that produced it, so the parser cannot
//! advance while the event is alive, and it releases the native storage when dropped.

use std::{
    alloc::{handle_alloc_error, Layout},
    borrow::Cow,
    ffi::CStr,
    fmt,
    marker::PhantomData,
    mem::MaybeUninit,
    slice,
};

use unsafe_libyaml as sys;

use crate::{
    error::{AccessError, ScanError},
    event::{Event, EventKind, Marker, Properties, Scalar, ScalarStyle, Span},
};

/// A YAML parser reading events from a borrowed input.
///
/// ```
/// # use gamble_parser::{EventKind, Parser, ScalarStyle};
/// let mut parser = Parser::new_from_str("key: \"value\"");
/// loop {
///     let event = parser.next_event().unwrap();
///     if event.event_kind() == EventKind::Scalar && event.scalar_text().unwrap() == b"value" {
///         assert_eq!(event.scalar_style().unwrap(), ScalarStyle::DoubleQuoted);
///         break;
///     }
/// }
/// ```
pub struct Parser<'input> {
    /// Boxed so that the native parser keeps a stable address: libyaml stores pointers to itself
    /// when reading from a string.
    sys: Box<MaybeUninit<sys::yaml_parser_t>>,
    /// Set once the stream end or an error has been returned by the iterator.
    done: bool,
    input: PhantomData<&'input [u8]>,
}

impl<'input> Parser<'input> {
    /// Create a parser reading from a string.
    #[must_use]
    pub fn new_from_str(input: &'input str) -> Self {
        Self::new(input.as_bytes())
    }

    /// Create a parser reading from a byte slice.
    ///
    /// The encoding (UTF-8 or UTF-16, with or without BOM) is detected by libyaml.
    #[must_use]
    pub fn new(input: &'input [u8]) -> Self {
        let mut boxed = Box::new(MaybeUninit::<sys::yaml_parser_t>::uninit());
        let parser = boxed.as_mut_ptr();
        // SAFETY: `parser` points to writable memory of the right layout; the input outlives the
        // parser through `'input`.
        unsafe {
            if sys::yaml_parser_initialize(parser).fail {
                // The only way for initialization to fail is a failed buffer allocation.
                handle_alloc_error(Layout::new::<sys::yaml_parser_t>());
            }
            sys::yaml_parser_set_input_string(parser, input.as_ptr(), input.len() as u64);
        }
        tracing::trace!(len = input.len(), "created parser");
        Parser {
            sys: boxed,
            done: false,
            input: PhantomData,
        }
    }

    /// Advance the parser and return the next event.
    ///
    /// Once the stream has ended, the parser keeps returning [`EventKind::Nothing`] events.
    ///
    /// # Errors
    /// Returns the parser's error if the input is not valid YAML. The parser stays in its error
    /// state: further calls return the same error.
    pub fn next_event(&mut self) -> Result<RawEvent<'_>, ScanError> {
        let parser = self.sys.as_mut_ptr();
        let mut event = MaybeUninit::<sys::yaml_event_t>::uninit();
        // SAFETY: the parser was initialized in `new`, and the shared borrow of its error state
        // ends before libyaml is handed the pointer. On success, libyaml fully initializes the
        // event.
        let event = unsafe {
            if (&*parser).error != sys::YAML_NO_ERROR
                || sys::yaml_parser_parse(parser, event.as_mut_ptr()).fail
            {
                let error = ScanError::from_parser(parser);
                tracing::debug!(%error, "parser failed");
                return Err(error);
            }
            event.assume_init()
        };
        let event = RawEvent {
            sys: event,
            parser: PhantomData,
        };
        tracing::trace!(kind = %event.event_kind(), "parsed event");
        Ok(event)
    }
}

impl Drop for Parser<'_> {
    fn drop(&mut self) {
        // SAFETY: the parser was initialized in `new` and is deleted only here.
        unsafe { sys::yaml_parser_delete(self.sys.as_mut_ptr()) }
    }
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser").field("done", &self.done).finish()
    }
}

impl<'input> Iterator for Parser<'input> {
    type Item = Result<(Event<'static>, Span), ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .next_event()
            .map(|event| (event.as_event().into_owned(), event.span()));
        self.done = match &item {
            Ok((event, _)) => matches!(event.kind(), EventKind::StreamEnd | EventKind::Nothing),
            Err(_) => true,
        };
        Some(item)
    }
}

/// One event, owned for the duration of a single parse step.
///
/// Every projection borrows from the event: nothing is copied out of the native storage.
pub struct RawEvent<'p> {
    sys: sys::yaml_event_t,
    parser: PhantomData<&'p mut ()>,
}

impl RawEvent<'_> {
    /// Return the type tag of the event.
    ///
    /// Repeated calls return the same value.
    #[must_use]
    pub fn event_kind(&self) -> EventKind {
        EventKind::from_sys(self.sys.type_)
    }

    /// Return the value of a scalar event, as the parser reported it.
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidEventKind`] if the event is not a scalar.
    pub fn scalar_text(&self) -> Result<&[u8], AccessError> {
        self.require(EventKind::Scalar)?;
        // SAFETY: the tag says `scalar` is the active member; `value` holds `length` bytes owned by
        // the event.
        Ok(unsafe { bytes(self.sys.data.scalar.value, self.sys.data.scalar.length) })
    }

    /// Return the value of a scalar event as a `str`.
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidEventKind`] if the event is not a scalar, or
    /// [`AccessError::InvalidUtf8`] if the value is not UTF-8.
    pub fn scalar_str(&self) -> Result<&str, AccessError> {
        Ok(std::str::from_utf8(self.scalar_text()?)?)
    }

    /// Return how a scalar event was written in the source.
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidEventKind`] if the event is not a scalar.
    pub fn scalar_style(&self) -> Result<ScalarStyle, AccessError> {
        self.require(EventKind::Scalar)?;
        // SAFETY: the tag says `scalar` is the active member.
        Ok(ScalarStyle::from_sys(unsafe { self.sys.data.scalar.style }))
    }

    /// Return the anchor of the event, if any.
    ///
    /// For an alias, this is the name of the anchor it refers to.
    #[must_use]
    pub fn anchor(&self) -> Option<&[u8]> {
        // SAFETY: each arm reads the union member matching the tag.
        let anchor = unsafe {
            match self.event_kind() {
                EventKind::Alias => self.sys.data.alias.anchor,
                EventKind::Scalar => self.sys.data.scalar.anchor,
                EventKind::SequenceStart => self.sys.data.sequence_start.anchor,
                EventKind::MappingStart => self.sys.data.mapping_start.anchor,
                _ => return None,
            }
        };
        // SAFETY: anchors are null or NUL-terminated strings owned by the event.
        unsafe { c_bytes(anchor) }
    }

    /// Return the resolved tag of the event, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&[u8]> {
        // SAFETY: each arm reads the union member matching the tag.
        let tag = unsafe {
            match self.event_kind() {
                EventKind::Scalar => self.sys.data.scalar.tag,
                EventKind::SequenceStart => self.sys.data.sequence_start.tag,
                EventKind::MappingStart => self.sys.data.mapping_start.tag,
                _ => return None,
            }
        };
        // SAFETY: tags are null or NUL-terminated strings owned by the event.
        unsafe { c_bytes(tag) }
    }

    /// Return the range of the input the event was read from.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(
            Marker::from_sys(self.sys.start_mark),
            Marker::from_sys(self.sys.end_mark),
        )
    }

    /// Project the event onto the [`Event`] sum type, borrowing from `self`.
    #[must_use]
    pub fn as_event(&self) -> Event<'_> {
        let properties = || Properties {
            anchor: self.anchor().map(Cow::Borrowed),
            tag: self.tag().map(Cow::Borrowed),
        };
        match self.event_kind() {
            EventKind::Nothing => Event::Nothing,
            EventKind::StreamStart => Event::StreamStart,
            EventKind::StreamEnd => Event::StreamEnd,
            // SAFETY: the tag says `document_start` is the active member.
            EventKind::DocumentStart => {
                Event::DocumentStart(!unsafe { self.sys.data.document_start.implicit })
            }
            // SAFETY: the tag says `document_end` is the active member.
            EventKind::DocumentEnd => {
                Event::DocumentEnd(!unsafe { self.sys.data.document_end.implicit })
            }
            EventKind::Alias => Event::Alias(Cow::Borrowed(self.anchor().unwrap_or_default())),
            EventKind::Scalar => Event::Scalar(Scalar {
                value: Cow::Borrowed(self.scalar_text().unwrap_or_default()),
                style: self.scalar_style().unwrap_or(ScalarStyle::Plain),
                properties: properties(),
            }),
            EventKind::SequenceStart => Event::SequenceStart(properties()),
            EventKind::SequenceEnd => Event::SequenceEnd,
            EventKind::MappingStart => Event::MappingStart(properties()),
            EventKind::MappingEnd => Event::MappingEnd,
        }
    }

    fn require(&self, expected: EventKind) -> Result<(), AccessError> {
        let found = self.event_kind();
        if found == expected {
            Ok(())
        } else {
            Err(AccessError::InvalidEventKind { expected, found })
        }
    }
}

impl Drop for RawEvent<'_> {
    fn drop(&mut self) {
        // SAFETY: the event was filled by `yaml_parser_parse` and is deleted only here.
        unsafe { sys::yaml_event_delete(&mut self.sys) }
    }
}

impl fmt::Debug for RawEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawEvent")
            .field("event", &self.as_event())
            .field("span", &self.span())
            .finish()
    }
}

/// View `len` bytes at `ptr`.
///
/// # Safety
/// `ptr` must be null or valid for `len` bytes for the returned lifetime.
unsafe fn bytes<'a>(ptr: *const u8, len: u64) -> &'a [u8] {
    if ptr.is_null() {
        &[]
    } else {
        // SAFETY: per the caller.
        unsafe { slice::from_raw_parts(ptr, len as usize) }
    }
}

/// View the bytes of a NUL-terminated string, without the terminator.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for the returned lifetime.
unsafe fn c_bytes<'a>(ptr: *const u8) -> Option<&'a [u8]> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: per the caller.
        Some(unsafe { CStr::from_ptr(ptr.cast()) }.to_bytes())
    }
}
