use std::{ffi::CStr, io, os::raw::c_char, str::Utf8Error};

use thiserror::Error;
use unsafe_libyaml as sys;

use crate::event::{EventKind, Marker};

/// An error reported by the native parser.
#[derive(Error, Clone, PartialEq, Debug, Eq)]
#[error("{problem} at {mark}{}", context_suffix(.context))]
pub struct ScanError {
    /// The position at which the problem was detected.
    mark: Marker,
    /// Human-readable description of the problem.
    problem: String,
    /// What the parser was doing when it hit the problem, if it said.
    context: Option<String>,
}

impl ScanError {
    /// Create a new error from a location and an error string.
    #[must_use]
    pub fn new(mark: Marker, problem: &str) -> ScanError {
        ScanError {
            mark,
            problem: problem.to_owned(),
            context: None,
        }
    }

    /// Return the marker pointing to the error in the source.
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.mark
    }

    /// Return the information string describing the error that happened.
    #[must_use]
    pub fn info(&self) -> &str {
        self.problem.as_ref()
    }

    /// Return what the parser was doing when the error happened, if known.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Read the error state of a parser that just failed.
    ///
    /// # Safety
    /// `parser` must point to an initialized parser.
    pub(crate) unsafe fn from_parser(parser: *const sys::yaml_parser_t) -> ScanError {
        // SAFETY: the caller guarantees `parser` points to an initialized parser, which nothing
        // mutates for the duration of this shared borrow. libyaml stores static strings in
        // `problem` and `context`.
        let parser = unsafe { &*parser };
        let problem = match parser.error {
            sys::YAML_MEMORY_ERROR => Some("out of memory".to_owned()),
            // SAFETY: `problem` is null or a static NUL-terminated string.
            _ => unsafe { c_string(parser.problem.cast()) },
        };
        ScanError {
            mark: Marker::from_sys(parser.problem_mark),
            problem: problem.unwrap_or_else(|| "parser failed without a reason".to_owned()),
            // SAFETY: as for `problem`.
            context: unsafe { c_string(parser.context.cast()) },
        }
    }
}

/// An error when reading a field of an event.
#[derive(Error, Clone, Copy, PartialEq, Debug, Eq)]
pub enum AccessError {
    /// The field only exists on events of another kind.
    #[error("expected a {expected} event, found {found}")]
    InvalidEventKind {
        /// The kind the field belongs to.
        expected: EventKind,
        /// The kind of the event that was queried.
        found: EventKind,
    },

    /// The scalar text could not be viewed as a `str`.
    #[error("scalar is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

/// An error when emitting YAML.
#[derive(Error, Debug)]
pub enum EmitError {
    /// The native emitter rejected an event.
    #[error("{0}")]
    Libyaml(String),

    /// The output could not be written to.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    /// An anchor or tag contained a NUL byte, which libyaml cannot represent.
    #[error("{0} contains a NUL byte")]
    NulByte(&'static str),

    /// A scalar was longer than libyaml can take in a single event.
    #[error("scalar of {0} bytes is too long to emit")]
    TooLong(usize),

    /// The event has no textual representation.
    #[error("cannot emit a {0} event")]
    Unsupported(EventKind),
}

impl EmitError {
    /// Read the error state of an emitter that just failed.
    ///
    /// # Safety
    /// `emitter` must point to an initialized emitter.
    pub(crate) unsafe fn from_emitter(emitter: *const sys::yaml_emitter_t) -> EmitError {
        // SAFETY: the caller guarantees `emitter` points to an initialized emitter, which nothing
        // mutates for the duration of this shared borrow.
        let emitter = unsafe { &*emitter };
        let problem = match emitter.error {
            sys::YAML_MEMORY_ERROR => Some("out of memory".to_owned()),
            // SAFETY: `problem` is null or a static NUL-terminated string.
            _ => unsafe { c_string(emitter.problem.cast()) },
        };
        EmitError::Libyaml(problem.unwrap_or_else(|| "emitter failed without a reason".to_owned()))
    }
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|context| format!(", {context}"))
        .unwrap_or_default()
}

/// Copy a possibly-null C string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: non-null and NUL-terminated per the caller.
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}
