// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// See the LICENSE file at the top-level directory of this distribution.

//! Event-level YAML access over libyaml.
//!
//! **If you want to load YAML into a tree or dump a tree back to YAML, use `gamble` instead of
//! `gamble-parser`. This crate only exposes the event stream.**
//!
//! The parsing itself is done by libyaml (through [`unsafe_libyaml`]). This crate wraps its opaque
//! event structure into safe projections:
//!
//! - [`RawEvent::event_kind`] always succeeds;
//! - [`RawEvent::scalar_text`] and [`RawEvent::scalar_style`] only succeed on scalar events and
//!   borrow from the event without copying;
//! - [`RawEvent::as_event`] projects the event onto the [`Event`] sum type, where only
//!   [`Event::Scalar`] carries a value and a style.
//!
//! ```
//! use gamble_parser::{Event, Parser, ScalarStyle};
//!
//! let scalars: Vec<_> = Parser::new_from_str("key: plainvalue")
//!     .filter_map(|event| match event.unwrap().0 {
//!         Event::Scalar(scalar) => Some((scalar.as_str().unwrap().to_owned(), scalar.style)),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(
//!     scalars,
//!     [
//!         ("key".to_owned(), ScalarStyle::Plain),
//!         ("plainvalue".to_owned(), ScalarStyle::Plain),
//!     ]
//! );
//! ```
//!
//! # Features
//!
//! #### `tools`
//! Builds the `dump_events` binary, which prints the events of a YAML file.

#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::module_name_repetitions)]

mod emitter;
mod error;
mod event;
mod parser;

pub use crate::emitter::{Emitter, EmitterConfig};
pub use crate::error::{AccessError, EmitError, ScanError};
pub use crate::event::{Event, EventKind, Marker, Properties, Scalar, ScalarStyle, Span};
pub use crate::parser::{Parser, RawEvent};
