//! Safe access to libyaml's emitter.

use std::{
    alloc::{handle_alloc_error, Layout},
    borrow::Cow,
    ffi::{c_void, CString},
    io,
    mem::MaybeUninit,
    ptr::{self, addr_of_mut},
    slice,
};

use unsafe_libyaml as sys;

use crate::{
    error::EmitError,
    event::{Event, EventKind, Properties},
};

/// Settings applied to the native emitter when it is created.
#[derive(Clone, Copy, PartialEq, Debug, Eq)]
pub struct EmitterConfig {
    /// The number of spaces to add for indentation.
    pub indent: i32,
    /// The preferred line width, or `None` for no limit.
    pub width: Option<i32>,
    /// Whether non-ASCII characters may be written unescaped.
    pub unicode: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        EmitterConfig {
            indent: 2,
            width: None,
            unicode: true,
        }
    }
}

struct EmitterPinned<'w> {
    sys: sys::yaml_emitter_t,
    write: Box<dyn io::Write + 'w>,
    write_error: Option<io::Error>,
}

impl Drop for EmitterPinned<'_> {
    fn drop(&mut self) {
        // SAFETY: the emitter was initialized in `Emitter::new` and is deleted only here.
        unsafe { sys::yaml_emitter_delete(&mut self.sys) }
    }
}

/// A YAML emitter fed with [`Event`]s, writing to any [`io::Write`].
///
/// The emitter checks that events form a valid stream; breaking the nesting of events results in
/// an [`EmitError::Libyaml`].
pub struct Emitter<'w> {
    /// Boxed so that the native emitter keeps a stable address: the write handler receives a
    /// pointer to it.
    pin: Box<EmitterPinned<'w>>,
}

impl<'w> Emitter<'w> {
    /// Create an emitter writing to `write` with the given settings.
    pub fn new(write: impl io::Write + 'w, config: &EmitterConfig) -> Self {
        let mut boxed = Box::new(MaybeUninit::<EmitterPinned<'w>>::uninit());
        let pinned = boxed.as_mut_ptr();
        // SAFETY: `pinned` points to writable memory of the right layout. Every field is written
        // before the box is reinterpreted as initialized.
        unsafe {
            let emitter = addr_of_mut!((*pinned).sys);
            if sys::yaml_emitter_initialize(emitter).fail {
                handle_alloc_error(Layout::new::<sys::yaml_emitter_t>());
            }
            sys::yaml_emitter_set_unicode(emitter, config.unicode);
            sys::yaml_emitter_set_indent(emitter, config.indent);
            sys::yaml_emitter_set_width(emitter, config.width.unwrap_or(-1));
            addr_of_mut!((*pinned).write).write(Box::new(write));
            addr_of_mut!((*pinned).write_error).write(None);
            sys::yaml_emitter_set_output(emitter, write_handler, pinned.cast());
        }
        // SAFETY: all fields were initialized above.
        let pin = unsafe { Box::from_raw(Box::into_raw(boxed).cast::<EmitterPinned<'w>>()) };
        Emitter { pin }
    }

    /// Emit a single event.
    ///
    /// [`Event::Nothing`] cannot be emitted.
    ///
    /// # Errors
    /// Returns an error if the event is out of place in the stream, if an anchor or tag contains
    /// a NUL byte, or if writing the output failed.
    pub fn emit(&mut self, event: &Event<'_>) -> Result<(), EmitError> {
        tracing::trace!(kind = %event.kind(), "emitting event");
        let mut sys_event = MaybeUninit::<sys::yaml_event_t>::uninit();
        let sys_event = sys_event.as_mut_ptr();
        // SAFETY: the strings passed to the initializers are copied by libyaml before they are
        // dropped at the end of each arm.
        let initialized = unsafe {
            match event {
                Event::Nothing => return Err(EmitError::Unsupported(EventKind::Nothing)),
                Event::StreamStart => {
                    sys::yaml_stream_start_event_initialize(sys_event, sys::YAML_UTF8_ENCODING)
                }
                Event::StreamEnd => sys::yaml_stream_end_event_initialize(sys_event),
                Event::DocumentStart(explicit) => sys::yaml_document_start_event_initialize(
                    sys_event,
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    !explicit,
                ),
                Event::DocumentEnd(explicit) => {
                    sys::yaml_document_end_event_initialize(sys_event, !explicit)
                }
                Event::Alias(anchor) => {
                    let anchor = c_string(anchor, "anchor")?;
                    sys::yaml_alias_event_initialize(sys_event, anchor.as_ptr().cast())
                }
                Event::Scalar(scalar) => {
                    let (anchor, tag) = properties(&scalar.properties)?;
                    let length = i32::try_from(scalar.value.len())
                        .map_err(|_| EmitError::TooLong(scalar.value.len()))?;
                    let implicit = tag.is_none();
                    sys::yaml_scalar_event_initialize(
                        sys_event,
                        as_ptr(anchor.as_ref()),
                        as_ptr(tag.as_ref()),
                        scalar.value.as_ptr(),
                        length,
                        implicit,
                        implicit,
                        scalar.style.to_sys(),
                    )
                }
                Event::SequenceStart(props) => {
                    let (anchor, tag) = properties(props)?;
                    sys::yaml_sequence_start_event_initialize(
                        sys_event,
                        as_ptr(anchor.as_ref()),
                        as_ptr(tag.as_ref()),
                        tag.is_none(),
                        sys::YAML_ANY_SEQUENCE_STYLE,
                    )
                }
                Event::SequenceEnd => sys::yaml_sequence_end_event_initialize(sys_event),
                Event::MappingStart(props) => {
                    let (anchor, tag) = properties(props)?;
                    sys::yaml_mapping_start_event_initialize(
                        sys_event,
                        as_ptr(anchor.as_ref()),
                        as_ptr(tag.as_ref()),
                        tag.is_none(),
                        sys::YAML_ANY_MAPPING_STYLE,
                    )
                }
                Event::MappingEnd => sys::yaml_mapping_end_event_initialize(sys_event),
            }
        };
        let emitter = addr_of_mut!(self.pin.sys);
        // SAFETY: the emitter is initialized. `yaml_emitter_emit` takes ownership of the event,
        // including on failure.
        unsafe {
            if initialized.fail {
                return Err(EmitError::from_emitter(emitter));
            }
            if sys::yaml_emitter_emit(emitter, sys_event).fail {
                return Err(self.error());
            }
        }
        Ok(())
    }

    /// Emit every event of `events` in order.
    ///
    /// # Errors
    /// See [`Emitter::emit`].
    pub fn emit_all<'a, I>(&mut self, events: I) -> Result<(), EmitError>
    where
        I: IntoIterator<Item = &'a Event<'a>>,
    {
        for event in events {
            self.emit(event)?;
        }
        Ok(())
    }

    /// Write any buffered output.
    ///
    /// # Errors
    /// Returns an error if writing the output failed.
    pub fn flush(&mut self) -> Result<(), EmitError> {
        let emitter = addr_of_mut!(self.pin.sys);
        // SAFETY: the emitter is initialized.
        if unsafe { sys::yaml_emitter_flush(emitter) }.fail {
            return Err(self.error());
        }
        self.pin.write.flush()?;
        Ok(())
    }

    fn error(&mut self) -> EmitError {
        match self.pin.write_error.take() {
            Some(error) => EmitError::Io(error),
            // SAFETY: the emitter is initialized.
            None => unsafe { EmitError::from_emitter(&self.pin.sys) },
        }
    }
}

/// Called by libyaml with a chunk of output.
///
/// # Safety
/// `data` must be the `EmitterPinned` registered in `Emitter::new`.
unsafe fn write_handler(data: *mut c_void, buffer: *mut u8, size: u64) -> i32 {
    let data = data.cast::<EmitterPinned<'_>>();
    // SAFETY: libyaml passes back the pointer registered with the handler and a valid buffer.
    unsafe {
        let chunk = slice::from_raw_parts(buffer, size as usize);
        match (*data).write.write_all(chunk) {
            Ok(()) => 1,
            Err(error) => {
                (*data).write_error = Some(error);
                0
            }
        }
    }
}

fn c_string(bytes: &Cow<'_, [u8]>, what: &'static str) -> Result<CString, EmitError> {
    CString::new(bytes.as_ref()).map_err(|_| EmitError::NulByte(what))
}

fn properties(props: &Properties<'_>) -> Result<(Option<CString>, Option<CString>), EmitError> {
    let anchor = props
        .anchor
        .as_ref()
        .map(|anchor| c_string(anchor, "anchor"))
        .transpose()?;
    let tag = props
        .tag
        .as_ref()
        .map(|tag| c_string(tag, "tag"))
        .transpose()?;
    Ok((anchor, tag))
}

fn as_ptr(string: Option<&CString>) -> *const u8 {
    string.map_or(ptr::null(), |string| string.as_ptr().cast())
}
