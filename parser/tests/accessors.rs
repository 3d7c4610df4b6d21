#[macro_use]
extern crate quickcheck;

use indoc::indoc;
use quickcheck::TestResult;

use gamble_parser::{
    AccessError, Emitter, EmitterConfig, Event, EventKind, Parser, Scalar, ScalarStyle,
};

/// Collect `(text, style)` for every scalar in `input`.
fn scalars(input: &str) -> Vec<(String, ScalarStyle)> {
    let mut parser = Parser::new_from_str(input);
    let mut scalars = vec![];
    loop {
        let event = parser.next_event().unwrap();
        match event.event_kind() {
            EventKind::Scalar => scalars.push((
                event.scalar_str().unwrap().to_owned(),
                event.scalar_style().unwrap(),
            )),
            EventKind::StreamEnd => return scalars,
            _ => {}
        }
    }
}

#[test]
fn test_double_quoted_value() {
    assert_eq!(
        scalars("key: \"value\""),
        [
            ("key".to_owned(), ScalarStyle::Plain),
            ("value".to_owned(), ScalarStyle::DoubleQuoted),
        ]
    );
}

#[test]
fn test_plain_value() {
    assert_eq!(
        scalars("key: plainvalue")[1],
        ("plainvalue".to_owned(), ScalarStyle::Plain)
    );
}

#[test]
fn test_every_style() {
    let s = indoc! {"
        - plain
        - 'single'
        - \"double\"
        - |
          literal
        - >
          folded
    "};
    let styles: Vec<_> = scalars(s).into_iter().map(|(_, style)| style).collect();
    assert_eq!(
        styles,
        [
            ScalarStyle::Plain,
            ScalarStyle::SingleQuoted,
            ScalarStyle::DoubleQuoted,
            ScalarStyle::Literal,
            ScalarStyle::Folded,
        ]
    );
}

#[test]
fn test_text_is_reported_as_parsed() {
    // The parser resolves escapes; the accessor reports its result as-is.
    assert_eq!(
        scalars(r#"- "a\tb""#)[0],
        ("a\tb".to_owned(), ScalarStyle::DoubleQuoted)
    );
    assert_eq!(
        scalars(r"- 'it''s'")[0],
        ("it's".to_owned(), ScalarStyle::SingleQuoted)
    );
    assert_eq!(
        scalars(r"- a\tb")[0],
        ("a\\tb".to_owned(), ScalarStyle::Plain)
    );
}

#[test]
fn test_scalar_fields_on_collection_events() {
    let mut parser = Parser::new_from_str("[a]");
    let stream_start = parser.next_event().unwrap();
    assert_eq!(stream_start.event_kind(), EventKind::StreamStart);
    assert_eq!(
        stream_start.scalar_text(),
        Err(AccessError::InvalidEventKind {
            expected: EventKind::Scalar,
            found: EventKind::StreamStart,
        })
    );
    drop(stream_start);
    parser.next_event().unwrap();

    let sequence_start = parser.next_event().unwrap();
    assert_eq!(sequence_start.event_kind(), EventKind::SequenceStart);
    let Err(error) = sequence_start.scalar_style() else {
        panic!("a sequence start has no style");
    };
    assert_eq!(
        error.to_string(),
        "expected a scalar event, found sequence start"
    );
    assert!(sequence_start.anchor().is_none());
    assert!(sequence_start.tag().is_none());
}

#[test]
fn test_event_kind_is_idempotent() {
    let mut parser = Parser::new_from_str("a: [b, {c: d}]");
    loop {
        let event = parser.next_event().unwrap();
        let kind = event.event_kind();
        for _ in 0..3 {
            assert_eq!(event.event_kind(), kind);
            assert_eq!(event.as_event().kind(), kind);
        }
        if kind == EventKind::StreamEnd {
            break;
        }
    }
}

#[test]
fn test_nothing_after_stream_end() {
    let mut parser = Parser::new_from_str("a");
    while parser.next_event().unwrap().event_kind() != EventKind::StreamEnd {}
    for _ in 0..2 {
        assert_eq!(parser.next_event().unwrap().event_kind(), EventKind::Nothing);
    }
}

#[test]
fn test_error_is_sticky() {
    let mut parser = Parser::new_from_str("key: [unclosed");
    let first = loop {
        match parser.next_event() {
            Ok(event) => assert_ne!(event.event_kind(), EventKind::StreamEnd),
            Err(error) => break error,
        }
    };
    let Err(second) = parser.next_event() else {
        panic!("the parser recovered from an error");
    };
    assert_eq!(first, second);
    assert!(first.marker().line() >= 1);
}

#[test]
fn test_error_reads_native_state() {
    let mut parser = Parser::new_from_str("key: [unclosed");
    let error = loop {
        if let Err(error) = parser.next_event() {
            break error;
        }
    };
    assert!(error.info().contains("']'"));
    assert_eq!(error.context(), Some("while parsing a flow sequence"));
    assert!(error.to_string().ends_with(", while parsing a flow sequence"));
}

#[test]
fn test_as_event_borrows_scalar() {
    let mut parser = Parser::new_from_str("&anchor !!str 12");
    parser.next_event().unwrap();
    parser.next_event().unwrap();
    let event = parser.next_event().unwrap();
    let Event::Scalar(scalar) = event.as_event() else {
        panic!("expected a scalar");
    };
    assert_eq!(scalar.as_str(), Ok("12"));
    assert_eq!(scalar.value.as_ptr(), event.scalar_text().unwrap().as_ptr());
    assert_eq!(scalar.properties.anchor.as_deref(), Some(&b"anchor"[..]));
    assert_eq!(event.anchor(), Some(&b"anchor"[..]));
}

fn emit_scalar(value: &str, style: ScalarStyle) -> String {
    let mut out = Vec::new();
    {
        let mut emitter = Emitter::new(&mut out, &EmitterConfig::default());
        emitter
            .emit_all(&[
                Event::StreamStart,
                Event::DocumentStart(false),
                Event::Scalar(Scalar::new(value.as_bytes(), style)),
                Event::DocumentEnd(false),
                Event::StreamEnd,
            ])
            .unwrap();
        emitter.flush().unwrap();
    }
    String::from_utf8(out).unwrap()
}

quickcheck! {
    fn prop_scalar_text_is_exact(value: String) -> TestResult {
        let yaml = emit_scalar(&value, ScalarStyle::DoubleQuoted);
        let mut parser = Parser::new_from_str(&yaml);
        loop {
            let event = match parser.next_event() {
                Ok(event) => event,
                Err(error) => return TestResult::error(error.to_string()),
            };
            match event.event_kind() {
                EventKind::Scalar => {
                    return TestResult::from_bool(
                        event.scalar_text() == Ok(value.as_bytes())
                            && event.scalar_style() == Ok(ScalarStyle::DoubleQuoted),
                    );
                }
                EventKind::StreamEnd => return TestResult::failed(),
                _ => {}
            }
        }
    }
}
