use std::borrow::Cow;

use gamble_parser::{Event, Parser, Properties, Scalar, ScalarStyle, ScanError};

/// Run the parser through the string.
///
/// # Returns
/// This functions returns the events if parsing succeeds, the error the parser returned otherwise.
fn run_parser(input: &str) -> Result<Vec<Event<'static>>, ScanError> {
    let mut events = vec![];
    for x in Parser::new_from_str(input) {
        events.push(x?.0);
    }
    Ok(events)
}

fn scalar(value: &'static str, style: ScalarStyle) -> Event<'static> {
    Event::Scalar(Scalar::new(value.as_bytes(), style))
}

fn plain(value: &'static str) -> Event<'static> {
    scalar(value, ScalarStyle::Plain)
}

#[test]
fn test_fail() {
    let s = "
# syntax error
scalar
key: [1, 2]]
key1:a2
";
    let Err(error) = run_parser(s) else { panic!() };
    assert!(!error.info().is_empty());
    assert!(error.to_string().contains(" at byte "));
}

#[test]
fn test_empty_doc() {
    assert_eq!(
        run_parser("").unwrap(),
        [Event::StreamStart, Event::StreamEnd]
    );

    assert_eq!(
        run_parser("---").unwrap(),
        [
            Event::StreamStart,
            Event::DocumentStart(true),
            plain(""),
            Event::DocumentEnd(false),
            Event::StreamEnd,
        ]
    );
}

#[test]
fn test_utf() {
    assert_eq!(
        run_parser("a: 你好").unwrap(),
        [
            Event::StreamStart,
            Event::DocumentStart(false),
            Event::MappingStart(Properties::default()),
            plain("a"),
            plain("你好"),
            Event::MappingEnd,
            Event::DocumentEnd(false),
            Event::StreamEnd,
        ]
    );
}

#[test]
fn test_comments() {
    let s = "
# This is a comment
a: b # This is another comment
##
  #
";

    assert_eq!(
        run_parser(s).unwrap(),
        [
            Event::StreamStart,
            Event::DocumentStart(false),
            Event::MappingStart(Properties::default()),
            plain("a"),
            plain("b"),
            Event::MappingEnd,
            Event::DocumentEnd(false),
            Event::StreamEnd,
        ]
    );
}

#[test]
fn test_quoting() {
    let s = "
- plain
- 'squote'
- \"dquote\"
";

    assert_eq!(
        run_parser(s).unwrap(),
        [
            Event::StreamStart,
            Event::DocumentStart(false),
            Event::SequenceStart(Properties::default()),
            plain("plain"),
            scalar("squote", ScalarStyle::SingleQuoted),
            scalar("dquote", ScalarStyle::DoubleQuoted),
            Event::SequenceEnd,
            Event::DocumentEnd(false),
            Event::StreamEnd,
        ]
    );
}

#[test]
fn test_block_scalars() {
    let s = "
literal: |-
  a
    b
folded: >
  c
  d
";

    assert_eq!(
        run_parser(s).unwrap(),
        [
            Event::StreamStart,
            Event::DocumentStart(false),
            Event::MappingStart(Properties::default()),
            plain("literal"),
            scalar("a\n  b", ScalarStyle::Literal),
            plain("folded"),
            scalar("c d\n", ScalarStyle::Folded),
            Event::MappingEnd,
            Event::DocumentEnd(false),
            Event::StreamEnd,
        ]
    );
}

#[test]
fn test_multi_doc() {
    let s = "
a scalar
---
a scalar
--- a scalar
...
";
    assert_eq!(
        run_parser(s).unwrap(),
        [
            Event::StreamStart,
            Event::DocumentStart(false),
            plain("a scalar"),
            Event::DocumentEnd(false),
            Event::DocumentStart(true),
            plain("a scalar"),
            Event::DocumentEnd(false),
            Event::DocumentStart(true),
            plain("a scalar"),
            Event::DocumentEnd(true),
            Event::StreamEnd,
        ]
    );
}

#[test]
fn test_anchor_on_empty_scalar() {
    let events = run_parser("&a").unwrap();
    assert_eq!(
        events[2],
        Event::Scalar(Scalar {
            value: Cow::Borrowed(&b""[..]),
            style: ScalarStyle::Plain,
            properties: Properties {
                anchor: Some(Cow::Borrowed(&b"a"[..])),
                tag: None,
            },
        })
    );
}

#[test]
fn test_alias_and_tags() {
    let s = "
- &x foo
- *x
- !!str 3
- !custom [a]
";
    let events = run_parser(s).unwrap();
    assert_eq!(
        events[3],
        Event::Scalar(Scalar {
            value: Cow::Borrowed(&b"foo"[..]),
            style: ScalarStyle::Plain,
            properties: Properties {
                anchor: Some(Cow::Borrowed(&b"x"[..])),
                tag: None,
            },
        })
    );
    assert_eq!(events[4], Event::Alias(Cow::Borrowed(&b"x"[..])));
    let Event::Scalar(tagged) = &events[5] else {
        panic!("expected a scalar, got {:?}", events[5]);
    };
    assert_eq!(tagged.as_str(), Ok("3"));
    assert_eq!(
        tagged.properties.tag.as_deref(),
        Some(&b"tag:yaml.org,2002:str"[..])
    );
    let Event::SequenceStart(props) = &events[6] else {
        panic!("expected a sequence, got {:?}", events[6]);
    };
    assert_eq!(props.tag.as_deref(), Some(&b"!custom"[..]));
}

#[test]
fn test_bad_hyphen() {
    assert!(run_parser("{-").is_err());
}

#[test]
fn test_trailing_content_after_quoted() {
    let b = r#""foo" l"#;
    assert!(run_parser(b).is_err());
}

#[test]
fn test_iterator_stops_after_error() {
    let mut parser = Parser::new_from_str("[a, b");
    let mut errors = 0;
    for item in parser.by_ref() {
        if item.is_err() {
            errors += 1;
        }
    }
    assert_eq!(errors, 1);
    assert!(parser.next().is_none());
}

#[test]
fn test_indentation_equality() {
    let four_spaces = run_parser(
        r"
hash:
    with:
        indentations
",
    )
    .unwrap();

    let two_spaces = run_parser(
        r"
hash:
  with:
    indentations
",
    )
    .unwrap();

    let one_space = run_parser(
        r"
hash:
 with:
  indentations
",
    )
    .unwrap();

    assert_eq!(four_spaces, two_spaces);
    assert_eq!(four_spaces, one_space);
}
