use indoc::indoc;

use gamble::{parse, parse_all, LoadError, Loader, Node};
use gamble_parser::EventKind;

fn mapping<const N: usize>(entries: [(&str, Node); N]) -> Node {
    entries.into_iter().collect()
}

#[test]
fn test_empty_string() {
    assert_eq!(parse("").unwrap(), Node::Null);
    assert_eq!(parse("# only a comment\n").unwrap(), Node::Null);
    assert!(parse_all("").unwrap().is_empty());
}

#[test]
fn test_single_value() {
    assert_eq!(parse("the_string").unwrap(), Node::from("the_string"));
}

#[test]
fn test_sequence_of_strings() {
    let s = indoc! {"
        - foo
        - bar
        - baz
    "};
    assert_eq!(parse(s).unwrap(), Node::from(vec!["foo", "bar", "baz"]));
}

#[test]
fn test_mapping_of_strings() {
    let s = indoc! {"
        key1: value1
        key2: value2
    "};
    assert_eq!(
        parse(s).unwrap(),
        mapping([("key1", "value1".into()), ("key2", "value2".into())])
    );
}

#[test]
fn test_nested_mapping() {
    let s = indoc! {"
        ---
        globals:
        - taco
        - burrito
        - kimchi
        collections:
        - name: oceans
          locals:
            foo: bar
            bar: baz
          sequences:
          - one
          - two
          - three
        - name: seas
          age: 55
    "};
    let expected = mapping([
        ("globals", vec!["taco", "burrito", "kimchi"].into()),
        (
            "collections",
            Node::Sequence(vec![
                mapping([
                    ("name", "oceans".into()),
                    (
                        "locals",
                        mapping([("foo", "bar".into()), ("bar", "baz".into())]),
                    ),
                    ("sequences", vec!["one", "two", "three"].into()),
                ]),
                mapping([("name", "seas".into()), ("age", "55".into())]),
            ]),
        ),
    ]);
    let doc = parse(s).unwrap();
    assert_eq!(doc, expected);
    assert_eq!(doc["collections"][0]["locals"]["bar"].as_str(), Some("baz"));
    assert_eq!(doc["collections"][1]["age"].as_str(), Some("55"));
}

#[test]
fn test_mapping_keeps_document_order() {
    let doc = parse("z: 1\na: 2\nm: 3").unwrap();
    let keys: Vec<_> = doc.as_mapping().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn test_nulls() {
    assert_eq!(parse("some_key: null").unwrap(), mapping([("some_key", Node::Null)]));
    assert_eq!(parse("some_key:").unwrap(), mapping([("some_key", Node::Null)]));
    assert_eq!(
        parse("[null, '', ~, Null]").unwrap(),
        Node::Sequence(vec![
            Node::Null,
            Node::from(""),
            Node::from("~"),
            Node::from("Null"),
        ])
    );
}

#[test]
fn test_quoted_null_is_a_string() {
    assert_eq!(
        parse("some_key: \"null\"").unwrap(),
        mapping([("some_key", "null".into())])
    );
    assert_eq!(
        parse("some_key: 'null'").unwrap(),
        mapping([("some_key", "null".into())])
    );
}

#[test]
fn test_null_keys_keep_their_text() {
    let doc = parse("null: a\n'': b").unwrap();
    assert_eq!(doc["null"].as_str(), Some("a"));
    assert_eq!(doc[""].as_str(), Some("b"));
}

#[test]
fn test_scalars_are_not_typed() {
    let doc = parse("[1, 2.5, true, 0x10]").unwrap();
    assert_eq!(doc, Node::from(vec!["1", "2.5", "true", "0x10"]));
}

#[test]
fn test_invalid_document() {
    let s = "
---
-
  -
\t\t-
";
    let Err(LoadError::Scan(error)) = parse(s) else {
        panic!("tabs cannot be used for indentation");
    };
    assert!(!error.info().is_empty());
}

#[test]
fn test_first_document_only() {
    let s = indoc! {"
        --- first
        --- second
        --- [unclosed
    "};
    assert_eq!(parse(s).unwrap(), Node::from("first"));
    assert!(matches!(parse_all(s), Err(LoadError::Scan(_))));
}

#[test]
fn test_multiple_documents() {
    let s = indoc! {"
        --- a
        ---
        - b
        ...
        ---
    "};
    assert_eq!(
        parse_all(s).unwrap(),
        [Node::from("a"), Node::from(vec!["b"]), Node::Null]
    );
}

#[test]
fn test_anchors_and_aliases() {
    let s = indoc! {"
        base: &base
          color: red
        derived: *base
        items:
          - &x foo
          - *x
    "};
    let doc = parse(s).unwrap();
    assert_eq!(doc["derived"], doc["base"]);
    assert_eq!(doc["derived"]["color"].as_str(), Some("red"));
    assert_eq!(doc["items"], Node::from(vec!["foo", "foo"]));
}

#[test]
fn test_alias_as_key() {
    let doc = parse("- &k key\n- {*k : value}").unwrap();
    assert_eq!(doc[1]["key"].as_str(), Some("value"));
}

#[test]
fn test_alias_key_keeps_anchored_text() {
    let doc = parse("&k null: 1\n*k : 2\n").unwrap();
    let keys: Vec<_> = doc.as_mapping().unwrap().keys().collect();
    assert_eq!(keys, ["null"]);
    assert_eq!(doc["null"].as_str(), Some("2"));

    let doc = parse("a: &v null\n*v : 3\n").unwrap();
    assert!(doc["a"].is_null());
    assert_eq!(doc["null"].as_str(), Some("3"));
}

#[test]
fn test_alias_refers_to_latest_anchor() {
    let doc = parse("a: &x [&y 1]\nb: &y 2\nc: *x\nd: *y\n").unwrap();
    assert_eq!(doc["c"], Node::from(vec!["1"]));
    assert_eq!(doc["d"].as_str(), Some("2"));
}

/// A document where `a{n}` holds ten aliases to `a{n-1}`.
fn nested_aliases(levels: usize) -> String {
    let mut s = String::from("a0: &a0 [x, x, x, x, x, x, x, x, x, x]\n");
    for level in 1..levels {
        let items = vec![format!("*a{}", level - 1); 10].join(", ");
        s.push_str(&format!("a{level}: &a{level} [{items}]\n"));
    }
    s
}

#[test]
fn test_alias_expansion_limit() {
    let doc = parse(&nested_aliases(3)).unwrap();
    assert_eq!(doc["a2"][9][9].as_str(), Some("x"));

    let Err(LoadError::AliasExpansionLimit { mark }) = parse(&nested_aliases(9)) else {
        panic!("nested aliases were expanded without a limit");
    };
    assert!(mark.line() <= 9);
}

#[test]
fn test_unknown_anchor() {
    let Err(LoadError::UnknownAnchor { name, mark }) = parse("a: *nope") else {
        panic!("the alias refers to nothing");
    };
    assert_eq!(name, "nope");
    assert_eq!(mark.line(), 1);
}

#[test]
fn test_anchors_do_not_cross_documents() {
    assert!(matches!(
        parse_all("--- &a x\n--- *a\n"),
        Err(LoadError::UnknownAnchor { .. })
    ));
}

#[test]
fn test_skipped_aliases() {
    let s = indoc! {"
        seq: [&a x, *a, y]
        map:
          key: &b v
          other: *b
          *b : dropped
          kept: k
    "};
    let mut loader = Loader::new();
    loader.resolve_aliases(false);
    let docs = loader.load_from_str(s).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["seq"], Node::from(vec!["x", "y"]));
    assert_eq!(
        docs[0]["map"],
        mapping([("key", "v".into()), ("kept", "k".into())])
    );
}

#[test]
fn test_non_scalar_key() {
    let Err(LoadError::NonScalarKey { kind, mark }) = parse("? [a, b]\n: c\n") else {
        panic!("a sequence cannot be a key");
    };
    assert_eq!(kind, EventKind::SequenceStart);
    assert_eq!(mark.line(), 1);

    assert!(matches!(
        parse("{{a: b}: c}"),
        Err(LoadError::NonScalarKey {
            kind: EventKind::MappingStart,
            ..
        })
    ));
    assert!(matches!(
        parse("- &s [a]\n- {*s : c}"),
        Err(LoadError::NonScalarKey {
            kind: EventKind::Alias,
            ..
        })
    ));
}

#[test]
fn test_error_messages() {
    let error = parse("a: *nope").unwrap_err();
    assert!(error.to_string().starts_with("unknown anchor `nope` at byte "));
    let error = parse("[a: [b]").unwrap_err();
    assert!(error.to_string().contains(" at byte "));
}

#[test]
fn test_index() {
    let doc = parse("a: [b, c]").unwrap();
    assert!(doc["missing"].is_null());
    assert!(doc["a"][5].is_null());
    assert!(doc["a"]["not a mapping"].is_null());
    assert_eq!(doc.get("a").and_then(Node::as_sequence).map(Vec::len), Some(2));

    let mut doc = doc;
    doc["a"][0] = Node::Null;
    doc["new"] = "value".into();
    assert!(doc["a"][0].is_null());
    assert_eq!(doc["new"].as_str(), Some("value"));
}

#[test]
fn test_conversions() {
    assert_eq!(Node::from(5), Node::from("5"));
    assert_eq!(Node::from(-3_i64), Node::from("-3"));
    assert_eq!(Node::from(10.0), Node::from("10.00"));
    assert_eq!(Node::from(0.3_f32), Node::from("0.30"));
    assert_eq!(Node::from_float(2.0 / 3.0, 3), Node::from("0.667"));
    assert_eq!(Node::from(None::<&str>), Node::Null);
    assert_eq!(Node::from(Some("x")), Node::from("x"));
    assert_eq!(
        Node::from(vec![Some(1), None]),
        Node::Sequence(vec![Node::from("1"), Node::Null])
    );
}
