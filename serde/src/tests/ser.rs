use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{de::from_str, error::SerializeError, ser::to_string, Serializer};

#[test]
fn test_struct() {
    #[derive(Serialize)]
    struct Test {
        int: u32,
        seq: Vec<&'static str>,
    }

    let test = Test {
        int: 1,
        seq: vec!["a", "b"],
    };
    let expected = r###"---
int: 1
seq:
- a
- b
...
"###;
    assert_eq!(to_string(&test).unwrap(), expected);
}

#[test]
fn test_enum() {
    #[derive(Serialize)]
    enum E {
        Unit,
        Newtype(u32),
        Tuple(u32, u32),
        Struct { a: u32 },
    }

    let u = E::Unit;
    let expected = "--- Unit\n...\n";
    assert_eq!(to_string(&u).unwrap(), expected);

    let n = E::Newtype(1);
    let expected = "---\nNewtype: 1\n...\n";
    assert_eq!(to_string(&n).unwrap(), expected);

    let t = E::Tuple(1, 2);
    let expected = r###"---
Tuple:
- 1
- 2
...
"###;
    assert_eq!(to_string(&t).unwrap(), expected);

    let s = E::Struct { a: 1 };
    let expected = r#"---
Struct:
  a: 1
...
"#;
    assert_eq!(to_string(&s).unwrap(), expected);
}

#[test]
fn test_enum_roundtrip() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    enum E {
        Unit,
        Newtype(u32),
        Tuple(u32, u32),
        Struct { a: u32 },
    }

    let v = vec![
        E::Unit,
        E::Newtype(1),
        E::Tuple(1, 2),
        E::Struct { a: 1 },
        E::Newtype(2),
        E::Tuple(3, 4),
        E::Struct { a: 2 },
    ];

    let yaml = to_string(&v).unwrap();
    assert!(yaml.contains("Newtype: 1"));
    assert_eq!(from_str::<Vec<E>>(&yaml).unwrap(), v);
}

#[test]
fn it_writes_multiline_strings() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct S {
        value: String,
    }

    let s = S {
        value: String::from("foo\nbar\nbaz"),
    };

    let yaml = to_string(&s).unwrap();
    assert_eq!(from_str::<S>(&yaml).unwrap(), s);
}

#[test]
fn it_quotes_strings_with_json_chars() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct S {
        value: String,
    }

    let s = S {
        value: String::from("['foo', 'bar', 'baz']"), // looks like json, but we want the string
    };

    let yaml = to_string(&s).unwrap();
    assert!(!yaml.contains("value: ['foo'"));
    assert_eq!(from_str::<S>(&yaml).unwrap(), s);
}

#[test]
fn it_quotes_strings_that_read_as_null() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct S {
        a: Option<String>,
        b: Option<String>,
        c: Option<String>,
    }

    let s = S {
        a: Some(String::from("null")),
        b: Some(String::new()),
        c: None,
    };

    let yaml = to_string(&s).unwrap();
    assert_eq!(yaml, "---\na: \"null\"\nb: \"\"\nc: null\n...\n");
    assert_eq!(from_str::<S>(&yaml).unwrap(), s);
}

#[test]
fn it_serializes_other_types() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct NewTypeStruct(u32);

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct TupleStruct(u32, String);

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct UnitStruct;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Test {
        t: (u32, char),
        n: NewTypeStruct,
        ts: TupleStruct,
        u: UnitStruct,
        b: bool,
        i: i64,
    }

    let test = Test {
        t: (1, 'c'),
        n: NewTypeStruct(2),
        ts: TupleStruct(3, String::from("four")),
        u: UnitStruct,
        b: true,
        i: -5,
    };

    let expected = r#"---
t:
- 1
- c
n: 2
ts:
- 3
- four
u: null
b: true
i: -5
...
"#;
    let yaml = to_string(&test).unwrap();
    assert_eq!(yaml, expected);
    assert_eq!(from_str::<Test>(&yaml).unwrap(), test);
}

#[test]
fn it_writes_floats_with_two_decimals() {
    let map = BTreeMap::from([
        ("half", 0.5),
        ("ten", 10.0),
        ("third", 1.0 / 3.0),
        ("inf", f64::INFINITY),
        ("ninf", f64::NEG_INFINITY),
    ]);

    assert_eq!(
        to_string(&map).unwrap(),
        "---\nhalf: 0.50\ninf: .inf\nninf: -.inf\nten: 10.00\nthird: 0.33\n...\n"
    );

    let nan: f64 = from_str(&to_string(&f64::NAN).unwrap()).unwrap();
    assert!(nan.is_nan());
}

#[test]
fn it_sets_the_float_precision() {
    let mut serializer = Serializer::new();
    serializer.float_precision(3);
    assert_eq!(
        serializer.to_string(&(2.0_f64 / 3.0)).unwrap(),
        "--- 0.667\n...\n"
    );

    serializer.float_precision(0);
    serializer.marshaller().explicit_document_markers(false);
    assert_eq!(serializer.to_string(&[7.2_f64]).unwrap(), "- 7\n");
}

#[test]
fn it_builds_nodes() {
    #[derive(Serialize)]
    struct Test {
        name: &'static str,
        tags: Vec<u8>,
        missing: Option<u8>,
    }

    let node = crate::to_node(&Test {
        name: "seas",
        tags: vec![1, 2],
        missing: None,
    })
    .unwrap();

    assert_eq!(node["name"].as_str(), Some("seas"));
    assert_eq!(node["tags"][1].as_str(), Some("2"));
    assert!(node["missing"].is_null());
}

#[test]
fn it_rejects_unsupported_values() {
    let err = to_string(&Bytes(b"raw")).expect_err("Should not serialize");
    assert!(matches!(err, SerializeError::UnsupportedType("bytes")));
    assert_eq!(err.to_string(), "error marshaling unknown type: bytes");

    let map = HashMap::from([(vec![1_u8], 1_u8)]);
    let err = to_string(&map).expect_err("Should not serialize");
    assert!(matches!(err, SerializeError::KeyMustBeAString));
}

/// A value that serializes through `serialize_bytes`.
struct Bytes(&'static [u8]);

impl Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

#[test]
fn it_roundtrips_json_values() {
    let value = json!({
        "name": "gamble",
        "tags": ["yaml", "serde"],
        "nested": {"key": "value", "empty": ""},
        "count": 3,
    });

    let yaml = to_string(&value).unwrap();
    let back: serde_json::Value = from_str(&yaml).unwrap();
    assert_eq!(back, value);
}

#[test]
fn it_writes_map_keys_from_scalars() {
    let map = BTreeMap::from([(1_u32, "one"), (2, "two")]);
    let expected = "---\n1: one\n2: two\n...\n";
    assert_eq!(to_string(&map).unwrap(), expected);

    let back: BTreeMap<u32, String> = from_str(expected).unwrap();
    assert_eq!(back[&2], "two");
}
