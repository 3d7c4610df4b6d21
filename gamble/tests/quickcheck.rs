#[macro_use]
extern crate quickcheck;

use quickcheck::TestResult;

use gamble::{marshal, parse, Node};

quickcheck! {
    fn test_check_weird_keys(xs: Vec<String>) -> TestResult {
        let input = Node::Sequence(xs.into_iter().map(Node::from).collect());
        let out_str = match marshal(&input) {
            Ok(out_str) => out_str,
            Err(err) => return TestResult::error(err.to_string()),
        };
        match parse(&out_str) {
            Ok(output) => TestResult::from_bool(input == output),
            Err(err) => TestResult::error(err.to_string()),
        }
    }

    fn test_check_weird_mappings(entries: Vec<(String, Option<String>)>) -> TestResult {
        let input: Node = entries.into_iter().collect();
        let out_str = match marshal(&input) {
            Ok(out_str) => out_str,
            Err(err) => return TestResult::error(err.to_string()),
        };
        match parse(&out_str) {
            Ok(output) => TestResult::from_bool(input == output),
            Err(err) => TestResult::error(err.to_string()),
        }
    }
}
