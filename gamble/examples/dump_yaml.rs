use gamble::{parse_all, Node};
use std::env;
use std::fs::File;
use std::io::prelude::*;

fn print_indent(indent: usize) {
    for _ in 0..indent {
        print!("    ");
    }
}

fn dump_node(doc: &Node, indent: usize) {
    match doc {
        Node::Sequence(v) => {
            for x in v {
                dump_node(x, indent + 1);
            }
        }
        Node::Mapping(h) => {
            for (k, v) in h {
                print_indent(indent);
                println!("{k:?}:");
                dump_node(v, indent + 1);
            }
        }
        Node::String(s) => {
            print_indent(indent);
            println!("{s:?}");
        }
        Node::Null => {
            print_indent(indent);
            println!("null");
        }
    }
}

fn main() {
    let args: Vec<_> = env::args().collect();
    let mut f = File::open(&args[1]).unwrap();
    let mut s = String::new();
    f.read_to_string(&mut s).unwrap();

    let docs = parse_all(&s).unwrap();
    for doc in &docs {
        println!("---");
        dump_node(doc, 0);
    }
}
