// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Full source-to-value scenarios through the lexer/parser/evaluator
//! pipeline, covering `spec.md` §8.2's end-to-end scenarios plus a few
//! extra cross-module cases that don't fit naturally inside a single
//! `eval/*.rs` unit test module.

use wick_lang::parser::Parser;
use wick_lang::value::Value;
use wick_lang::writer::CollectingWriter;
use wick_lang::Evaluator;

fn run(src: &str) -> Value {
    let program = Parser::parse_program(src).expect("parse error");
    let mut evaluator = Evaluator::new();
    let mut writer = CollectingWriter::new();
    evaluator.eval_program(&program, &mut writer)
}

fn run_with_output(src: &str) -> (Value, String) {
    let program = Parser::parse_program(src).expect("parse error");
    let mut evaluator = Evaluator::new();
    let mut writer = CollectingWriter::new();
    let result = evaluator.eval_program(&program, &mut writer);
    (result, writer.into_string())
}

#[test]
fn closure_counter_keeps_private_state_across_calls() {
    let result = run(
        "func mk() { var n = 0; func inc() { n = n + 1; return n; } return inc; } \
         var c = mk(); c(); c(); c();",
    );
    assert_eq!(result, Value::Integer(3));
}

#[test]
fn enum_arithmetic_crosses_enum_types() {
    let result = run(
        "enum Color { RED, GREEN, BLUE } enum Size { SMALL, MEDIUM, LARGE } \
         Color.GREEN + Size.MEDIUM",
    );
    assert_eq!(result, Value::Integer(2));
}

#[test]
fn foreach_over_descending_range() {
    let result = run("var s = 0; foreach (i in 5...1) { s = s + i; } s");
    assert_eq!(result, Value::Integer(15));
}

#[test]
fn switch_with_fallthrough_into_break() {
    let result = run(
        "var m = 3; var season = \"\"; \
         switch(m) { case 3: season = \"Spring\"; case 6: season = \"Summer\"; break; } season",
    );
    assert_eq!(result, Value::new_string("Summer"));
}

#[test]
fn switch_falls_through_into_default_without_a_break() {
    let result = run(
        "var m = 99; var out = \"\"; \
         switch(m) { case 1: out = \"one\"; default: out = out + \"-default\"; } out",
    );
    assert_eq!(result, Value::new_string("-default"));
}

#[test]
fn negative_index_and_slice_on_arrays() {
    let (last, _) = run_with_output("var a = [10, 20, 30, 40, 50]; a[-1]");
    assert_eq!(last, Value::Integer(50));

    let middle = run("var a = [10, 20, 30, 40, 50]; a[1:-1]");
    match middle {
        Value::Array(items) => assert_eq!(
            &*items.borrow(),
            &vec![Value::Integer(20), Value::Integer(30), Value::Integer(40)]
        ),
        other => panic!("expected Array, got {:?}", other),
    }
}

#[test]
fn method_with_this_binds_and_mutates_instance_state() {
    let result = run(
        "struct P { var x = 0; func set(v) { this.x = v; } func get() { return this.x; } } \
         var p = new P(); p.set(42); p.get()",
    );
    assert_eq!(result, Value::Integer(42));
}

#[test]
fn struct_init_method_runs_on_construction() {
    let result = run(
        "struct Point { var x = 0; var y = 0; \
         func init(px, py) { this.x = px; this.y = py; } \
         func sum() { return this.x + this.y; } } \
         var p = new Point(3, 4); p.sum()",
    );
    assert_eq!(result, Value::Integer(7));
}

#[test]
fn package_import_and_call() {
    let result = run("import math; math.max(3, 7, 2)");
    assert_eq!(result, Value::Integer(7));
}

#[test]
fn print_and_println_write_to_the_sink_not_stdout() {
    let (_, output) = run_with_output("print(\"a\", 1); println(); print(\"b\");");
    assert_eq!(output, "a 1\nb");
}

#[test]
fn identifier_not_found_surfaces_as_the_top_level_result() {
    let result = run("doesNotExist + 1");
    match result {
        Value::Error(msg) => assert!(msg.contains("identifier not found")),
        other => panic!("expected Error, got {:?}", other),
    }
}

#[test]
fn range_indexing_matches_foreach_enumeration_order() {
    let result = run(
        "var r = 5...1; var out = []; foreach (i in r) { push(out, i); } \
         out[0] == r[0] && out[4] == r[4]",
    );
    assert_eq!(result, Value::Boolean(true));
}

#[test]
fn map_and_set_literals_round_trip_through_builtins() {
    let result = run("var m = {\"a\": 1, \"b\": 2}; keys(m)");
    match result {
        Value::Array(items) => assert_eq!(
            &*items.borrow(),
            &vec![Value::new_string("a"), Value::new_string("b")]
        ),
        other => panic!("expected Array, got {:?}", other),
    }
}
