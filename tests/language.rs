use std::fs;

use natrix::{error::{CollectingHandler, Error},
             source::Source};
use walkdir::WalkDir;

/// Runs a script and returns its output, together with any collected
/// diagnostics.
fn run_capturing(script: &str, arg: i64) -> (Result<String, Error>, Vec<String>) {
    let source = Source::from_string("<test>", script);
    let mut out = Vec::new();
    let mut handler = CollectingHandler::new();
    let result = natrix::interpret(&source, arg, &mut out, &mut handler);
    let result = result.map(|()| String::from_utf8(out).expect("output must be UTF-8 here"));
    (result, handler.messages)
}

fn run_with_arg(script: &str, arg: i64) -> Result<String, Error> {
    run_capturing(script, arg).0
}

fn run(script: &str) -> Result<String, Error> {
    run_with_arg(script, 0)
}

fn assert_output(script: &str, expected: &str) {
    match run(script) {
        Ok(output) => assert_eq!(output, expected, "script: {script}"),
        Err(e) => panic!("script failed: {script}\nerror: {e:?}"),
    }
}

fn assert_runtime_error(script: &str, message: &str) {
    match run(script) {
        Err(Error::Runtime(error)) => assert_eq!(error.to_string(), message, "script: {script}"),
        other => panic!("expected runtime error for: {script}\ngot: {other:?}"),
    }
}

fn assert_parse_error(script: &str, diagnostic: &str) {
    let (result, messages) = run_capturing(script, 0);
    assert!(matches!(result, Err(Error::Parse)), "expected parse error for: {script}");
    assert_eq!(messages, vec![diagnostic.to_string()], "script: {script}");
}

#[test]
fn factorial_of_arg() {
    let script = "n = arg\nfact = 1\nwhile n > 0:\n  fact = fact * n\n  n = n - 1\nprint(fact)\n";
    assert_eq!(run_with_arg(script, 5).unwrap(), "120\n");
    assert_eq!(run_with_arg(script, 0).unwrap(), "1\n");
    assert_eq!(run_with_arg(script, 20).unwrap(), "2432902008176640000\n");
}

#[test]
fn list_mutation() {
    assert_output("a = [\"Hello\", \"world!\"]\na[0] = \"Goodbye\"\nprint(a[0] + \" \" + a[1])\n",
                  "Goodbye world!\n");
}

#[test]
fn arithmetic_and_precedence() {
    assert_output("print(2 + 3 * 4)\n", "14\n");
    assert_output("print((10 - 3) * 6)\n", "42\n");
    assert_output("print(7 / 2)\n", "3\n");
    assert_output("print(10 - 2 - 3)\n", "5\n");
    assert_output("print(100 / 5 / 2)\n", "10\n");
}

#[test]
fn comparisons_yield_ints() {
    assert_output("print(1 < 2)\n", "1\n");
    assert_output("print(2 < 1)\n", "0\n");
    assert_output("print(2 <= 2)\n", "1\n");
    assert_output("print(3 >= 4)\n", "0\n");
    assert_output("print(3 == 3)\n", "1\n");
    assert_output("print(3 != 3)\n", "0\n");
}

#[test]
fn integer_arithmetic_wraps_around() {
    assert_output("print(9223372036854775807 + 1)\n", "-9223372036854775808\n");
    assert_output("print(0 - 9223372036854775807 - 1 - 1)\n", "9223372036854775807\n");
}

#[test]
fn string_concatenation() {
    assert_output("print(\"foo\" + \"bar\")\n", "foobar\n");
    assert_output("s = \"\"\nprint(s + \"x\")\n", "x\n");
}

#[test]
fn arg_defaults_to_zero() {
    assert_output("print(arg)\n", "0\n");
}

#[test]
fn reassignment_updates_binding() {
    assert_output("x = 1\nx = x + 1\nprint(x)\n", "2\n");
}

#[test]
fn while_loop_sums() {
    assert_output("i = 0\nsum = 0\nwhile i < 10:\n  i = i + 1\n  sum = sum + i\nprint(sum)\n",
                  "55\n");
    assert_output("while 0:\n  print(1)\nprint(2)\n", "2\n");
}

#[test]
fn if_elif_else_branches() {
    let script = "x = VALUE\nif x > 10:\n  print(\"big\")\nelif x > 5:\n  \
                  print(\"medium\")\nelse:\n  print(\"small\")\n";
    assert_output(&script.replace("VALUE", "11"), "big\n");
    assert_output(&script.replace("VALUE", "7"), "medium\n");
    assert_output(&script.replace("VALUE", "2"), "small\n");
}

#[test]
fn if_without_else_falls_through() {
    assert_output("if 0:\n  print(1)\nprint(2)\n", "2\n");
    assert_output("if 1:\n  pass\nprint(3)\n", "3\n");
}

#[test]
fn nested_lists_and_negative_indices() {
    assert_output("m = [[1, 2], [3, 4]]\nprint(m[1][0])\n", "3\n");
    assert_output("a = [10, 20, 30]\nprint(a[0 - 1])\n", "30\n");
    assert_output("a = [10, 20, 30]\nprint(a[0 - 3])\n", "10\n");
}

#[test]
fn list_literals_allow_trailing_comma() {
    assert_output("a = [1, 2, 3,]\nprint(a[2])\n", "3\n");
    assert_output("a = []\nprint(0)\n", "0\n");
}

#[test]
fn string_growth_under_collection_pressure() {
    // Hundreds of temporary strings force several collections while
    // the environment keeps the live ones reachable.
    let script = "s = \"\"\ni = 0\nwhile i < 300:\n  s = s + \"x\"\n  i = i + 1\nprint(i)\n";
    assert_output(script, "300\n");
}

#[test]
fn division_by_zero_is_fatal() {
    assert_runtime_error("x = 1 / 0\n", "Division by zero");
}

#[test]
fn undefined_variable_is_fatal() {
    assert_runtime_error("print(nope)\n", "Undefined variable: nope");
}

#[test]
fn oversized_literal_is_fatal_at_runtime() {
    assert_runtime_error("x = 99999999999999999999\n", "Integer literal too large");
    // Unreached literals never fault.
    assert_output("if 0:\n  x = 99999999999999999999\nprint(1)\n", "1\n");
}

#[test]
fn index_faults() {
    assert_runtime_error("a = [1, 2]\nprint(a[2])\n", "Index out of range");
    assert_runtime_error("a = [1, 2]\nprint(a[0 - 3])\n", "Index out of range");
    assert_runtime_error("a = [1, 2]\nprint(a[\"x\"])\n", "Index must be an integer");
    assert_runtime_error("a = [1, 2]\na[5] = 0\n", "Index out of range");
}

#[test]
fn subscript_requires_a_list() {
    assert_runtime_error("print(1[0])\n", "Subscripted value must be a list");
    assert_runtime_error("print(\"abc\"[0])\n", "Subscripted value must be a list");
    assert_runtime_error("x = 1\nx[0] = 2\n", "Subscripted value must be a list");
}

#[test]
fn condition_must_be_an_integer() {
    assert_runtime_error("while \"a\":\n  pass\n", "Condition must be an integer");
    assert_runtime_error("if [1]:\n  pass\n", "Condition must be an integer");
}

#[test]
fn mixed_operands_are_fatal() {
    assert_runtime_error("print(1 + \"a\")\n", "Operands must be integers");
    assert_runtime_error("print(\"a\" - \"b\")\n", "Operands must be integers");
    assert_runtime_error("print(\"a\" * 2)\n", "Operands must be integers");
}

#[test]
fn print_rejects_lists() {
    assert_runtime_error("print([1, 2])\n", "cannot print 'list' object");
}

#[test]
fn invalid_assignment_target_is_a_parse_error() {
    assert_parse_error("1 = 2\n", "error: 1:1-1: cannot assign to expression here");
    assert_parse_error("a + b = 2\n", "error: 1:1-5: cannot assign to expression here");
}

#[test]
fn chained_comparison_is_a_parse_error() {
    assert_parse_error("x = 1 < 2 < 3\n", "error: 1:11-1: expected end of line");
}

#[test]
fn parse_is_total() {
    // Either a program parses with zero diagnostics, or it fails with
    // at least one and never runs.
    let valid = ["pass\n", "x = 1\nprint(x)\n", "if 1:\n  pass\n"];
    for script in valid {
        let (result, messages) = run_capturing(script, 0);
        assert!(result.is_ok(), "script: {script}");
        assert!(messages.is_empty(), "script: {script}");
    }
    let invalid = ["", "(1\n", "while 1\n  pass\n", "print 1\n"];
    for script in invalid {
        let (result, messages) = run_capturing(script, 0);
        assert!(matches!(result, Err(Error::Parse)), "script: {script}");
        assert!(!messages.is_empty(), "script: {script}");
    }
}

#[test]
fn script_fixtures_match_expected_output() {
    let mut count = 0;

    for entry in WalkDir::new("tests/scripts").into_iter()
                                              .filter_map(Result::ok)
                                              .filter(|e| {
                                                  e.path().extension().is_some_and(|ext| {
                                                                          ext == "ntx"
                                                                      })
                                              })
    {
        let path = entry.path();
        let script = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        let expected = fs::read_to_string(path.with_extension("out"))
            .unwrap_or_else(|e| panic!("Missing expected output for {path:?}: {e}"));

        count += 1;
        match run(&script) {
            Ok(output) => assert_eq!(output, expected, "script {path:?}"),
            Err(e) => panic!("script {path:?} failed: {e:?}"),
        }
    }

    assert!(count > 0, "No script fixtures found in tests/scripts");
}
