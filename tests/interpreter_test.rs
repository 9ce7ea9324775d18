use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use color_eyre::{eyre::Context, Result};
use walox::{
    interpreter::{context::BufferedContext, TreeWalkInterpreter},
    parser::Parser,
    value::{error::ErrorCategory, Literal},
};

#[test]
fn test_assignment() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/assignment"))
}

#[test]
fn test_block() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/block"))
}

#[test]
fn test_bool() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/bool"))
}

#[test]
fn test_call() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/call"))
}

#[test]
fn test_closure() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/closure"))
}

#[test]
fn test_comments() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/comments"))
}

#[test]
fn test_for() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/for"))
}

#[test]
fn test_function() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/function"))
}

#[test]
fn test_if() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/if"))
}

#[test]
fn test_logical_operator() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/logical_operator"))
}

#[test]
fn test_nil() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/nil"))
}

#[test]
fn test_number() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/number"))
}

#[test]
fn test_operator() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/operator"))
}

#[test]
fn test_precedence() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/precedence"))
}

#[test]
fn test_return() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/return"))
}

#[test]
fn test_string() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/string"))
}

#[test]
fn test_variable() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/variable"))
}

#[test]
fn test_while() -> Result<()> {
    test_engine(Path::new("./test_data/interpreter/while"))
}

#[test]
fn error_inside_call_restores_global_scope() {
    let source = "fun f() { var local = 1; return local + nil; }\nf();";
    let program = Parser::new(source).parse().expect("valid program");
    let mut context = BufferedContext::new();
    let mut interpreter = TreeWalkInterpreter::new(&mut context);

    let error = interpreter.run(&program).unwrap_err();
    assert_eq!(error.category(), ErrorCategory::TypeError);
    assert_eq!(error.code(), "RT003");
    assert_eq!(
        error.to_string(),
        "[Line 1] Error '+': Operands must be two numbers or two strings."
    );
    assert!(interpreter.environment().same_scope(interpreter.globals()));
    assert!(interpreter.environment().is_global());
}

#[test]
fn error_categories() {
    let cases = [
        ("-nil;", ErrorCategory::TypeError),
        ("missing;", ErrorCategory::NameError),
        ("missing = 1;", ErrorCategory::NameError),
        ("nil();", ErrorCategory::TypeError),
        ("clock(1, 2);", ErrorCategory::ArityError),
    ];
    for (source, category) in cases {
        let program = Parser::new(source).parse().expect("valid program");
        let mut context = BufferedContext::new();
        let mut interpreter = TreeWalkInterpreter::new(&mut context);
        let error = interpreter.run(&program).unwrap_err();
        assert_eq!(error.category(), category, "wrong category for {source}");
    }
}

#[test]
fn unbounded_recursion_is_a_runtime_error() {
    let program = Parser::new("fun f(n) { return f(n + 1); }\nf(0);")
        .parse()
        .expect("valid program");
    let mut context = BufferedContext::new();
    let mut interpreter = TreeWalkInterpreter::with_max_call_depth(&mut context, 32);

    let error = interpreter.run(&program).unwrap_err();
    assert_eq!(error.category(), ErrorCategory::RecursionError);
    assert_eq!(error.code(), "RT007");
    assert_eq!(error.to_string(), "[Line 1] Error ')': Stack overflow.");
    assert_eq!(interpreter.call_depth(), 0);
    assert!(interpreter.environment().is_global());

    let program = Parser::new("print f;").parse().expect("valid program");
    interpreter.run(&program).expect("interpreter is still usable");
    assert_eq!(context.into_data(), "<fn f>\n");
}

#[test]
fn recursion_within_call_limit_succeeds() {
    let source = "fun down(n) { if (n == 0) return 0; return down(n - 1); }\nprint down(30);";
    let program = Parser::new(source).parse().expect("valid program");
    let mut context = BufferedContext::new();
    {
        let mut interpreter = TreeWalkInterpreter::with_max_call_depth(&mut context, 32);
        interpreter.run(&program).expect("program runs");
    }
    assert_eq!(context.into_data(), "0\n");
}

#[test]
fn default_call_limit_stops_before_native_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let program = Parser::new("fun f() { return f(); }\nf();")
                .parse()
                .expect("valid program");
            let mut context = BufferedContext::new();
            let mut interpreter = TreeWalkInterpreter::new(&mut context);
            interpreter.run(&program).unwrap_err().code()
        })
        .expect("spawn interpreter thread");
    assert_eq!(handle.join().expect("no panic"), "RT007");
}

#[test]
fn result_holds_last_expression_value() {
    let program = Parser::new("var a = 2; a * 21;")
        .parse()
        .expect("valid program");
    let mut context = BufferedContext::new();
    let mut interpreter = TreeWalkInterpreter::new(&mut context);
    interpreter.run(&program).expect("program runs");

    assert!(matches!(interpreter.result(), Literal::Number(v) if *v == 42.0));
    assert!(matches!(interpreter.into_result(), Literal::Number(v) if v == 42.0));
}

#[test]
fn interpreter_state_persists_between_runs() {
    let mut context = BufferedContext::new();
    {
        let mut interpreter = TreeWalkInterpreter::new(&mut context);
        for line in ["var count = 1;", "count = count + 1;", "print count;"] {
            let program = Parser::new(line).parse().expect("valid program");
            interpreter.run(&program).expect("program runs");
        }
    }
    assert_eq!(context.into_data(), "2\n");
}

struct TestCase {
    name: String,
    source: String,
    output: String,
    compiler_errors: String,
    runtime_errors: String,
}

impl TestCase {
    pub fn check(&self) {
        let program = match Parser::new(&self.source).parse() {
            Ok(program) => program,
            Err(errors) => {
                let actual = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                assert_eq!(
                    self.compiler_errors, actual,
                    "Failed test {} at compilation stage.",
                    self.name,
                );
                return;
            }
        };
        assert!(
            self.compiler_errors.is_empty(),
            "Test {} expected compilation errors.",
            self.name
        );

        let mut context = BufferedContext::new();
        let mut interpreter = TreeWalkInterpreter::new(&mut context);
        let runtime_errors = match interpreter.run(&program) {
            Ok(()) => String::new(),
            Err(error) => format!("[Line {}] {}", error.line(), error.kind),
        };
        assert_eq!(
            self.runtime_errors, runtime_errors,
            "Failed test {} at runtime.",
            self.name,
        );

        let output = context.into_data();
        assert_eq!(self.output, output, "Failed test {} at print.", self.name);
    }
}

fn test_engine(input_dir: &Path) -> Result<()> {
    let mut failures = Vec::new();
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let path = entry?.path();
        if path.extension().map_or(true, |extension| extension != "lox") {
            continue;
        }

        let test_case = parse_test_case(&path)?;
        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            failures.push(test_case.name);
        }
    }

    assert!(failures.is_empty(), "Failed test cases: {failures:?}");
    Ok(())
}

fn parse_test_case(input_path: &Path) -> Result<TestCase> {
    let name = input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let input = read_to_string(input_path).context("Failed to open input test data file")?;

    let mut expected_outputs = Vec::new();
    let mut expected_compiler_errors = Vec::new();
    let mut expected_runtime_errors = Vec::new();

    for (line_index, line) in input.lines().enumerate() {
        let line_number = line_index + 1;
        if let Some((_, expected)) = line.split_once("// expect runtime error:") {
            expected_runtime_errors.push(format!("[Line {line_number}] {}", expected.trim()));
        } else if let Some((_, expected)) = line.split_once("// expect:") {
            expected_outputs.push(expected.trim().to_string());
        } else if let Some((_, expected)) = line.split_once("// Error") {
            expected_compiler_errors.push(format!("[Line {line_number}] Error{}", expected.trim_end()));
        } else if let Some((_, body)) = line.split_once("// [line ") {
            if let Some((reported_line, message)) = body.split_once("] ") {
                expected_compiler_errors.push(format!("[Line {reported_line}] {}", message.trim()));
            }
        }
    }

    expected_outputs.push(String::new());
    Ok(TestCase {
        name,
        source: input,
        output: expected_outputs.join("\n"),
        compiler_errors: expected_compiler_errors.join("\n"),
        runtime_errors: expected_runtime_errors.join("\n"),
    })
}
