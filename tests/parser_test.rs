use walox::parser::{
    formatter::{ProgramFormatter, SExpressionFormatter},
    Parser,
};

fn check(input: &str, expected: &str) {
    let formatter = SExpressionFormatter;
    let actual = match Parser::new(input).parse() {
        Ok(program) => formatter.format(&program),
        Err(errors) => errors
            .iter()
            .map(|error| formatter.format_error(error))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    assert_eq!(actual, expected, "Failed to parse {input:?}");
}

#[test]
fn smoke_test() {
    check("true;", "true");
}

#[test]
fn literals() {
    check("nil; false; 12.5; \"text\";", "nil\nfalse\n12.5\ntext");
}

#[test]
fn unary_and_grouping() {
    check("!!true;", "(! (! true))");
    check("-(1 + 2);", "(- (group (+ 1.0 2.0)))");
}

#[test]
fn binary_precedence() {
    check("1 * 2 + 3 / 4 - 5;", "(- (+ (* 1.0 2.0) (/ 3.0 4.0)) 5.0)");
    check("1 < 2 == 3 >= 4;", "(== (< 1.0 2.0) (>= 3.0 4.0))");
    check("a = b or c and d;", "(= a (or b (and c d)))");
}

#[test]
fn calls() {
    check("f();", "(call f)");
    check("f(1)(2, 3);", "(call (call f 1.0) 2.0 3.0)");
    check("-f(x);", "(- (call f x))");
}

#[test]
fn statements() {
    check("var x;", "(var x)");
    check("{ var x = 1; print x; }", "(block (var x 1.0) (print x))");
    check("while (x) x = x - 1;", "(while x (= x (- x 1.0)))");
    check("fun f() { return; }", "(fun f () (return))");
}

#[test]
fn for_loop_desugaring() {
    check(
        "for (var i = 0; i < 2; i = i + 1) print i;",
        "(block (var i 0.0) (while (< i 2.0) (block (print i) (= i (+ i 1.0)))))",
    );
    check("for (;;) print 1;", "(while true (print 1.0))");
}

#[test]
fn syntax_errors() {
    check("print (1;", "[Line 1] Error at ';': Expected ')' after expression.");
    check("var 1 = 2;", "[Line 1] Error at '1': Expected variable name.");
    check("if true) print 1;", "[Line 1] Error at 'true': Expected '(' after 'if'.");
    check("{ print 1;", "[Line 1] Error at end: Expected '}' after block.");
    check("return 1", "[Line 1] Error at end: Expected ';' after return value.");
}

#[test]
fn recovery_continues_at_next_statement() {
    check(
        "print 1 +;\nvar a = ;\nprint 3;\nfun (x) {}",
        "[Line 1] Error at ';': Expected expression.
[Line 2] Error at ';': Expected expression.
[Line 4] Error at '(': Expected function name.",
    );
}
