use proptest::prelude::*;

use walox::{
    interpreter::{context::BufferedContext, TreeWalkInterpreter},
    parser::Parser,
    value::{formatter::BasicFormatter, formatter::ValueFormatter, Literal},
};

fn evaluate(input: &str) -> String {
    let mut parser = Parser::new(input);
    let expr = parser.parse_expression().expect("valid expression");
    let mut context = BufferedContext::new();
    let mut interpreter = TreeWalkInterpreter::new(&mut context);
    let formatter = BasicFormatter;
    match interpreter.evaluate(&expr) {
        Ok(ref value) => formatter.format(value),
        Err(ref error) => formatter.format_error(error),
    }
}

fn evaluate_number(input: &str) -> f64 {
    let mut parser = Parser::new(input);
    let expr = parser.parse_expression().expect("valid expression");
    let mut context = BufferedContext::new();
    let mut interpreter = TreeWalkInterpreter::new(&mut context);
    match interpreter.evaluate(&expr) {
        Ok(Literal::Number(value)) => value,
        other => panic!("{input} did not evaluate to a number: {other:?}"),
    }
}

#[test]
fn smoke_test() {
    assert_eq!(evaluate("true"), "true");
}

#[test]
fn arithmetic_and_strings() {
    assert_eq!(evaluate("(1 + 2) * 3 - 4 / 8"), "8.5");
    assert_eq!(evaluate("\"foo\" + \"bar\""), "foobar");
    assert_eq!(
        evaluate("\"foo\" + 1"),
        "[Line 1] Error '+': Operands must be two numbers or two strings."
    );
    assert_eq!(evaluate("-\"foo\""), "[Line 1] Error '-': Operands must be numbers.");
    assert_eq!(evaluate("1 < \"2\""), "[Line 1] Error '<': Operands must be numbers.");
}

#[test]
fn truthiness() {
    assert_eq!(evaluate("!nil"), "true");
    assert_eq!(evaluate("!false"), "true");
    assert_eq!(evaluate("!0"), "false");
    assert_eq!(evaluate("!\"\""), "false");
}

#[test]
fn equality() {
    assert_eq!(evaluate("1 == \"1\""), "false");
    assert_eq!(evaluate("nil == false"), "false");
    assert_eq!(evaluate("1 == 1.0"), "true");
    assert_eq!(evaluate("\"a\" != \"a\""), "false");
}

#[test]
fn division_by_zero_is_not_an_error() {
    assert_eq!(evaluate_number("1 / 0"), f64::INFINITY);
    assert!(evaluate_number("0 / 0").is_nan());
}

#[test]
fn native_clock_is_callable() {
    assert_eq!(evaluate("clock"), "<fn clock>");
    assert!(evaluate_number("clock()") > 0.0);
}

fn same_number(lhs: f64, rhs: f64) -> bool {
    lhs.to_bits() == rhs.to_bits() || (lhs.is_nan() && rhs.is_nan())
}

proptest! {
    #[test]
    fn arithmetic_follows_ieee(a in 0.0f64..1.0e9, b in 0.0f64..1.0e9) {
        let sum = evaluate_number(&format!("{a} + {b}"));
        prop_assert!(same_number(sum, a + b), "sum mismatch: {} vs {}", sum, a + b);
        let difference = evaluate_number(&format!("{a} - {b}"));
        prop_assert!(same_number(difference, a - b), "difference mismatch: {} vs {}", difference, a - b);
        let product = evaluate_number(&format!("{a} * {b}"));
        prop_assert!(same_number(product, a * b), "product mismatch: {} vs {}", product, a * b);
        let quotient = evaluate_number(&format!("{a} / {b}"));
        prop_assert!(same_number(quotient, a / b), "quotient mismatch: {} vs {}", quotient, a / b);
        let negated = evaluate_number(&format!("-{a} / {b}"));
        prop_assert!(same_number(negated, -a / b), "negated quotient mismatch: {} vs {}", negated, -a / b);
    }

    #[test]
    fn comparisons_follow_ieee(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
        let expr = format!("({a}) < ({b})");
        // Negative literals are parsed as negation of a positive literal.
        let expected = if a < b { "true" } else { "false" };
        prop_assert_eq!(evaluate(&expr), expected);
        prop_assert_eq!(evaluate(&format!("({a}) == ({a})")), "true");
    }
}
