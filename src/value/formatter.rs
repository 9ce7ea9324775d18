use super::error::{RuntimeError, RuntimeErrorKind};
use super::Literal;
use ariadne::{Color, ColorGenerator, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

pub trait ValueFormatter {
    fn format(&self, value: &Literal) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &Literal) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// Plain one line messages: `[Line N] Error '<lexeme>': <message>`.
pub struct BasicFormatter;

impl BasicFormatter {
    fn format_verbose(value: &Literal) -> String {
        match value {
            Literal::Number(v) => format!("Number({v})"),
            Literal::String(v) => format!("String(\"{v}\")"),
            Literal::Nil => "Nil".into(),
            Literal::Bool(v) => format!("Bool({v})"),
            Literal::Callable(fun) => format!("Callable({})", fun.name()),
        }
    }
}

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Literal) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        error.to_string()
    }
}

/// Annotated source reports rendered by ariadne.
pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }

    fn label_message(error: &RuntimeError) -> String {
        match &error.kind {
            RuntimeErrorKind::NonNumeric(v) => format!(
                "Type is {} instead of numeric",
                BasicFormatter::format_verbose(v).fg(Color::BrightRed)
            ),
            RuntimeErrorKind::NonNumerics(lhs, rhs) => format!(
                "One or both of {} and {} is not numeric",
                BasicFormatter::format_verbose(lhs).fg(Color::BrightRed),
                BasicFormatter::format_verbose(rhs).fg(Color::BrightRed),
            ),
            RuntimeErrorKind::NonAddable(lhs, rhs) => {
                let mut colors = ColorGenerator::new();
                format!(
                    "{} and {} are not both numbers or both strings",
                    BasicFormatter::format_verbose(lhs).fg(colors.next()),
                    BasicFormatter::format_verbose(rhs).fg(colors.next()),
                )
            }
            RuntimeErrorKind::UndefinedVariable(name) => {
                format!("{} has not been defined", name.fg(Color::BrightRed))
            }
            RuntimeErrorKind::InvalidCallee(callee) => format!(
                "{} is not callable",
                BasicFormatter::format_verbose(callee).fg(Color::BrightRed),
            ),
            RuntimeErrorKind::InvalidArgumentCount { actual, expected } => format!(
                "Callable has {} parameters but got {} arguments instead",
                expected.fg(Color::BrightCyan),
                actual.fg(Color::BrightRed),
            ),
            RuntimeErrorKind::StackOverflow { depth } => format!(
                "Call nesting exceeded {} levels",
                depth.fg(Color::BrightRed),
            ),
        }
    }
}

impl ValueFormatter for PrettyFormatter<'_> {
    fn format(&self, value: &Literal) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let path = self.path.to_string_lossy();
        let path = path.as_ref();
        let range = error.span().range();
        let mut output = Vec::new();
        let written = Report::build(ReportKind::Error, (path, range.clone()))
            .with_code(error.code())
            .with_message(format!("{}: {}", error.category(), error.kind))
            .with_label(
                Label::new((path, range))
                    .with_message(Self::label_message(error))
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output);

        match written {
            Ok(()) => String::from_utf8_lossy(&output).into_owned(),
            Err(_) => error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;
    use crate::string::Lexeme;

    fn error_at_plus() -> RuntimeError {
        let lexeme = Lexeme {
            text: "+".into(),
            line: 1,
            span: Span::new(8, 9),
        };
        RuntimeErrorKind::NonAddable(Literal::Number(1.0), Literal::Bool(true)).at(&lexeme)
    }

    #[test]
    fn basic_formatter_matches_display() {
        let error = error_at_plus();
        assert_eq!(
            BasicFormatter.format_error(&error),
            "[Line 1] Error '+': Operands must be two numbers or two strings."
        );
        assert_eq!(BasicFormatter.format(&Literal::Number(2.5)), "2.5");
    }

    #[test]
    fn pretty_formatter_includes_code() {
        let source = "print 1 + true;";
        let path = Path::new("test.lox");
        let report = PrettyFormatter::new(source, path).format_error(&error_at_plus());
        assert!(report.contains("RT003"));
        assert!(report.contains("test.lox"));
    }
}
