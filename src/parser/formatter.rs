use super::{
    expression::{Expression, ExpressionAtom, ExpressionAtomKind, InfixShortCircuitOperator, PrefixOperator},
    statement::Statement,
    ParserError, ParserErrorKind, Program,
};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

pub trait ProgramFormatter {
    fn format(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugProgramFormatter;

impl ProgramFormatter for DebugProgramFormatter {
    fn format(&self, program: &Program) -> String {
        program
            .iter()
            .map(|statement| format!("{statement:?}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// One S-expression per top level statement.
pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_atom(atom: &ExpressionAtom) -> String {
        match atom.kind {
            ExpressionAtomKind::Number(v) => format!("{v:?}"),
            ExpressionAtomKind::Bool(v) => format!("{v}"),
            ExpressionAtomKind::Nil => "nil".into(),
            ExpressionAtomKind::Identifier(ref name) => format!("{name}"),
            ExpressionAtomKind::StringLiteral(ref v) => format!("{v}"),
        }
    }

    pub fn format_expression(expr: &Expression) -> String {
        match expr {
            Expression::Atom(atom) => Self::format_atom(atom),
            Expression::Group { inner } => format!("(group {})", Self::format_expression(inner)),
            Expression::Prefix { operator, rhs, .. } => {
                let symbol = match operator {
                    PrefixOperator::Bang => "!",
                    PrefixOperator::Minus => "-",
                };
                format!("({symbol} {})", Self::format_expression(rhs))
            }
            Expression::Infix {
                operator, lhs, rhs, ..
            } => format!(
                "({} {} {})",
                operator.symbol(),
                Self::format_expression(lhs),
                Self::format_expression(rhs)
            ),
            Expression::InfixShortCircuit { operator, lhs, rhs } => {
                let symbol = match operator {
                    InfixShortCircuitOperator::And => "and",
                    InfixShortCircuitOperator::Or => "or",
                };
                format!(
                    "({symbol} {} {})",
                    Self::format_expression(lhs),
                    Self::format_expression(rhs)
                )
            }
            Expression::InfixAssignment { lhs, rhs } => {
                format!("(= {lhs} {})", Self::format_expression(rhs))
            }
            Expression::Call {
                callee, arguments, ..
            } => {
                let mut buffer = format!("(call {}", Self::format_expression(callee));
                for argument in arguments {
                    buffer.push(' ');
                    buffer.push_str(&Self::format_expression(argument));
                }
                buffer.push(')');
                buffer
            }
        }
    }

    fn format_body(body: &[Statement]) -> String {
        body.iter()
            .map(|statement| format!(" {}", Self::format_statement(statement)))
            .collect()
    }

    pub fn format_statement(statement: &Statement) -> String {
        match statement {
            Statement::VariableDecl(decl) => match decl.initial {
                Some(ref initial) => {
                    format!("(var {} {})", decl.name, Self::format_expression(initial))
                }
                None => format!("(var {})", decl.name),
            },
            Statement::FunctionDecl(decl) => {
                let parameters = decl
                    .parameters
                    .iter()
                    .map(|p| p.text.as_ref())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(
                    "(fun {} ({parameters}){})",
                    decl.name,
                    Self::format_body(&decl.body)
                )
            }
            Statement::Expression(statement) => Self::format_expression(&statement.expr),
            Statement::Print(statement) => {
                format!("(print {})", Self::format_expression(&statement.expr))
            }
            Statement::Block(block) => format!("(block{})", Self::format_body(&block.body)),
            Statement::If(statement) => {
                let mut buffer = format!(
                    "(if {} {}",
                    Self::format_expression(&statement.condition),
                    Self::format_statement(&statement.success)
                );
                if let Some(ref failure) = statement.failure {
                    buffer.push(' ');
                    buffer.push_str(&Self::format_statement(failure));
                }
                buffer.push(')');
                buffer
            }
            Statement::While(statement) => format!(
                "(while {} {})",
                Self::format_expression(&statement.condition),
                Self::format_statement(&statement.body)
            ),
            Statement::Return(statement) => match statement.value {
                Some(ref value) => format!("(return {})", Self::format_expression(value)),
                None => "(return)".into(),
            },
        }
    }
}

impl ProgramFormatter for SExpressionFormatter {
    fn format(&self, program: &Program) -> String {
        program
            .iter()
            .map(Self::format_statement)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_error(&self, error: &ParserError) -> String {
        error.to_string()
    }
}

pub struct PrettyProgramFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyProgramFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl ProgramFormatter for PrettyProgramFormatter<'_> {
    fn format(&self, program: &Program) -> String {
        SExpressionFormatter.format(program)
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path.to_string_lossy();
        let path = path.as_ref();
        let range = error.span.range();
        let label = match (&error.kind, &error.lexeme) {
            (ParserErrorKind::LexicalError(_), _) => "Not valid in Lox source".to_string(),
            (_, Some(lexeme)) => format!("Unexpected {}", lexeme.fg(Color::BrightRed)),
            (_, None) => "Unexpected end of input".to_string(),
        };

        let mut output = Vec::new();
        let written = Report::build(ReportKind::Error, (path, range.clone()))
            .with_code(error.code())
            .with_message(error.kind.to_string())
            .with_label(
                Label::new((path, range))
                    .with_message(label)
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
