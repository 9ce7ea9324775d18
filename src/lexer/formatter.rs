use super::{Lexer, LexicalError, LexicalErrorKind, Token, TokenKind};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

/// Prints one token per line as `KIND lexeme literal`.
pub struct BasicFormatter<'src> {
    text: &'src str,
}

impl<'src> ToFormatter<BasicFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter<'src> {
        BasicFormatter {
            text: self.get_source(),
        }
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let lexeme = &self.text[token.span.range()];
        match token.kind {
            TokenKind::Eof => "EOF  null".into(),
            TokenKind::NumericLiteral => {
                let value: f64 = lexeme.parse().unwrap_or(f64::NAN);
                format!("NUMBER {lexeme} {value:?}")
            }
            TokenKind::StringLiteral => {
                let value = lexeme
                    .get(1..lexeme.len().saturating_sub(1))
                    .unwrap_or_default();
                format!("STRING {lexeme} {value}")
            }
            kind => format!("{kind} {lexeme} null"),
        }
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        let line = error.line;
        match error.kind {
            LexicalErrorKind::Unrecognized(c) => {
                format!("[line {line}] Error: Unexpected character: {c}")
            }
            LexicalErrorKind::UnclosedString => {
                format!("[line {line}] Error: Unterminated string.")
            }
        }
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}
