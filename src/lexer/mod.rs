mod error;
pub mod formatter;
mod token;

pub use error::{LexicalError, LexicalErrorKind};
use std::{iter::Peekable, str::CharIndices};
pub use token::{Span, Token, TokenKind, KEYWORD_HASHMAP};

#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    line: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_lexeme(&self, span: &Span) -> Option<&'src str> {
        self.source.get(span.range())
    }

    /// Byte offset of the next unread character.
    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(offset, _)| *offset)
            .unwrap_or(self.source.len())
    }

    fn eat_if(&mut self, expected: char) -> bool {
        match self.chars.peek() {
            Some((_, c)) if *c == expected => {
                self.chars.next();
                true
            }
            _ => false,
        }
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        let end = self.offset();
        Token {
            kind,
            span: Span::new(start, end),
            line: self.line,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let Some((start, c)) = self.chars.next() else {
                let end = self.source.len();
                return Ok(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(end, end),
                    line: self.line,
                });
            };

            let kind = match c {
                // Single character tokens
                '(' => TokenKind::LeftParenthesis,
                ')' => TokenKind::RightParenthesis,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                ';' => TokenKind::Semicolon,
                '*' => TokenKind::Star,
                // One or two character tokens
                '!' if self.eat_if('=') => TokenKind::BangEqual,
                '!' => TokenKind::Bang,
                '=' if self.eat_if('=') => TokenKind::EqualEqual,
                '=' => TokenKind::Equal,
                '<' if self.eat_if('=') => TokenKind::LessThanEqual,
                '<' => TokenKind::LessThan,
                '>' if self.eat_if('=') => TokenKind::GreaterThanEqual,
                '>' => TokenKind::GreaterThan,
                '/' if self.eat_if('/') => {
                    // Comments run until the end of the line; the newline is handled next loop.
                    while self.chars.next_if(|(_, c)| *c != '\n').is_some() {}
                    continue;
                }
                '/' => TokenKind::Slash,
                '\n' => {
                    self.line += 1;
                    continue;
                }
                '"' => return self.lex_string(start),
                '0'..='9' => return Ok(self.lex_number(start)),
                'a'..='z' | 'A'..='Z' | '_' => return Ok(self.lex_ident_or_keyword(start)),
                c if c.is_whitespace() => continue,
                c => {
                    return Err(LexicalError {
                        kind: LexicalErrorKind::Unrecognized(c),
                        span: Span::new(start, start + c.len_utf8()),
                        line: self.line,
                    })
                }
            };
            return Ok(self.token(kind, start));
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, LexicalError> {
        let line = self.line;
        while let Some((offset, c)) = self.chars.next() {
            match c {
                '"' => {
                    return Ok(Token {
                        kind: TokenKind::StringLiteral,
                        span: Span::new(start, offset + 1),
                        line,
                    });
                }
                '\n' => self.line += 1,
                _ => {}
            }
        }
        Err(LexicalError {
            kind: LexicalErrorKind::UnclosedString,
            span: Span::new(start, self.source.len()),
            line,
        })
    }

    fn lex_number(&mut self, start: usize) -> Token {
        while self.chars.next_if(|(_, c)| c.is_ascii_digit()).is_some() {}

        // A fractional part needs at least one digit after the dot.
        let mut lookahead = self.chars.clone();
        if let (Some((_, '.')), Some((_, digit))) = (lookahead.next(), lookahead.next()) {
            if digit.is_ascii_digit() {
                self.chars.next();
                while self.chars.next_if(|(_, c)| c.is_ascii_digit()).is_some() {}
            }
        }
        self.token(TokenKind::NumericLiteral, start)
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> Token {
        while self
            .chars
            .next_if(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
            .is_some()
        {}
        let end = self.offset();
        let kind = KEYWORD_HASHMAP
            .get(&self.source[start..end])
            .copied()
            .unwrap_or(TokenKind::Ident);
        self.token(kind, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().expect("source is valid");
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("!= == <= >= ! = < >"),
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::LessThanEqual,
                TokenKind::GreaterThanEqual,
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let mut lexer = Lexer::new("12.");
        let number = lexer.next_token().unwrap();
        assert_eq!(number.kind, TokenKind::NumericLiteral);
        assert_eq!(lexer.get_lexeme(&number.span), Some("12"));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dot);
    }

    #[test]
    fn comments_and_newlines_advance_the_line() {
        let mut lexer = Lexer::new("// nothing here\n\nvar");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::KeywordVar);
        assert_eq!(token.line, 3);
    }

    #[test]
    fn unterminated_string_reports_starting_line() {
        let mut lexer = Lexer::new("\n\"abc\ndef");
        let error = lexer.next_token().unwrap_err();
        assert_eq!(error.kind, LexicalErrorKind::UnclosedString);
        assert_eq!(error.line, 2);
    }
}
