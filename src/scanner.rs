use std::iter::Copied;
use std::slice::Iter;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{Error, ScanError};
use crate::literal::Literal;
use crate::token::{Location, Token, Type};

/// Turns source text into a flat list of tokens.
///
/// The scanner walks the source byte by byte. Lox lexemes are plain ASCII;
/// a multi-byte character outside of a string literal is reported one byte
/// at a time, while string literals carry their interior bytes verbatim.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Copied<Iter<'a, u8>>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column_offset: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.as_bytes().iter().copied().peekmore(),
            tokens: vec!(),
            start: 0,
            current: 0,
            line: 1,
            column_offset: 0,
        }
    }

    /// Scans the source code and returns a vector of tokens.
    /// The list always ends with a single EOF token.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(
            Token::new(
                Type::EOF,
                String::from(""),
                None,
                Location::new(self.line, 0)
            )
        );

        self.tokens.clone()
    }

    /// Consumes and returns the next byte.
    fn advance(&mut self) -> u8 {
        match self.source.next() {
            Some(byte) => {
                self.current += 1;
                byte
            },
            None => panic!("tried to advance past end of the file."),
        }
    }

    /// Returns the next byte without consuming it, or 0 at end of input.
    fn peek(&mut self) -> u8 {
        self.source.peek().copied().unwrap_or(0)
    }

    /// Returns the byte after the next one without consuming it, or 0 at
    /// end of input. Peeking ahead moves the iterator's view cursor, so it
    /// is reset right away to keep `peek` anchored to the next byte.
    fn peek_next(&mut self) -> u8 {
        let byte = self.source.peek_next().copied().unwrap_or(0);
        self.source.reset_cursor();
        byte
    }

    /// Returns if the byte after the next one is the expected byte.
    fn match_next(&mut self, expected: u8) -> bool {
        self.peek_next() == expected
    }

    /// Adds a new token to the list of tokens.
    fn add_token(&mut self, r#type: Type, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(
            Token::new(
                r#type,
                lexeme,
                literal,
                Location::new(self.line, self.start - self.column_offset)
            )
        );
    }

    /// Adds a new single char token to the list of tokens.
    fn add_single_char_token(&mut self, r#type: Type) {
        let byte = self.advance();
        self.add_token(r#type, (byte as char).to_string(), None);
    }

    /// Adds a new double char token to the list of tokens.
    fn add_double_char_token(&mut self, r#type: Type) {
        let first = self.advance() as char;
        let second = self.advance() as char;

        self.add_token(r#type, format!("{first}{second}"), None);
    }

    /// Returns if the scanner has reached the end of the file.
    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    /// Handles a string literal.
    fn string(&mut self) {
        self.advance(); // Move past the starting double quote.
        let start = Location::new(self.line, self.start - self.column_offset);

        let mut value = Vec::new();
        while !self.is_at_end() && self.peek() != b'"' {
            let byte = self.advance();
            value.push(byte);

            if byte == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            ScanError {
                location: start,
                message: String::from("Unterminated string"),
            }.throw();
            return;
        }

        self.advance(); // Move past the closing double quote.

        // The interior bytes came out of a valid UTF-8 source and are cut at
        // ASCII quotes, so they are themselves valid UTF-8.
        let value = String::from_utf8_lossy(&value).into_owned();

        // Literal does not include the double quotes unlike the lexeme.
        self.add_token(Type::String, format!("\"{value}\""), Some(Literal::String(value)));
    }

    /// Handles a number literal.
    fn number(&mut self) {
        let mut value = Vec::new();

        while self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        // A trailing dot is not part of the number; it is left for the next
        // token. Only consume the dot when a digit follows it.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            value.push(self.advance());

            while self.peek().is_ascii_digit() {
                value.push(self.advance());
            }
        }

        let value = String::from_utf8_lossy(&value).into_owned();
        let number: f64 = value.parse().expect("scanned digits to parse as a number");

        self.add_token(Type::Number, value, Some(Literal::Number(number)));
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self) {
        let mut value = Vec::new();

        while matches!(self.peek(), byte if byte.is_ascii_alphanumeric() || byte == b'_') {
            value.push(self.advance());
        }

        let value = String::from_utf8_lossy(&value).into_owned();
        let token_type = match value.as_str() {
            "and"      => Type::And,
            "class"    => Type::Class,
            "else"     => Type::Else,
            "false"    => Type::False,
            "for"      => Type::For,
            "fun"      => Type::Fun,
            "if"       => Type::If,
            "nil"      => Type::Nil,
            "or"       => Type::Or,
            "print"    => Type::Print,
            "return"   => Type::Return,
            "super"    => Type::Super,
            "this"     => Type::This,
            "true"     => Type::True,
            "var"      => Type::Var,
            "while"    => Type::While,
            _          => Type::Identifier,
        };

        self.add_token(token_type, value, None);
    }

    /// Scans the next token.
    fn scan_token(&mut self) {
        let byte = self.peek();
        match byte {
            // One character tokens
            b'(' => self.add_single_char_token(Type::LeftParen),
            b')' => self.add_single_char_token(Type::RightParen),
            b'{' => self.add_single_char_token(Type::LeftBrace),
            b'}' => self.add_single_char_token(Type::RightBrace),
            b',' => self.add_single_char_token(Type::Comma),
            b'.' => self.add_single_char_token(Type::Dot),
            b'-' => self.add_single_char_token(Type::Minus),
            b'+' => self.add_single_char_token(Type::Plus),
            b';' => self.add_single_char_token(Type::Semicolon),
            b'*' => self.add_single_char_token(Type::Star),

            // Two character tokens
            b'!' => {
                if self.match_next(b'=') {
                    self.add_double_char_token(Type::BangEqual);
                } else {
                    self.add_single_char_token(Type::Bang)
                };
            },
            b'=' => {
                if self.match_next(b'=') {
                    self.add_double_char_token(Type::EqualEqual);
                } else {
                    self.add_single_char_token(Type::Equal)
                };
            },
            b'<' => {
                if self.match_next(b'=') {
                    self.add_double_char_token(Type::LessEqual);
                } else {
                    self.add_single_char_token(Type::Less)
                };
            },
            b'>' => {
                if self.match_next(b'=') {
                    self.add_double_char_token(Type::GreaterEqual);
                } else {
                    self.add_single_char_token(Type::Greater)
                };
            },
            b'/' => {
                if self.match_next(b'/') {
                    // A line comment runs until the end of the line.
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_single_char_token(Type::Slash);
                }
            },

            // Ignore whitespace
            b' ' | b'\r' | b'\t' => {
                self.advance();
            },

            // Update line counter
            b'\n' => {
                self.advance();

                self.line += 1;
                self.column_offset = self.current;
            },

            // String
            b'"' => self.string(),

            // Numbers
            byte if byte.is_ascii_digit() => self.number(),

            // Identifiers
            byte if byte.is_ascii_alphabetic() || byte == b'_' => self.identifier(),

            _ => {
                self.advance();

                ScanError {
                    location: Location::new(self.line, self.start - self.column_offset),
                    message: format!("Unexpected character '{}'", byte as char),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source).scan_tokens()
    }

    #[test]
    fn ends_with_eof() {
        let tokens = scan("");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].r#type, Type::EOF);
    }

    #[test]
    fn single_char_tokens() {
        let tokens = scan("(){},.-+;/*");
        let types: Vec<Type> = tokens.iter().map(|token| token.r#type).collect();

        assert_eq!(types, vec![
            Type::LeftParen, Type::RightParen, Type::LeftBrace, Type::RightBrace,
            Type::Comma, Type::Dot, Type::Minus, Type::Plus, Type::Semicolon,
            Type::Slash, Type::Star, Type::EOF,
        ]);
    }

    #[test]
    fn double_char_tokens() {
        let tokens = scan("! != = == > >= < <=");
        let types: Vec<Type> = tokens.iter().map(|token| token.r#type).collect();

        assert_eq!(types, vec![
            Type::Bang, Type::BangEqual, Type::Equal, Type::EqualEqual,
            Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual,
            Type::EOF,
        ]);
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = scan("var language = nil;");

        assert_eq!(tokens[0].r#type, Type::Var);
        assert_eq!(tokens[1].r#type, Type::Identifier);
        assert_eq!(tokens[1].lexeme, "language");
        assert_eq!(tokens[2].r#type, Type::Equal);
        assert_eq!(tokens[3].r#type, Type::Nil);
        assert_eq!(tokens[4].r#type, Type::Semicolon);
    }

    #[test]
    fn number_literals() {
        let tokens = scan("123 123.456");

        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(123.456)));
        assert_eq!(tokens[1].lexeme, "123.456");
    }

    #[test]
    fn trailing_dot_is_not_consumed() {
        let tokens = scan("123.");
        let types: Vec<Type> = tokens.iter().map(|token| token.r#type).collect();

        assert_eq!(types, vec![Type::Number, Type::Dot, Type::EOF]);
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
    }

    #[test]
    fn string_literal_keeps_interior() {
        let tokens = scan("\"hello world\"");

        assert_eq!(tokens[0].r#type, Type::String);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
        assert_eq!(tokens[0].literal, Some(Literal::from("hello world")));
    }

    #[test]
    fn multiline_string_counts_lines() {
        let tokens = scan("\"one\ntwo\"\nident");

        assert_eq!(tokens[0].r#type, Type::String);
        assert_eq!(tokens[0].literal, Some(Literal::from("one\ntwo")));
        assert_eq!(tokens[1].lexeme, "ident");
        assert_eq!(tokens[1].location.line, 3);
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = scan("1 // the rest is ignored ,.;\n2");

        assert_eq!(tokens[0].literal, Some(Literal::Number(1.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(2.0)));
        assert_eq!(tokens[1].location.line, 2);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn slash_alone_is_a_token() {
        let tokens = scan("6/3");
        let types: Vec<Type> = tokens.iter().map(|token| token.r#type).collect();

        assert_eq!(types, vec![Type::Number, Type::Slash, Type::Number, Type::EOF]);
    }

    #[test]
    fn line_accounting() {
        let tokens = scan("a\nb\n\nc");

        assert_eq!(tokens[0].location.line, 1);
        assert_eq!(tokens[1].location.line, 2);
        assert_eq!(tokens[2].location.line, 4);
        assert_eq!(tokens[3].r#type, Type::EOF);
        assert_eq!(tokens[3].location.line, 4);
    }
}
