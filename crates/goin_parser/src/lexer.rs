use std::iter::Peekable;
use std::str::Chars;

use crate::span::{Position, Span, WithSpan};
use crate::token::Token;

/// A pull-based source of tokens for the parser.
///
/// Once the end of the input has been reached, every subsequent call must keep
/// returning `Token::Eof`.
pub trait TokenSource {
    fn next_token(&mut self) -> WithSpan<Token>;
}

pub struct Lexer<'a> {
    input_iter: Peekable<Chars<'a>>,
    current_position: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input_iter: input.chars().peekable(),
            current_position: Position::default(),
        }
    }

    /// Consume the next character from the list.
    fn read_char(&mut self) -> Option<char> {
        let next = self.input_iter.next();
        if let Some(c) = next {
            self.current_position = self.current_position.advance(c);
        }
        next
    }

    /// Get the next character from the list without consuming it.
    fn peek_char(&mut self) -> Option<&char> {
        self.input_iter.peek()
    }

    /// Consume the next character only if it is the expected one.
    fn read_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(&expected) {
            self.read_char();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek_char() {
            if c.is_whitespace() {
                self.read_char();
            } else {
                break;
            }
        }
    }

    /// Read the current and following characters as an integer token.
    fn read_integer(&mut self, first: char) -> Token {
        let mut s = String::new();
        s.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_digit(ch) {
                s.push(ch);
                self.read_char();
            }
            // Underscore for separation
            else if ch == '_' {
                self.read_char();
            } else {
                break;
            }
        }

        match s.parse() {
            Ok(value) => Token::Integer(value),
            // Only reachable on overflow, the parser reports it like any other illegal token
            Err(_) => Token::Illegal(s),
        }
    }

    /// Read the current and following characters as an identifier or a keyword (if it exists).
    fn read_identifier_or_keyword(&mut self, first: char) -> Token {
        let mut identifier = String::new();
        identifier.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) || is_digit(ch) {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        Token::lookup_keyword(&identifier).unwrap_or(Token::Identifier(identifier))
    }
}

impl<'a> TokenSource for Lexer<'a> {
    fn next_token(&mut self) -> WithSpan<Token> {
        self.skip_whitespace();

        let initial_position = self.current_position;

        let token = match self.read_char() {
            Some(c) => match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,

                '=' if self.read_if('=') => Token::EqualEqual,
                '=' => Token::Equal,
                '!' if self.read_if('=') => Token::BangEqual,
                '!' => Token::Bang,
                '<' if self.read_if('=') => Token::LessEqual,
                '<' => Token::LessThan,
                '>' if self.read_if('=') => Token::GreaterEqual,
                '>' => Token::GreaterThan,

                ',' => Token::Comma,
                ';' => Token::Semicolon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftBrace,
                '}' => Token::RightBrace,

                c if is_digit(c) => self.read_integer(c),
                c if is_identifier_char(c) => self.read_identifier_or_keyword(c),

                c => Token::Illegal(c.to_string()),
            },
            None => Token::Eof,
        };

        let span = Span::new(initial_position, self.current_position);

        WithSpan::new(token, span)
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Whether or not the given character may start an identifier
fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::lexer::{Lexer, TokenSource};
    use crate::span::{Position, Span};
    use crate::token::Token;

    fn lex_all(input: &str) -> Vec<Token> {
        let mut lex = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lex.next_token().value;
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_operators() {
        let input = "=+-*/! ==!=<><=>=";

        assert_eq!(
            lex_all(input),
            vec![
                Token::Equal,
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Bang,
                Token::EqualEqual,
                Token::BangEqual,
                Token::LessThan,
                Token::GreaterThan,
                Token::LessEqual,
                Token::GreaterEqual,
            ]
        );
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            lex_all(",;(){}"),
            vec![
                Token::Comma,
                Token::Semicolon,
                Token::LeftParen,
                Token::RightParen,
                Token::LeftBrace,
                Token::RightBrace,
            ]
        );
    }

    #[test]
    fn test_program() {
        let input = "let five = 5;
let add = fn(x, y) {
  x + y;
};
let result = add(five, 10);";

        let ident = |name: &str| Token::Identifier(name.to_owned());

        assert_eq!(
            lex_all(input),
            vec![
                Token::Let,
                ident("five"),
                Token::Equal,
                Token::Integer(5),
                Token::Semicolon,
                Token::Let,
                ident("add"),
                Token::Equal,
                Token::Fn,
                Token::LeftParen,
                ident("x"),
                Token::Comma,
                ident("y"),
                Token::RightParen,
                Token::LeftBrace,
                ident("x"),
                Token::Plus,
                ident("y"),
                Token::Semicolon,
                Token::RightBrace,
                Token::Semicolon,
                Token::Let,
                ident("result"),
                Token::Equal,
                ident("add"),
                Token::LeftParen,
                ident("five"),
                Token::Comma,
                Token::Integer(10),
                Token::RightParen,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_identifier() {
        assert_eq!(
            lex_all("hello _world fiveAdder x1"),
            vec![
                Token::Identifier("hello".to_owned()),
                Token::Identifier("_world".to_owned()),
                Token::Identifier("fiveAdder".to_owned()),
                Token::Identifier("x1".to_owned()),
            ]
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(
            lex_all("012312 12_345"),
            vec![Token::Integer(12312), Token::Integer(12345)]
        );
    }

    #[test]
    fn test_integer_overflow_is_illegal() {
        assert_eq!(
            lex_all("99999999999999999999"),
            vec![Token::Illegal("99999999999999999999".to_owned())]
        );
    }

    #[test]
    fn test_illegal() {
        assert_eq!(
            lex_all("1 @ 2"),
            vec![
                Token::Integer(1),
                Token::Illegal("@".to_owned()),
                Token::Integer(2)
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            lex_all("fn let true false if else return"),
            vec![
                Token::Fn,
                Token::Let,
                Token::True,
                Token::False,
                Token::If,
                Token::Else,
                Token::Return,
            ]
        );
    }

    #[test]
    fn test_eof_saturates() {
        let mut lex = Lexer::new("1");
        assert_eq!(lex.next_token().value, Token::Integer(1));

        for _ in 0..3 {
            assert_eq!(lex.next_token().value, Token::Eof);
        }
    }

    #[test]
    fn test_spans() {
        let input = "abc 12\n+ return";
        let mut lex = Lexer::new(input);

        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(1, 1), Position::new(1, 4))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(1, 5), Position::new(1, 7))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(2, 1), Position::new(2, 2))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(Position::new(2, 3), Position::new(2, 9))
        );
    }
}
