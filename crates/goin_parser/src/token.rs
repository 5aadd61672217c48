use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Operators
    Equal,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,

    EqualEqual,
    BangEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // Delimiters
    Comma,
    Semicolon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    // Identifiers & Literals
    Identifier(String),
    Integer(i64),

    // Keywords
    Fn,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    // Special
    /// A character (or literal) the lexer could not make sense of
    Illegal(String),
    Eof,
}

/// The type of a token, without any payload.
///
/// Used to key the parser's dispatch tables and in error messages.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TokenKind {
    Equal,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,

    EqualEqual,
    BangEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    Comma,
    Semicolon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    Identifier,
    Integer,

    Fn,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    Illegal,
    Eof,
}

impl Token {
    /// Get the Token for the given keyword, if valid.
    pub fn lookup_keyword(s: &str) -> Option<Token> {
        use Token::*;

        match s {
            "fn" => Some(Fn),
            "let" => Some(Let),
            "true" => Some(True),
            "false" => Some(False),
            "if" => Some(If),
            "else" => Some(Else),
            "return" => Some(Return),
            _ => None,
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Equal => TokenKind::Equal,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Star => TokenKind::Star,
            Token::Slash => TokenKind::Slash,
            Token::Bang => TokenKind::Bang,

            Token::EqualEqual => TokenKind::EqualEqual,
            Token::BangEqual => TokenKind::BangEqual,
            Token::LessThan => TokenKind::LessThan,
            Token::GreaterThan => TokenKind::GreaterThan,
            Token::LessEqual => TokenKind::LessEqual,
            Token::GreaterEqual => TokenKind::GreaterEqual,

            Token::Comma => TokenKind::Comma,
            Token::Semicolon => TokenKind::Semicolon,

            Token::LeftParen => TokenKind::LeftParen,
            Token::RightParen => TokenKind::RightParen,
            Token::LeftBrace => TokenKind::LeftBrace,
            Token::RightBrace => TokenKind::RightBrace,

            Token::Identifier(_) => TokenKind::Identifier,
            Token::Integer(_) => TokenKind::Integer,

            Token::Fn => TokenKind::Fn,
            Token::Let => TokenKind::Let,
            Token::True => TokenKind::True,
            Token::False => TokenKind::False,
            Token::If => TokenKind::If,
            Token::Else => TokenKind::Else,
            Token::Return => TokenKind::Return,

            Token::Illegal(_) => TokenKind::Illegal,
            Token::Eof => TokenKind::Eof,
        }
    }

    /// The literal source text of this token (e.g. `let`, `x`, `5`, `+`).
    ///
    /// Integers are lexed into their value, so their literal is the plain
    /// decimal form without `_` separators (`1_000` becomes `1000`).
    pub fn literal(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Equal => write!(f, "="),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Star => write!(f, "*"),
            Slash => write!(f, "/"),
            Bang => write!(f, "!"),

            EqualEqual => write!(f, "=="),
            BangEqual => write!(f, "!="),
            LessThan => write!(f, "<"),
            GreaterThan => write!(f, ">"),
            LessEqual => write!(f, "<="),
            GreaterEqual => write!(f, ">="),

            Comma => write!(f, ","),
            Semicolon => write!(f, ";"),

            LeftParen => write!(f, "("),
            RightParen => write!(f, ")"),
            LeftBrace => write!(f, "{{"),
            RightBrace => write!(f, "}}"),

            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),

            Fn => write!(f, "fn"),
            Let => write!(f, "let"),
            True => write!(f, "true"),
            False => write!(f, "false"),
            If => write!(f, "if"),
            Else => write!(f, "else"),
            Return => write!(f, "return"),

            Illegal(text) => write!(f, "{}", text),
            Eof => write!(f, ""),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;

        let s = match self {
            Equal => "=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Bang => "!",

            EqualEqual => "==",
            BangEqual => "!=",
            LessThan => "<",
            GreaterThan => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",

            Comma => ",",
            Semicolon => ";",

            LeftParen => "(",
            RightParen => ")",
            LeftBrace => "{",
            RightBrace => "}",

            Identifier => "IDENT",
            Integer => "INT",

            Fn => "FUNCTION",
            Let => "LET",
            True => "TRUE",
            False => "FALSE",
            If => "IF",
            Else => "ELSE",
            Return => "RETURN",

            Illegal => "ILLEGAL",
            Eof => "EOF",
        };

        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use crate::token::{Token, TokenKind};

    #[test]
    fn keyword_lookup() {
        assert_eq!(Token::lookup_keyword("fn"), Some(Token::Fn));
        assert_eq!(Token::lookup_keyword("let"), Some(Token::Let));
        assert_eq!(Token::lookup_keyword("return"), Some(Token::Return));
        assert_eq!(Token::lookup_keyword("lets"), None);
        assert_eq!(Token::lookup_keyword("Let"), None);
    }

    #[test]
    fn kind_ignores_payload() {
        assert_eq!(
            Token::Identifier("a".to_owned()).kind(),
            Token::Identifier("b".to_owned()).kind()
        );
        assert_eq!(Token::Integer(1).kind(), TokenKind::Integer);
        assert_ne!(Token::Plus.kind(), Token::Minus.kind());
    }

    #[test]
    fn literal_formatting() {
        assert_eq!(Token::Let.literal(), "let");
        assert_eq!(Token::Identifier("foobar".to_owned()).literal(), "foobar");
        assert_eq!(Token::Integer(838383).literal(), "838383");
        assert_eq!(Token::LeftBrace.literal(), "{");
        assert_eq!(TokenKind::Identifier.to_string(), "IDENT");
        assert_eq!(TokenKind::RightBrace.to_string(), "}");
    }
}
