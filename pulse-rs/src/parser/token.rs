use std::fmt;

use nom::IResult;

use crate::parser::lexer::{Keyword, LexInput};
use crate::units::Quantity;

/// A lexed token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Colon,
    Comma,
    /// The text after `#`, up to the end of the line.
    Comment(String),
    Dot,
    Equals,
    Float(f64),
    Identifier(String),
    Integer(i64),
    Keyword(Keyword),
    LBrace,
    LParenthesis,
    NewLine,
    Quantity(Quantity),
    RBrace,
    RParenthesis,
    Semicolon,
    /// An unescaped string literal.
    String(String),
}

/// Renders the token roughly as it would appear in source, for error messages.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let punctuation = match self {
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Equals => "=",
            Token::LBrace => "{",
            Token::LParenthesis => "(",
            Token::NewLine => "newline",
            Token::RBrace => "}",
            Token::RParenthesis => ")",
            Token::Semicolon => ";",
            Token::Comment(text) => return write!(f, "#{text}"),
            Token::Float(value) => return write!(f, "{value:?}"),
            Token::Identifier(name) => return f.write_str(name),
            Token::Integer(value) => return write!(f, "{value}"),
            Token::Keyword(keyword) => return write!(f, "{keyword}"),
            Token::Quantity(quantity) => return write!(f, "{quantity}"),
            Token::String(text) => return write!(f, "{text:?}"),
        };
        f.write_str(punctuation)
    }
}

/// Each token is a single element of the parser's input.
impl nom::InputLength for Token {
    fn input_len(&self) -> usize {
        1
    }
}

/// A [`Token`] along with the source text it was lexed from.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenWithLocation<'a> {
    token: Token,
    span: LexInput<'a>,
}

impl TokenWithLocation<'_> {
    pub fn as_token(&self) -> &Token {
        &self.token
    }

    /// 1-based line of the start of the token.
    pub fn line(&self) -> u32 {
        self.span.location_line()
    }

    /// 1-based column, in characters, of the start of the token.
    pub fn column(&self) -> usize {
        self.span.get_utf8_column()
    }
}

impl PartialEq<Token> for TokenWithLocation<'_> {
    fn eq(&self, other: &Token) -> bool {
        self.token == *other
    }
}

impl nom::InputLength for TokenWithLocation<'_> {
    fn input_len(&self) -> usize {
        self.token.input_len()
    }
}

/// Run a token lexer, recording where in the source its token started.
pub(crate) fn token_with_location<'i, E, P>(
    mut lexer: P,
) -> impl FnMut(LexInput<'i>) -> IResult<LexInput<'i>, TokenWithLocation<'i>, E>
where
    P: nom::Parser<LexInput<'i>, Token, E>,
{
    move |span| {
        let (rest, token) = lexer.parse(span)?;
        Ok((rest, TokenWithLocation { token, span }))
    }
}
