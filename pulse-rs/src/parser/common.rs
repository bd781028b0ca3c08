// Copyright 2021 Rigetti Computing
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use nom::{combinator::opt, sequence::preceded};

use crate::ast::{Value, ValuePath};
use crate::token;

use super::{
    error::ParserErrorKind, lexer::Token, InternalParseError, InternalParserResult, ParserInput,
};

/// Fail at `input`, which should have started with `what`.
pub(crate) fn expected<'a, T>(
    input: ParserInput<'a>,
    what: &'static str,
) -> InternalParserResult<'a, T> {
    let kind = match super::first_token(input) {
        None => ParserErrorKind::UnexpectedEOF(what),
        Some(actual) => ParserErrorKind::ExpectedToken {
            actual: actual.clone(),
            expected: what.to_owned(),
        },
    };
    Err(nom::Err::Error(InternalParseError::from_kind(input, kind)))
}

/// Consume one token, keeping whatever `select` picks out of it.
pub(crate) fn next_token<'a, T>(
    what: &'static str,
    select: impl Fn(&Token) -> Option<T>,
) -> impl FnMut(ParserInput<'a>) -> InternalParserResult<'a, T> {
    move |input| {
        let selected = super::split_first_token(input)
            .and_then(|(token, rest)| select(token).map(|selected| (rest, selected)));
        match selected {
            Some(parsed) => Ok(parsed),
            None => expected(input, what),
        }
    }
}

/// Parse a literal value: an integer, float, quantity or string.
pub(crate) fn parse_value(input: ParserInput) -> InternalParserResult<Value> {
    next_token("a value", |token| match token {
        Token::Integer(value) => Some(Value::Integer(*value)),
        Token::Float(value) => Some(Value::Float(*value)),
        Token::Quantity(value) => Some(Value::Quantity(*value)),
        Token::String(value) => Some(Value::String(value.clone())),
        _ => None,
    })(input)
}

/// Parse `NAME` or `NAME.ATTRIBUTE`.
pub(crate) fn parse_value_path<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, ValuePath> {
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, attribute) = opt(preceded(token!(Dot), token!(Identifier(v))))(input)?;
    Ok((input, ValuePath { name, attribute }))
}

/// Skip any newlines, semicolons and comments.
pub(crate) fn skip_separators(input: ParserInput) -> InternalParserResult<()> {
    let mut input = input;
    while let Some((Token::NewLine | Token::Semicolon | Token::Comment(_), remainder)) =
        super::split_first_token(input)
    {
        input = remainder;
    }
    Ok((input, ()))
}

/// Succeeds, without consuming anything, if the input is at the end of a command: a newline,
/// semicolon, comment, closing brace or the end of input.
pub(crate) fn parse_command_end(input: ParserInput) -> InternalParserResult<()> {
    match super::first_token(input) {
        None
        | Some(Token::NewLine | Token::Semicolon | Token::Comment(_) | Token::RBrace) => {
            Ok((input, ()))
        }
        Some(_) => expected(input, "a newline or ';'"),
    }
}
