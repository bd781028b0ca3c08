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

mod combinators;
mod quoted_strings;

use nom::{
    bytes::complete::{is_a, take_while, take_while1},
    character::complete::{char, digit1, one_of, space0},
    combinator::{all_consuming, map, not, opt, recognize, value},
    multi::many0,
    sequence::{pair, preceded, terminated, tuple},
    Finish, IResult,
};
use nom_locate::LocatedSpan;

use combinators::{alt, expecting, tag};
use crate::parser::error::{InternalError, LexError, LexErrorKind};
use crate::parser::token::token_with_location;
pub use crate::parser::token::{Token, TokenWithLocation};
use crate::units::Quantity;

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Acquire,
    Delay,
    Int,
    Output,
    Pulse,
    Times,
}

pub type LexInput<'a> = LocatedSpan<&'a str>;
pub(crate) type InternalLexError<'a> = InternalError<LexInput<'a>, LexErrorKind>;
pub(crate) type InternalLexResult<'a, T = Token, E = InternalLexError<'a>> =
    IResult<LexInput<'a>, T, E>;

/// Completely lex a string, returning the tokens within.
pub(crate) fn lex(input: LexInput) -> Result<Vec<TokenWithLocation>, LexError> {
    all_consuming(lex_tokens)(input)
        .finish()
        .map(|(_, tokens)| tokens)
        .map_err(LexError::from)
}

/// Lex tokens up to the end of input, failing with the error of the first text which is not
/// a token.
fn lex_tokens(input: LexInput) -> InternalLexResult<Vec<TokenWithLocation>> {
    let (rest, tokens) = terminated(many0(preceded(space0, lex_token)), space0)(input)?;
    match lex_token(rest) {
        Err(err) if !rest.fragment().is_empty() => Err(err),
        _ => Ok((rest, tokens)),
    }
}

fn lex_token(input: LexInput) -> InternalLexResult<TokenWithLocation> {
    alt(
        "a token",
        (
            token_with_location(lex_comment),
            token_with_location(lex_punctuation),
            token_with_location(lex_string),
            // A quantity starts with a number, so it must be tried first
            token_with_location(lex_quantity),
            token_with_location(lex_number),
            token_with_location(lex_keyword_or_identifier),
        ),
    )(input)
}

fn lex_comment(input: LexInput) -> InternalLexResult {
    let (input, _) = tag("#")(input)?;
    let (input, content) = take_while(|chr: char| chr != '\n' && chr != '\r')(input)?;
    Ok((input, Token::Comment(content.fragment().to_string())))
}

fn is_valid_identifier_leading_character(chr: char) -> bool {
    chr.is_ascii_alphabetic() || chr == '_'
}

fn is_valid_identifier_end_character(chr: char) -> bool {
    is_valid_identifier_leading_character(chr) || chr.is_ascii_digit()
}

fn is_unit_character(chr: char) -> bool {
    chr.is_alphabetic()
}

fn lex_identifier_raw(input: LexInput) -> InternalLexResult<String> {
    expecting(
        "a valid identifier",
        map(
            recognize(pair(
                take_while1::<_, _, InternalLexError>(is_valid_identifier_leading_character),
                take_while(is_valid_identifier_end_character),
            )),
            |identifier: LexInput| identifier.fragment().to_string(),
        ),
    )(input)
}

/// If the given identifier string matches a keyword, return the keyword;
/// otherwise, return the original identifier as a token.
fn lex_keyword_or_identifier(input: LexInput) -> InternalLexResult {
    let (input, identifier) = lex_identifier_raw(input)?;
    let token = match identifier.parse() {
        Ok(keyword) => Token::Keyword(keyword),
        Err(_) => Token::Identifier(identifier),
    };
    Ok((input, token))
}

/// Recognize `<optional sign><digits>[.<digits>][e<exponent>]`.
fn recognize_number(input: LexInput) -> InternalLexResult<LexInput> {
    recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

fn lex_number(input: LexInput) -> InternalLexResult {
    let (remaining, number) = recognize_number(input)?;
    let text = *number.fragment();
    let token = if text.contains(|chr: char| matches!(chr, '.' | 'e' | 'E')) {
        let float = text.parse().map_err(|_| {
            nom::Err::Error(InternalLexError::from_kind(
                input,
                LexErrorKind::Expected("a number"),
            ))
        })?;
        Token::Float(float)
    } else {
        let integer = text.parse().map_err(|_| {
            nom::Err::Failure(InternalLexError::from_kind(
                input,
                LexErrorKind::IntegerOutOfRange(text.to_owned()),
            ))
        })?;
        Token::Integer(integer)
    };
    Ok((remaining, token))
}

/// Lex a number followed by a unit, such as `10 ns` or `-5mV`, as a single token.
///
/// Fails (without consuming anything) if the trailing letters are not a known unit, so that the
/// number and the word are lexed separately instead.
fn lex_quantity(input: LexInput) -> InternalLexResult {
    let (remaining, text) = recognize(tuple((
        recognize_number,
        space0,
        take_while1(is_unit_character),
        not(take_while1(is_valid_identifier_end_character)),
    )))(input)?;
    match text.fragment().parse::<Quantity>() {
        Ok(quantity) => Ok((remaining, Token::Quantity(quantity))),
        Err(_) => Err(nom::Err::Error(InternalLexError::from_kind(
            input,
            LexErrorKind::Expected("a quantity"),
        ))),
    }
}

fn recognize_newlines(input: LexInput) -> InternalLexResult<LexInput> {
    expecting(
        "one or more newlines",
        is_a::<_, _, InternalLexError>("\r\n"),
    )(input)
}

fn lex_punctuation(input: LexInput) -> InternalLexResult {
    use Token::*;
    alt(
        "punctuation",
        (
            value(Colon, tag(":")),
            value(Comma, tag(",")),
            value(Dot, tag(".")),
            value(Equals, tag("=")),
            value(LBrace, tag("{")),
            value(LParenthesis, tag("(")),
            value(NewLine, recognize_newlines),
            value(RBrace, tag("}")),
            value(RParenthesis, tag(")")),
            value(Semicolon, tag(";")),
        ),
    )(input)
}

fn lex_string(input: LexInput) -> InternalLexResult {
    map(quoted_strings::unescaped_quoted_string, Token::String)(input)
}
