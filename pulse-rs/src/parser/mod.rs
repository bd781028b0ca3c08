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

use nom::IResult;

pub(crate) use error::InternalParseError;
pub use error::{
    ErrorKind, GenericParseError, LexError, LexErrorKind, Location, ParseError, ParserErrorKind,
};
pub(crate) use lexer::lex;
pub use lexer::{Keyword, Token};
pub(crate) use statement::parse_program;
use token::TokenWithLocation;

mod common;
mod error;
mod lexer;
mod macros;
mod statement;
mod token;

pub(crate) type ParserInput<'a> = &'a [TokenWithLocation<'a>];
type InternalParserResult<'a, R, E = InternalParseError<'a>> = IResult<ParserInput<'a>, R, E>;

/// Returns the next token of the input along with the rest of the input.
pub(crate) fn split_first_token(input: ParserInput) -> Option<(&Token, ParserInput)> {
    input
        .split_first()
        .map(|(first, rest)| (first.as_token(), rest))
}

/// Returns the next token of the input without consuming it.
pub(crate) fn first_token(input: ParserInput) -> Option<&Token> {
    input.first().map(TokenWithLocation::as_token)
}

/// Returns the error carried by a `nom` error; `Incomplete`, which complete parsers never return,
/// becomes an end-of-input error at `input`.
pub(crate) fn extract_nom_err<'a>(
    input: ParserInput<'a>,
    err: nom::Err<InternalParseError<'a>>,
) -> InternalParseError<'a> {
    match err {
        nom::Err::Error(err) | nom::Err::Failure(err) => err,
        nom::Err::Incomplete(_) => {
            InternalParseError::from_kind(input, ParserErrorKind::EndOfInput)
        }
    }
}
