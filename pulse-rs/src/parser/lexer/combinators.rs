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

//! Lexing combinators which report what they were looking for.
//!
//! The errors nom builds by itself name the combinator which failed, not the token that was
//! expected, and are of no use to someone fixing a pulse sequence.

use nom::branch::{alt as nom_alt, Alt};
use nom::bytes::complete::tag as nom_tag;
use nom::Parser;

use super::{InternalLexError, InternalLexResult, LexErrorKind, LexInput};

/// Runs `parser`, reporting [`LexErrorKind::Expected`] with `what` if it fails. Failures, which
/// stop lexing, are kept as they are.
pub(super) fn expecting<'a, O, P>(
    what: &'static str,
    mut parser: P,
) -> impl FnMut(LexInput<'a>) -> InternalLexResult<'a, O>
where
    P: Parser<LexInput<'a>, O, InternalLexError<'a>>,
{
    move |input| match parser.parse(input) {
        Err(nom::Err::Error(_)) => Err(nom::Err::Error(InternalLexError::from_kind(
            input,
            LexErrorKind::Expected(what),
        ))),
        result => result,
    }
}

/// [`nom::branch::alt`], reporting `what` instead of the error of the last alternative.
pub(super) fn alt<'a, O, List>(
    what: &'static str,
    alternatives: List,
) -> impl FnMut(LexInput<'a>) -> InternalLexResult<'a, O>
where
    List: Alt<LexInput<'a>, O, InternalLexError<'a>>,
{
    expecting(what, nom_alt(alternatives))
}

/// Matches exactly `text`.
pub(super) fn tag<'a>(
    text: &'static str,
) -> impl FnMut(LexInput<'a>) -> InternalLexResult<'a, LexInput<'a>> {
    move |input| {
        nom_tag::<_, _, ()>(text)(input).map_err(|_| {
            nom::Err::Error(InternalLexError::from_kind(
                input,
                LexErrorKind::ExpectedText(text),
            ))
        })
    }
}
