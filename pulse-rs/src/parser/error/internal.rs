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

use nom::error::ErrorKind as NomErrorKind;

use super::ErrorKind;

/// An error raised by one of `nom`'s own combinators, without any more specific context.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("internal parsing error: {0:?}")]
pub struct GenericParseError(NomErrorKind);

impl GenericParseError {
    pub(crate) fn new(kind: NomErrorKind) -> Self {
        Self(kind)
    }
}

/// The error type threaded through the lexer and parser combinators.
///
/// It still borrows its input; it is converted into an owned [`Error`](super::Error), with line
/// and column information, once parsing finishes.
#[derive(Debug)]
pub(crate) struct InternalError<I, E>
where
    E: std::error::Error + Send,
{
    pub(crate) input: I,
    pub(crate) error: ErrorKind<E>,
    pub(crate) prev: Option<Box<Self>>,
}

impl<I, E> InternalError<I, E>
where
    E: std::error::Error + Send,
{
    pub(crate) fn from_kind(input: I, kind: E) -> Self {
        Self {
            input,
            error: ErrorKind::Other(kind),
            prev: None,
        }
    }

    /// Attach the error which caused this one.
    pub(crate) fn with_previous(mut self, previous: Self) -> Self {
        self.prev = Some(Box::new(previous));
        self
    }
}

impl<I, E> nom::error::ParseError<I> for InternalError<I, E>
where
    E: std::error::Error + Send,
{
    fn from_error_kind(input: I, kind: NomErrorKind) -> Self {
        Self {
            input,
            error: ErrorKind::Internal(GenericParseError::new(kind)),
            prev: None,
        }
    }

    fn append(_input: I, _kind: NomErrorKind, other: Self) -> Self {
        other
    }
}
