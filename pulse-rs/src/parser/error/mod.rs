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

//! Errors raised while turning source text into a [`Program`](crate::Program).
//!
//! Lexing and parsing share one error type, [`Error`], parameterized over the kind of problem.
//! Inside nom combinators errors are carried as [`InternalError`]s which still borrow the input;
//! once lexing or parsing stops they are converted to [`Error`]s with an owned [`Location`].

use std::convert::Infallible;
use std::fmt;

mod internal;
mod kind;
mod location;

pub use internal::GenericParseError;
pub(crate) use internal::InternalError;
pub use kind::{ErrorKind, LexErrorKind, ParserErrorKind};
pub(crate) use location::Locate;
pub use location::Location;

pub(crate) type InternalParseError<'a> = InternalError<super::ParserInput<'a>, ParserErrorKind>;

/// A problem found while splitting source text into tokens.
pub type LexError = Error<LexErrorKind>;

/// A problem found while assembling tokens into a program.
pub type ParseError = Error<ParserErrorKind>;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error and where in the source it was found.
///
/// `{}` prints the error and its location. `{:#}` also prints the errors which led to it, one
/// per line.
#[derive(Debug)]
pub struct Error<E = Infallible>
where
    E: std::error::Error + Send,
{
    location: Location,
    kind: ErrorKind<E>,
    cause: Option<Cause>,
}

impl<E> Error<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    pub(crate) fn from_nom_internal_err<I: Locate>(
        error: nom::Err<InternalError<I, E>>,
    ) -> nom::Err<Self> {
        error.map(Self::from)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The line (starting at 1) where the error occurred.
    pub fn line(&self) -> u32 {
        self.location.line
    }

    /// The column (starting at 1) where the error occurred.
    pub fn column(&self) -> usize {
        self.location.column
    }

    /// The source text or token at which the error occurred.
    pub fn snippet(&self) -> &str {
        &self.location.snippet
    }

    pub fn kind(&self) -> &ErrorKind<E> {
        &self.kind
    }
}

impl<I, E> From<InternalError<I, E>> for Error<E>
where
    I: Locate,
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(internal: InternalError<I, E>) -> Self {
        let InternalError { input, error, prev } = internal;
        Self {
            location: input.locate(),
            kind: error,
            cause: prev.map(|prev| Box::new(Self::from(*prev)) as Cause),
        }
    }
}

/// Causes are compared by their rendering.
impl<E> PartialEq for Error<E>
where
    E: std::error::Error + PartialEq + Send,
{
    fn eq(&self, other: &Self) -> bool {
        let cause = |error: &Self| error.cause.as_ref().map(ToString::to_string);
        self.location == other.location && self.kind == other.kind && cause(self) == cause(other)
    }
}

impl<E> fmt::Display for Error<E>
where
    E: std::error::Error + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.location, self.kind)?;
        match &self.cause {
            Some(cause) if f.alternate() => write!(f, "\n\tcause: {cause:#}"),
            _ => Ok(()),
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + Send + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
