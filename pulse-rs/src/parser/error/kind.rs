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

use super::GenericParseError;
use crate::parser::lexer::{Keyword, Token};

/// Either a problem reported by nom itself or one of ours.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ErrorKind<E>
where
    E: std::error::Error + Send,
{
    #[error(transparent)]
    Internal(GenericParseError),

    #[error(transparent)]
    Other(E),
}

/// Problems found while lexing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Expected some kind of token, such as "a quantity".
    #[error("expected {0}")]
    Expected(&'static str),

    /// Expected exactly this text.
    #[error("expected {0:?}")]
    ExpectedText(&'static str),

    #[error("string is missing its closing {0}")]
    UnterminatedString(char),

    #[error("integer literal {0} is out of range")]
    IntegerOutOfRange(String),
}

/// Problems found while parsing tokens.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParserErrorKind {
    /// Reached end of input, but expected something else.
    #[error("expected {0}, found end of input")]
    UnexpectedEOF(&'static str),

    /// Got an unexpected token and expected something else.
    #[error("expected {expected}, found `{actual}`")]
    ExpectedToken { actual: Token, expected: String },

    /// Tried to parse a keyword-led line and couldn't.
    #[error("failed to parse {keyword}")]
    InvalidKeyword { keyword: Keyword },

    /// Tried to parse a timeline entry or assignment and couldn't.
    #[error("failed to parse a command")]
    InvalidCommand,

    /// A line started with a token which cannot begin anything.
    #[error("expected a declaration, assignment or command")]
    NotACommand,

    #[error("reached end of input")]
    EndOfInput,
}
