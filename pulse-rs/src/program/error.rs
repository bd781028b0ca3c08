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

use crate::parser::{LexError, Location, ParseError};

/// Source text which is not a well-formed program.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SyntaxError {
    /// The text could not be split into tokens.
    #[error("could not lex program {0}")]
    Lex(#[from] LexError),
    /// The tokens do not form a program.
    #[error("could not parse program {0}")]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    pub fn location(&self) -> &Location {
        match self {
            Self::Lex(err) => err.location(),
            Self::Parse(err) => err.location(),
        }
    }

    /// Starting at 1.
    pub fn line(&self) -> u32 {
        self.location().line
    }

    /// Starting at 1, in characters.
    pub fn column(&self) -> usize {
        self.location().column
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ProgramError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}
