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

use std::fmt;
use std::str::FromStr;

use nom::Finish;
use nom_locate::LocatedSpan;

use crate::ast::{Command, Node};
use crate::parser::{lex, parse_program};

pub use self::error::{ProgramError, SyntaxError};
pub use crate::parser::{
    ErrorKind, GenericParseError, Keyword, LexError, LexErrorKind, Location, ParseError,
    ParserErrorKind, Token,
};

mod error;

type Result<T> = std::result::Result<T, ProgramError>;

/// A parsed pulse sequence: declarations, assignments and the timeline, in source order.
///
/// A program is immutable once parsed; every analysis stage of an
/// [`Environment`](crate::Environment) reads the same program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    body: Vec<Node>,
}

impl Program {
    pub fn new(body: Vec<Node>) -> Self {
        Self { body }
    }

    /// Returns the top-level nodes of the program.
    pub fn body(&self) -> &[Node] {
        &self.body
    }

    pub fn into_body(self) -> Vec<Node> {
        self.body
    }

    /// Whether an `acquire` appears anywhere in the timeline, including inside loops.
    pub fn contains_acquire(&self) -> bool {
        fn any_acquire(nodes: &[Node]) -> bool {
            nodes.iter().any(|node| match node {
                Node::Command(Command::Acquire) => true,
                Node::Command(Command::Repeat(repeat)) => any_acquire(&repeat.body),
                _ => false,
            })
        }
        any_acquire(&self.body)
    }
}

impl From<Vec<Node>> for Program {
    fn from(body: Vec<Node>) -> Self {
        Self::new(body)
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self> {
        let input = LocatedSpan::new(s);
        let lexed = lex(input).map_err(SyntaxError::from)?;
        let (_, body) = parse_program(&lexed)
            .map_err(ParseError::from_nom_internal_err)
            .finish()
            .map_err(SyntaxError::from)?;
        Ok(Self::new(body))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.body {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}
