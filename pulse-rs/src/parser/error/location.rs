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

use crate::parser::lexer::LexInput;
use crate::parser::ParserInput;

/// Where in the source an error was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Starting at 1.
    pub line: u32,
    /// Starting at 1, in characters.
    pub column: usize,
    /// The text or token found there.
    pub snippet: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} ({})",
            self.line, self.column, self.snippet
        )
    }
}

/// Input which can report where it starts.
pub(crate) trait Locate {
    fn locate(&self) -> Location;
}

/// The rest of the current line, quoted.
impl Locate for LexInput<'_> {
    fn locate(&self) -> Location {
        let text = self.fragment();
        let line = text.lines().next().unwrap_or_default();
        let snippet = if line.len() < text.len() {
            format!("{line:?}...")
        } else {
            format!("{line:?}")
        };
        Location {
            line: self.location_line(),
            column: self.get_utf8_column(),
            snippet,
        }
    }
}

/// The next token, or the end of input.
impl Locate for ParserInput<'_> {
    fn locate(&self) -> Location {
        match self.first() {
            Some(token) => Location {
                line: token.line(),
                column: token.column(),
                snippet: format!("`{}`", token.as_token()),
            },
            None => Location {
                line: 1,
                column: 1,
                snippet: "end of input".to_owned(),
            },
        }
    }
}
