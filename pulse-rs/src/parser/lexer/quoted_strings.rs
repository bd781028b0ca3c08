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

use nom::Slice;

use super::{InternalLexError, InternalLexResult, LexErrorKind, LexInput};

/// Lex a string in single or double quotes.
///
/// A backslash escapes the character after it, so it never closes the string. Inside the string,
/// an escaped backslash or an escaped copy of the enclosing quote stands for itself; any other
/// escape is kept as written. So `"\'a\' \"b\""` becomes `\'a\' "b"`.
pub(crate) fn unescaped_quoted_string(input: LexInput) -> InternalLexResult<String> {
    let quote = match input.fragment().chars().next() {
        Some(quote @ ('"' | '\'')) => quote,
        _ => {
            return Err(nom::Err::Error(InternalLexError::from_kind(
                input,
                LexErrorKind::Expected("a quoted string"),
            )))
        }
    };

    let mut contents = String::new();
    let mut chars = input.fragment().char_indices().skip(1);
    while let Some((index, chr)) = chars.next() {
        if chr == quote {
            return Ok((input.slice(index + chr.len_utf8()..), contents));
        }
        if chr != '\\' {
            contents.push(chr);
            continue;
        }
        match chars.next() {
            Some((_, escaped)) if escaped == quote || escaped == '\\' => contents.push(escaped),
            Some((_, escaped)) => {
                contents.push('\\');
                contents.push(escaped);
            }
            None => break,
        }
    }

    // A failure: no other token lexer gets to try.
    Err(nom::Err::Failure(InternalLexError::from_kind(
        input,
        LexErrorKind::UnterminatedString(quote),
    )))
}
