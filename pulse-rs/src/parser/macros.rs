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

/// A parser which consumes one token of the given variant.
///
/// `token!(Colon)` yields `()`; `token!(Identifier(v))` yields a clone of the identifier.
#[macro_export]
macro_rules! token {
    ($variant:ident($contents:ident)) => {
        $crate::parser::common::next_token(stringify!($variant), |token| match token {
            $crate::parser::Token::$variant($contents) => Some($contents.clone()),
            _ => None,
        })
    };
    ($variant:ident) => {
        $crate::parser::common::next_token(stringify!($variant), |token| {
            matches!(token, $crate::parser::Token::$variant).then_some(())
        })
    };
}

/// A test that `$parser` consumes all of `$input`, producing `$expected`.
#[cfg(test)]
#[macro_export]
macro_rules! make_test {
    ($name:ident, $parser:ident, $input:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let tokens = $crate::parser::lex(::nom_locate::LocatedSpan::new($input)).unwrap();
            let (rest, parsed) = $parser(&tokens).unwrap();
            assert!(rest.is_empty(), "unparsed tokens: {rest:?}");
            assert_eq!(parsed, $expected);
        }
    };
}
