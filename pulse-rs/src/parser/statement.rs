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

use nom::{
    branch::alt,
    combinator::{cut, map, opt},
    multi::{many0, many1, separated_list0, separated_list1},
    sequence::{delimited, preceded, separated_pair, terminated},
};

use crate::ast::{
    Assignment, Command, Component, Declaration, DeclaredName, Group, Initializer, Item, Node,
    Repeat, RepeatCount, Statement, Value, VariableKind,
};
use crate::token;

use super::{
    common::{expected, parse_command_end, parse_value, parse_value_path, skip_separators},
    error::ParserErrorKind,
    lexer::{Keyword, Token},
    InternalParseError, InternalParserResult, ParserInput,
};

/// Parse a whole program, reporting the first token which could not be parsed.
pub(crate) fn parse_program(input: ParserInput) -> InternalParserResult<Vec<Node>> {
    let (remainder, nodes) = parse_block_contents(input)?;
    if remainder.is_empty() {
        Ok((remainder, nodes))
    } else {
        expected(remainder, "a declaration, assignment or command")
    }
}

/// Parse nodes separated by newlines, semicolons and comments, up to the end of input or a
/// closing brace.
fn parse_block_contents(input: ParserInput) -> InternalParserResult<Vec<Node>> {
    terminated(
        many0(preceded(
            skip_separators,
            terminated(parse_node, cut(parse_command_end)),
        )),
        skip_separators,
    )(input)
}

/// Parse the next node from the input.
///
/// Returns a recoverable error at the end of input or a closing brace, so that a list of nodes can
/// stop there; anything else which fails to parse is a failure.
pub(crate) fn parse_node(input: ParserInput) -> InternalParserResult<Node> {
    match super::split_first_token(input) {
        None => Err(nom::Err::Error(InternalParseError::from_kind(
            input,
            ParserErrorKind::EndOfInput,
        ))),
        Some((Token::RBrace, _)) => Err(nom::Err::Error(InternalParseError::from_kind(
            input,
            ParserErrorKind::NotACommand,
        ))),
        Some((Token::Keyword(keyword), remainder)) => match keyword {
            Keyword::Acquire => Ok((remainder, Node::Command(Command::Acquire))),
            Keyword::Delay => parse_declaration(VariableKind::Delay, remainder),
            Keyword::Int => parse_declaration(VariableKind::Int, remainder),
            Keyword::Output => parse_declaration(VariableKind::Output, remainder),
            Keyword::Pulse => parse_declaration(VariableKind::Pulse, remainder),
            Keyword::Times => parse_repeat(remainder),
        }
        .map_err(|err| {
            nom::Err::Failure(
                InternalParseError::from_kind(
                    &input[..1],
                    ParserErrorKind::InvalidKeyword { keyword: *keyword },
                )
                .with_previous(super::extract_nom_err(remainder, err)),
            )
        }),
        Some((Token::Identifier(_) | Token::Quantity(_) | Token::LParenthesis, _)) => {
            alt((parse_assignment, parse_bare_delay, parse_statement))(input).map_err(|err| {
                nom::Err::Failure(
                    InternalParseError::from_kind(&input[..1], ParserErrorKind::InvalidCommand)
                        .with_previous(super::extract_nom_err(input, err)),
                )
            })
        }
        Some(_) => Err(nom::Err::Failure(InternalParseError::from_kind(
            &input[..1],
            ParserErrorKind::NotACommand,
        ))),
    }
}

/// Parse the names of a declaration, after its keyword.
fn parse_declaration<'a>(
    kind: VariableKind,
    input: ParserInput<'a>,
) -> InternalParserResult<'a, Node> {
    let (input, names) = separated_list1(token!(Comma), parse_declared_name)(input)?;
    Ok((input, Node::Declaration(Declaration::new(kind, names))))
}

fn parse_declared_name<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, DeclaredName> {
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, initializer) = opt(preceded(token!(Equals), parse_initializer))(input)?;
    Ok((input, DeclaredName::new(name, initializer)))
}

fn parse_initializer(input: ParserInput) -> InternalParserResult<Initializer> {
    alt((
        map(parse_attribute_map, Initializer::Attributes),
        map(parse_value, Initializer::Value),
    ))(input)
}

/// Parse `{attribute: value, ...}`.
fn parse_attribute_map<'a>(
    input: ParserInput<'a>,
) -> InternalParserResult<'a, Vec<(String, Value)>> {
    delimited(
        token!(LBrace),
        separated_list0(
            token!(Comma),
            separated_pair(token!(Identifier(v)), token!(Colon), parse_value),
        ),
        token!(RBrace),
    )(input)
}

fn parse_assignment<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, Node> {
    let (input, path) = parse_value_path(input)?;
    let (input, _) = token!(Equals)(input)?;
    let (input, value) = parse_value(input)?;
    Ok((input, Node::Assignment(Assignment::new(path, value))))
}

/// Parse a line holding only a quantity.
fn parse_bare_delay<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, Node> {
    let (input, quantity) = token!(Quantity(q))(input)?;
    let (input, _) = parse_command_end(input)?;
    Ok((input, Node::Command(Command::BareDelay(quantity))))
}

/// Parse `times COUNT { ... }`, after its keyword.
fn parse_repeat<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, Node> {
    let (input, count) = alt((
        map(token!(Integer(n)), RepeatCount::Literal),
        map(token!(Identifier(v)), RepeatCount::Variable),
    ))(input)?;
    let (input, body) = delimited(token!(LBrace), parse_block_contents, token!(RBrace))(input)?;
    Ok((input, Node::Command(Command::Repeat(Repeat::new(count, body)))))
}

/// Parse a line of timeline components. Adjacent targeted groups form one parallel block.
fn parse_statement(input: ParserInput) -> InternalParserResult<Node> {
    let (input, parsed) = many1(parse_component)(input)?;
    let mut components: Vec<Component> = Vec::with_capacity(parsed.len());
    for component in parsed {
        match (components.last_mut(), component) {
            (Some(Component::Parallel(groups)), Component::Parallel(more)) => groups.extend(more),
            (_, component) => components.push(component),
        }
    }
    Ok((input, Node::Command(Command::Statement(Statement::new(components)))))
}

fn parse_component<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, Component> {
    alt((
        map(parse_group, |group| Component::Parallel(vec![group])),
        map(token!(Identifier(v)), Component::Name),
        map(token!(Quantity(q)), Component::Delay),
    ))(input)
}

/// Parse `(ITEM ...):OUTPUT[,OUTPUT]*` or `ITEM:OUTPUT[,OUTPUT]*`.
fn parse_group<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, Group> {
    let (input, items) = alt((
        delimited(token!(LParenthesis), many1(parse_item), token!(RParenthesis)),
        map(parse_item, |item| vec![item]),
    ))(input)?;
    let (input, _) = token!(Colon)(input)?;
    let (input, outputs) = separated_list1(token!(Comma), token!(Identifier(v)))(input)?;
    Ok((input, Group::new(items, outputs)))
}

fn parse_item<'a>(input: ParserInput<'a>) -> InternalParserResult<'a, Item> {
    alt((
        map(token!(Identifier(v)), Item::Name),
        map(token!(Quantity(q)), Item::Delay),
    ))(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ast::{
        Assignment, Command, Component, Declaration, DeclaredName, Group, Initializer, Item,
        Node, Repeat, RepeatCount, Statement, Value, ValuePath, VariableKind,
    };
    use crate::make_test;
    use crate::parser::lex;
    use crate::units::Quantity;

    use super::{parse_node, parse_program};

    fn quantity(text: &str) -> Quantity {
        text.parse().unwrap()
    }

    make_test!(
        int_declaration,
        parse_node,
        "int repeat = 2",
        Node::Declaration(Declaration::new(
            VariableKind::Int,
            vec![DeclaredName::new(
                "repeat",
                Some(Initializer::Value(Value::Integer(2)))
            )]
        ))
    );

    make_test!(
        delay_declaration,
        parse_node,
        "delay abc1 = 100 ns, def2",
        Node::Declaration(Declaration::new(
            VariableKind::Delay,
            vec![
                DeclaredName::new(
                    "abc1",
                    Some(Initializer::Value(Value::Quantity(quantity("100 ns"))))
                ),
                DeclaredName::new("def2", None),
            ]
        ))
    );

    make_test!(
        pulse_declaration,
        parse_node,
        "pulse ghi1, jkl2 = {shape: 'square', amplitude: 1 V}",
        Node::Declaration(Declaration::new(
            VariableKind::Pulse,
            vec![
                DeclaredName::new("ghi1", None),
                DeclaredName::new(
                    "jkl2",
                    Some(Initializer::Attributes(vec![
                        ("shape".to_owned(), Value::String("square".to_owned())),
                        ("amplitude".to_owned(), Value::Quantity(quantity("1 V"))),
                    ]))
                ),
            ]
        ))
    );

    make_test!(
        output_declaration,
        parse_node,
        "output mno1, pqr2",
        Node::Declaration(Declaration::new(
            VariableKind::Output,
            vec![
                DeclaredName::new("mno1", None),
                DeclaredName::new("pqr2", None)
            ]
        ))
    );

    make_test!(
        attribute_assignment,
        parse_node,
        "ghi1.length = 8 ns",
        Node::Assignment(Assignment::new(
            ValuePath::attribute("ghi1", "length"),
            Value::Quantity(quantity("8 ns"))
        ))
    );

    make_test!(
        name_assignment,
        parse_node,
        "def2 = 6",
        Node::Assignment(Assignment::new(ValuePath::new("def2"), Value::Integer(6)))
    );

    make_test!(acquire, parse_node, "acquire", Node::Command(Command::Acquire));

    make_test!(
        bare_delay,
        parse_node,
        "5 ns",
        Node::Command(Command::BareDelay(quantity("5 ns")))
    );

    make_test!(
        bare_name,
        parse_node,
        "abc1",
        Node::Command(Command::Statement(Statement::new(vec![Component::Name(
            "abc1".to_owned()
        )])))
    );

    make_test!(
        targeted_name,
        parse_node,
        "ghi1:mno1",
        Node::Command(Command::Statement(Statement::new(vec![
            Component::Parallel(vec![Group::new(
                vec![Item::Name("ghi1".to_owned())],
                vec!["mno1".to_owned()]
            )])
        ])))
    );

    make_test!(
        parallel_groups,
        parse_node,
        "(ghi1 abc1 10 ns jkl2):mno1 (def2 jkl2 def2):pqr2",
        Node::Command(Command::Statement(Statement::new(vec![
            Component::Parallel(vec![
                Group::new(
                    vec![
                        Item::Name("ghi1".to_owned()),
                        Item::Name("abc1".to_owned()),
                        Item::Delay(quantity("10 ns")),
                        Item::Name("jkl2".to_owned()),
                    ],
                    vec!["mno1".to_owned()]
                ),
                Group::new(
                    vec![
                        Item::Name("def2".to_owned()),
                        Item::Name("jkl2".to_owned()),
                        Item::Name("def2".to_owned()),
                    ],
                    vec!["pqr2".to_owned()]
                ),
            ])
        ])))
    );

    make_test!(
        sequential_components,
        parse_node,
        "abc1 (10 ns):pqr2,mno1 5 ns",
        Node::Command(Command::Statement(Statement::new(vec![
            Component::Name("abc1".to_owned()),
            Component::Parallel(vec![Group::new(
                vec![Item::Delay(quantity("10 ns"))],
                vec!["pqr2".to_owned(), "mno1".to_owned()]
            )]),
            Component::Delay(quantity("5 ns")),
        ])))
    );

    make_test!(
        repeat,
        parse_node,
        "times repeat {\n    def2\n    acquire\n}",
        Node::Command(Command::Repeat(Repeat::new(
            RepeatCount::Variable("repeat".to_owned()),
            vec![
                Node::Command(Command::Statement(Statement::new(vec![Component::Name(
                    "def2".to_owned()
                )]))),
                Node::Command(Command::Acquire),
            ]
        )))
    );

    make_test!(
        empty_repeat,
        parse_node,
        "times -1 {}",
        Node::Command(Command::Repeat(Repeat::new(RepeatCount::Literal(-1), vec![])))
    );

    #[test]
    fn semicolons_and_comments_separate_commands() {
        let tokens = lex(nom_locate::LocatedSpan::new(
            "# leading comment\ndef2 = 6 ; def2 = 6 Hz # trailing\n\n",
        ))
        .unwrap();
        let (_, nodes) = parse_program(&tokens).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Assignment(Assignment::new(ValuePath::new("def2"), Value::Integer(6))),
                Node::Assignment(Assignment::new(
                    ValuePath::new("def2"),
                    Value::Quantity(quantity("6 Hz"))
                )),
            ]
        );
    }

    #[test]
    fn commands_must_end_at_line_end() {
        let tokens = lex(nom_locate::LocatedSpan::new("acquire abc1")).unwrap();
        assert!(matches!(parse_program(&tokens), Err(nom::Err::Failure(_))));
    }

    #[test]
    fn unclosed_repeat() {
        let tokens = lex(nom_locate::LocatedSpan::new("times 2 {\n abc1\n")).unwrap();
        assert!(matches!(parse_program(&tokens), Err(nom::Err::Failure(_))));
    }

    #[test]
    fn stray_token() {
        let tokens = lex(nom_locate::LocatedSpan::new("abc1\n)")).unwrap();
        assert!(matches!(parse_program(&tokens), Err(nom::Err::Failure(_))));
    }
}
