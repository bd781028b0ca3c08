//! The syntax tree of a pulse sequence.
//!
//! Every node renders back to source text through [`Display`](std::fmt::Display); quantities keep
//! the SI prefix they were written with.

mod command;
mod declaration;
mod value;

use std::fmt;

pub use command::{Command, Component, Group, Item, Repeat, RepeatCount, Statement};
pub use declaration::{Declaration, DeclaredName, Initializer, VariableKind};
pub use value::{Value, ValuePath, ValuePathParseError};

/// One line of a pulse sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Declaration(Declaration),
    Assignment(Assignment),
    Command(Command),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(declaration) => write!(f, "{declaration}"),
            Self::Assignment(assignment) => write!(f, "{assignment}"),
            Self::Command(command) => write!(f, "{command}"),
        }
    }
}

/// `NAME = value` or `NAME.ATTRIBUTE = value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub path: ValuePath,
    pub value: Value,
}

impl Assignment {
    pub fn new(path: ValuePath, value: Value) -> Self {
        Self { path, value }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.path, self.value)
    }
}

/// Write a sequence of items to the given writer, joined with the provided `joiner`.
pub(crate) fn write_join<'i, I, T>(writer: &mut impl fmt::Write, values: I, joiner: &str) -> fmt::Result
where
    I: IntoIterator<Item = &'i T>,
    T: fmt::Display + 'i,
{
    let mut iter = values.into_iter();
    if let Some(first) = iter.next() {
        write!(writer, "{first}")?;
        for value in iter {
            write!(writer, "{joiner}{value}")?;
        }
    }
    Ok(())
}
