use std::fmt;

use super::{write_join, Node};
use crate::units::Quantity;

/// An entry of the timeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// One line of sequential components.
    Statement(Statement),
    /// `times COUNT { ... }`
    Repeat(Repeat),
    /// `acquire`
    Acquire,
    /// A line holding nothing but a quantity.
    BareDelay(Quantity),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statement(statement) => write!(f, "{statement}"),
            Self::Repeat(repeat) => write!(f, "{repeat}"),
            Self::Acquire => write!(f, "acquire"),
            Self::BareDelay(quantity) => write!(f, "{quantity}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub components: Vec<Component>,
}

impl Statement {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_join(f, &self.components, " ")
    }
}

/// One step of a statement. Components of a statement happen one after the other.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// A declared delay or pulse, played on the default output.
    Name(String),
    /// An anonymous delay.
    Delay(Quantity),
    /// Groups which play at the same time, each on its own outputs.
    Parallel(Vec<Group>),
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Delay(quantity) => write!(f, "{quantity}"),
            Self::Parallel(groups) => write_join(f, groups, " "),
        }
    }
}

/// `(ITEM ITEM ...):OUTPUT[,OUTPUT]*`, or `ITEM:OUTPUT[,OUTPUT]*` for a single item.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub items: Vec<Item>,
    pub outputs: Vec<String>,
}

impl Group {
    pub fn new(items: Vec<Item>, outputs: Vec<String>) -> Self {
        Self { items, outputs }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.items.as_slice() {
            [Item::Name(name)] => write!(f, "{name}")?,
            items => {
                write!(f, "(")?;
                write_join(f, items, " ")?;
                write!(f, ")")?;
            }
        }
        write!(f, ":")?;
        write_join(f, &self.outputs, ",")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Name(String),
    Delay(Quantity),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Delay(quantity) => write!(f, "{quantity}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Repeat {
    pub count: RepeatCount,
    pub body: Vec<Node>,
}

impl Repeat {
    pub fn new(count: RepeatCount, body: Vec<Node>) -> Self {
        Self { count, body }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            return write!(f, "times {} {{}}", self.count);
        }
        writeln!(f, "times {} {{", self.count)?;
        for node in &self.body {
            for line in node.to_string().lines() {
                writeln!(f, "    {line}")?;
            }
        }
        write!(f, "}}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RepeatCount {
    Literal(i64),
    Variable(String),
}

impl fmt::Display for RepeatCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(count) => write!(f, "{count}"),
            Self::Variable(name) => write!(f, "{name}"),
        }
    }
}
