use std::fmt;

use super::{write_join, Value};

/// What a declared name stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VariableKind {
    Int,
    Delay,
    Pulse,
    Output,
    /// The pseudo-variable holding acquisition routing; never declared in source.
    AcqMarker,
}

/// A declaration of one or more names of the same kind, e.g. `delay abc1 = 100 ns, def2`.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub kind: VariableKind,
    pub names: Vec<DeclaredName>,
}

impl Declaration {
    pub fn new(kind: VariableKind, names: Vec<DeclaredName>) -> Self {
        Self { kind, names }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind)?;
        write_join(f, &self.names, ", ")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredName {
    pub name: String,
    pub initializer: Option<Initializer>,
}

impl DeclaredName {
    pub fn new(name: impl Into<String>, initializer: Option<Initializer>) -> Self {
        Self {
            name: name.into(),
            initializer,
        }
    }
}

impl fmt::Display for DeclaredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(initializer) = &self.initializer {
            write!(f, " = {initializer}")?;
        }
        Ok(())
    }
}

/// The value given to a name where it is declared.
#[derive(Clone, Debug, PartialEq)]
pub enum Initializer {
    Value(Value),
    /// `{attribute: value, ...}`, kept in source order.
    Attributes(Vec<(String, Value)>),
}

impl fmt::Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Attributes(attributes) => {
                write!(f, "{{")?;
                for (index, (attribute, value)) in attributes.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{attribute}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
