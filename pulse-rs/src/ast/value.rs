use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::units::{Dimension, Quantity};

/// A literal value which can be bound to a variable or attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Quantity(Quantity),
    String(String),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<Quantity> {
        match self {
            Self::Quantity(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is a quantity of the given dimension.
    pub fn is_quantity_of(&self, dimension: Dimension) -> bool {
        self.as_quantity()
            .is_some_and(|quantity| quantity.has_dimension(dimension))
    }

    /// A short description of what kind of value this is, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Integer(_) => "an integer".to_owned(),
            Self::Float(_) => "a float".to_owned(),
            Self::Quantity(quantity) => format!("a {} quantity", quantity.dimension()),
            Self::String(_) => "a string".to_owned(),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Quantity> for Value {
    fn from(value: Quantity) -> Self {
        Self::Quantity(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Reads text the way a value typed by a user is meant: an integer if it is one, then a float,
/// then a quantity, and otherwise the text itself as a string.
impl FromStr for Value {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Ok(integer) = text.parse() {
            return Ok(Self::Integer(integer));
        }
        if text.starts_with(|chr: char| chr.is_ascii_digit() || chr == '-' || chr == '+') {
            if let Ok(float) = text.parse() {
                return Ok(Self::Float(float));
            }
        }
        if let Ok(quantity) = text.parse() {
            return Ok(Self::Quantity(quantity));
        }
        Ok(Self::String(s.to_owned()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            // Debug formatting always keeps a decimal point or exponent, so the text reads back
            // as a float rather than an integer.
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Quantity(value) => write!(f, "{value}"),
            Self::String(value) => {
                write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }
}

/// The address of a value: a variable name, optionally followed by one of its attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValuePath {
    pub name: String,
    pub attribute: Option<String>,
}

impl ValuePath {
    /// The path of a variable's own value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute: None,
        }
    }

    /// The path of one attribute of a variable.
    pub fn attribute(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute: Some(attribute.into()),
        }
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            None => write!(f, "{}", self.name),
            Some(attribute) => write!(f, "{}.{attribute}", self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid value path {0:?}: expected NAME or NAME.ATTRIBUTE")]
pub struct ValuePathParseError(String);

impl FromStr for ValuePath {
    type Err = ValuePathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let is_identifier = |text: &str| {
            text.starts_with(|chr: char| chr.is_ascii_alphabetic() || chr == '_')
                && text
                    .chars()
                    .all(|chr| chr.is_ascii_alphanumeric() || chr == '_')
        };
        let path = match s.trim().split_once('.') {
            None => Self::new(s.trim()),
            Some((name, attribute)) => Self::attribute(name, attribute),
        };
        let valid = is_identifier(&path.name)
            && path.attribute.as_deref().map_or(true, is_identifier);
        if valid {
            Ok(path)
        } else {
            Err(ValuePathParseError(s.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("5", Value::Integer(5))]
    #[case("-2", Value::Integer(-2))]
    #[case("2.5", Value::Float(2.5))]
    #[case("7 ns", Value::Quantity("7 ns".parse().unwrap()))]
    #[case("mno1", Value::String("mno1".to_owned()))]
    #[case("inf", Value::String("inf".to_owned()))]
    fn value_from_text(#[case] text: &str, #[case] expected: Value) {
        assert_eq!(text.parse::<Value>().unwrap(), expected);
    }

    #[rstest]
    #[case(Value::Integer(3), "3")]
    #[case(Value::Float(2.0), "2.0")]
    #[case(Value::Quantity("100 ns".parse().unwrap()), "100 ns")]
    #[case(Value::String("say \"hi\"".to_owned()), r#""say \"hi\"""#)]
    fn value_display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    #[case("abc1", ValuePath::new("abc1"))]
    #[case("ghi1.length", ValuePath::attribute("ghi1", "length"))]
    #[case("_acq_marker.num", ValuePath::attribute("_acq_marker", "num"))]
    fn path_round_trip(#[case] text: &str, #[case] expected: ValuePath) {
        let path: ValuePath = text.parse().unwrap();
        assert_eq!(path, expected);
        assert_eq!(path.to_string(), text);
    }

    #[rstest]
    #[case("")]
    #[case("1abc")]
    #[case("a.")]
    #[case("a.b.c")]
    fn bad_paths(#[case] text: &str) {
        assert!(text.parse::<ValuePath>().is_err());
    }
}
