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

//! Dimensioned scalar values and their SI-prefixed text representation.
//!
//! A [`Quantity`] always stores its value in the base unit of its [`Dimension`]; the prefix that
//! was used to write it down is kept only so that it can be written back out the same way.
//!
//! Two layers of dimension checking are available:
//!
//! * [`Quantity`] carries its dimension at runtime. Its comparison and arithmetic methods return
//!   [`IncompatibleDimensions`] when the operands disagree.
//! * [`Measure`] carries its unit in the type, so mixing dimensions is a compile error.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, one_of, space0},
    combinator::{all_consuming, map, opt, recognize},
    sequence::{delimited, pair, tuple},
    Finish, IResult,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator;

/// Maximum number of significant digits emitted when formatting a quantity.
const SIGNIFICANT_DIGITS: i32 = 12;

/// A physical quantity category. Each has exactly one canonical unit.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Time,
    Frequency,
    Voltage,
    Current,
    MagneticField,
}

impl Dimension {
    /// The canonical unit symbol, without any prefix.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Time => "s",
            Self::Frequency => "Hz",
            Self::Voltage => "V",
            Self::Current => "A",
            Self::MagneticField => "T",
        }
    }

    /// Look up the dimension whose canonical unit is `symbol`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        UNIT_SYMBOLS.get(symbol).copied()
    }
}

static UNIT_SYMBOLS: Lazy<HashMap<&'static str, Dimension>> = Lazy::new(|| {
    let table: HashMap<_, _> = Dimension::iter()
        .map(|dimension| (dimension.symbol(), dimension))
        .collect();
    assert_eq!(
        table.len(),
        Dimension::iter().count(),
        "every dimension must have its own unit symbol"
    );
    table
});

/// An SI prefix, from yocto (10⁻²⁴) to yotta (10²⁴).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Prefix {
    Yocto,
    Zepto,
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Centi,
    Deci,
    Deca,
    Hecto,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
}

impl Prefix {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Yocto => "y",
            Self::Zepto => "z",
            Self::Atto => "a",
            Self::Femto => "f",
            Self::Pico => "p",
            Self::Nano => "n",
            Self::Micro => "u",
            Self::Milli => "m",
            Self::Centi => "c",
            Self::Deci => "d",
            Self::Deca => "da",
            Self::Hecto => "h",
            Self::Kilo => "k",
            Self::Mega => "M",
            Self::Giga => "G",
            Self::Tera => "T",
            Self::Peta => "P",
            Self::Exa => "E",
            Self::Zetta => "Z",
            Self::Yotta => "Y",
        }
    }

    /// The power of ten this prefix stands for.
    pub fn exponent(self) -> i32 {
        match self {
            Self::Yocto => -24,
            Self::Zepto => -21,
            Self::Atto => -18,
            Self::Femto => -15,
            Self::Pico => -12,
            Self::Nano => -9,
            Self::Micro => -6,
            Self::Milli => -3,
            Self::Centi => -2,
            Self::Deci => -1,
            Self::Deca => 1,
            Self::Hecto => 2,
            Self::Kilo => 3,
            Self::Mega => 6,
            Self::Giga => 9,
            Self::Tera => 12,
            Self::Peta => 15,
            Self::Exa => 18,
            Self::Zetta => 21,
            Self::Yotta => 24,
        }
    }

    /// `µ` is accepted as well as `u` for micro.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if symbol == "µ" {
            return Some(Self::Micro);
        }
        Self::iter().find(|prefix| prefix.symbol() == symbol)
    }

    /// Convert a value expressed with this prefix into the base unit.
    ///
    /// Negative exponents divide by an exact power of ten rather than multiplying by an inexact
    /// reciprocal, so that `100 ns` is stored as exactly `1e-7`.
    pub fn apply(self, value: f64) -> f64 {
        let exponent = self.exponent();
        if exponent >= 0 {
            value * 10f64.powi(exponent)
        } else {
            value / 10f64.powi(-exponent)
        }
    }

    /// Express a base-unit value with this prefix.
    pub fn remove(self, value: f64) -> f64 {
        let exponent = self.exponent();
        if exponent >= 0 {
            value / 10f64.powi(exponent)
        } else {
            value * 10f64.powi(-exponent)
        }
    }

    /// The power-of-1000 prefix which brings `value` into `[1, 1000)`, clamped to the table.
    /// Returns `None` when no prefix is needed.
    fn engineering_for(value: f64) -> Option<Self> {
        if value == 0.0 || !value.is_finite() {
            return None;
        }
        let magnitude = value.abs().log10().floor() as i32;
        let exponent = (magnitude.div_euclid(3) * 3).clamp(-24, 24);
        Self::iter().find(|prefix| prefix.exponent() == exponent)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Resolve unit text such as `ns` or `daA` to its prefix and dimension.
///
/// Exactly one `(prefix, dimension)` pair must spell the text.
pub fn resolve_unit(unit: &str) -> Option<(Option<Prefix>, Dimension)> {
    let mut candidates = Dimension::iter().filter_map(|dimension| {
        let prefix = unit.strip_suffix(dimension.symbol())?;
        if prefix.is_empty() {
            Some((None, dimension))
        } else {
            Prefix::from_symbol(prefix).map(|prefix| (Some(prefix), dimension))
        }
    });
    let first = candidates.next()?;
    candidates.next().is_none().then_some(first)
}

/// The operands of a comparison or arithmetic operation have different dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("incompatible dimensions: {left} and {right}")]
pub struct IncompatibleDimensions {
    pub left: Dimension,
    pub right: Dimension,
}

/// Text could not be read as a [`Quantity`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QuantityParseError {
    #[error("malformed quantity {0:?}")]
    Malformed(String),

    #[error("unknown unit {unit:?}")]
    UnknownUnit { unit: String },
}

/// A dimensioned scalar value.
///
/// `PartialEq` compares value and dimension and ignores the original prefix. For ordering, and
/// for comparisons which must reject mismatched dimensions, use the `try_*` methods.
#[derive(Clone, Copy, Debug)]
pub struct Quantity {
    value: f64,
    dimension: Dimension,
    original_prefix: Option<Prefix>,
}

impl Quantity {
    /// Create a quantity from a value already in the dimension's base unit.
    pub fn new(value: f64, dimension: Dimension) -> Self {
        Self {
            value,
            dimension,
            original_prefix: None,
        }
    }

    /// Create a quantity from a value expressed in `unit`, e.g. `Quantity::with_unit(1.0, "mV")`.
    ///
    /// The prefix in `unit` is remembered for display.
    pub fn with_unit(value: f64, unit: &str) -> Result<Self, QuantityParseError> {
        let (prefix, dimension) =
            resolve_unit(unit).ok_or_else(|| QuantityParseError::UnknownUnit {
                unit: unit.to_owned(),
            })?;
        Ok(Self {
            value: prefix.map_or(value, |prefix| prefix.apply(value)),
            dimension,
            original_prefix: prefix,
        })
    }

    /// The value in the base unit.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn original_prefix(&self) -> Option<Prefix> {
        self.original_prefix
    }

    pub fn set_original_prefix(&mut self, prefix: Option<Prefix>) {
        self.original_prefix = prefix;
    }

    /// This quantity with its display prefix forgotten.
    pub fn without_original_prefix(self) -> Self {
        Self {
            original_prefix: None,
            ..self
        }
    }

    /// Soft dimension check.
    pub fn has_dimension(&self, dimension: Dimension) -> bool {
        self.dimension == dimension
    }

    /// Fail with [`IncompatibleDimensions`] unless this quantity has the given dimension.
    pub fn assert_dimension(&self, dimension: Dimension) -> Result<(), IncompatibleDimensions> {
        if self.has_dimension(dimension) {
            Ok(())
        } else {
            Err(IncompatibleDimensions {
                left: self.dimension,
                right: dimension,
            })
        }
    }

    fn compatible_with(&self, other: &Self) -> Result<(), IncompatibleDimensions> {
        self.assert_dimension(other.dimension)
    }

    /// Order two quantities of the same dimension.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, IncompatibleDimensions> {
        self.compatible_with(other)?;
        Ok(self.value.total_cmp(&other.value))
    }

    pub fn try_eq(&self, other: &Self) -> Result<bool, IncompatibleDimensions> {
        self.compatible_with(other)?;
        Ok(self.value == other.value)
    }

    pub fn try_ne(&self, other: &Self) -> Result<bool, IncompatibleDimensions> {
        self.try_eq(other).map(|equal| !equal)
    }

    pub fn try_lt(&self, other: &Self) -> Result<bool, IncompatibleDimensions> {
        self.try_cmp(other).map(Ordering::is_lt)
    }

    pub fn try_le(&self, other: &Self) -> Result<bool, IncompatibleDimensions> {
        self.try_cmp(other).map(Ordering::is_le)
    }

    pub fn try_gt(&self, other: &Self) -> Result<bool, IncompatibleDimensions> {
        self.try_cmp(other).map(Ordering::is_gt)
    }

    pub fn try_ge(&self, other: &Self) -> Result<bool, IncompatibleDimensions> {
        self.try_cmp(other).map(Ordering::is_ge)
    }

    pub fn checked_add(self, other: Self) -> Result<Self, IncompatibleDimensions> {
        self.compatible_with(&other)?;
        Ok(Self {
            value: self.value + other.value,
            ..self
        })
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, IncompatibleDimensions> {
        self.compatible_with(&other)?;
        Ok(Self {
            value: self.value - other.value,
            ..self
        })
    }

    /// The prefix used by [`Display`](fmt::Display).
    fn display_prefix(&self) -> Option<Prefix> {
        match self.original_prefix {
            Some(prefix) if prefix.remove(self.value).is_finite() => Some(prefix),
            _ => Prefix::engineering_for(self.value),
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.value == other.value
    }
}

impl Mul<f64> for Quantity {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            value: self.value * rhs,
            ..self
        }
    }
}

impl Neg for Quantity {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            value: -self.value,
            ..self
        }
    }
}

impl approx::AbsDiffEq for Quantity {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.dimension == other.dimension && self.value.abs_diff_eq(&other.value, epsilon)
    }
}

impl approx::RelativeEq for Quantity {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.dimension == other.dimension
            && self.value.relative_eq(&other.value, epsilon, max_relative)
    }
}

/// Write a mantissa with at most [`SIGNIFICANT_DIGITS`] significant digits and no trailing zeros.
fn format_mantissa(value: f64) -> String {
    let magnitude = value.abs().log10().floor() as i32;
    if !(-5..16).contains(&magnitude) {
        let text = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{exponent}", trim_fraction(mantissa)),
            None => text,
        };
    }
    let decimals = (SIGNIFICANT_DIGITS - 1 - magnitude).max(0) as usize;
    trim_fraction(&format!("{value:.decimals$}")).to_owned()
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.dimension.symbol();
        if self.value == 0.0 {
            return write!(f, "0 {symbol}");
        }
        if !self.value.is_finite() {
            return write!(f, "{} {symbol}", self.value);
        }
        match self.display_prefix() {
            Some(prefix) => write!(
                f,
                "{} {prefix}{symbol}",
                format_mantissa(prefix.remove(self.value))
            ),
            None => write!(f, "{} {symbol}", format_mantissa(self.value)),
        }
    }
}

fn is_unit_character(chr: char) -> bool {
    chr.is_alphabetic()
}

/// Recognize `<optional sign><digits>[.<digits>][e<exponent>]`.
fn recognize_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

fn split_quantity(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(delimited(
        multispace0,
        map(
            tuple((recognize_number, space0, take_while1(is_unit_character))),
            |(number, _, unit)| (number, unit),
        ),
        multispace0,
    ))(input)
}

impl FromStr for Quantity {
    type Err = QuantityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || QuantityParseError::Malformed(s.to_owned());
        let (_, (number, unit)) = split_quantity(s).finish().map_err(|_| malformed())?;
        let number: f64 = number.parse().map_err(|_| malformed())?;
        Self::with_unit(number, unit)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A unit whose dimension is known at compile time.
pub trait Unit {
    const DIMENSION: Dimension;
}

macro_rules! units {
    ($($(#[$meta:meta])* $name:ident => $dimension:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
            pub enum $name {}

            impl Unit for $name {
                const DIMENSION: Dimension = Dimension::$dimension;
            }
        )*
    };
}

units! {
    /// Seconds.
    Second => Time,
    /// Hertz.
    Hertz => Frequency,
    /// Volts.
    Volt => Voltage,
    /// Amperes.
    Ampere => Current,
    /// Tesla.
    Tesla => MagneticField,
}

/// A value in the base unit `U`. Arithmetic and ordering are only defined between measures of
/// the same unit, so dimension mistakes do not compile.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Measure<U> {
    value: f64,
    unit: PhantomData<U>,
}

impl<U: Unit> Measure<U> {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            unit: PhantomData,
        }
    }

    pub fn value(self) -> f64 {
        self.value
    }
}

impl<U: Unit> TryFrom<Quantity> for Measure<U> {
    type Error = IncompatibleDimensions;

    fn try_from(quantity: Quantity) -> Result<Self, Self::Error> {
        quantity.assert_dimension(U::DIMENSION)?;
        Ok(Self::new(quantity.value()))
    }
}

impl<U: Unit> From<Measure<U>> for Quantity {
    fn from(measure: Measure<U>) -> Self {
        Quantity::new(measure.value, U::DIMENSION)
    }
}

impl<U: Unit> Add for Measure<U> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value)
    }
}

impl<U: Unit> Sub for Measure<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value)
    }
}

impl<U: Unit> Mul<f64> for Measure<U> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs)
    }
}

/// A duration times a rate is a plain number of events (e.g. samples).
impl Mul<Measure<Hertz>> for Measure<Second> {
    type Output = f64;

    fn mul(self, rhs: Measure<Hertz>) -> f64 {
        self.value * rhs.value
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[test]
    fn every_dimension_has_one_unit() {
        let symbols: HashSet<_> = Dimension::iter().map(Dimension::symbol).collect();
        assert_eq!(symbols.len(), Dimension::iter().count());
        for dimension in Dimension::iter() {
            assert_eq!(Dimension::from_symbol(dimension.symbol()), Some(dimension));
        }
    }

    #[rstest]
    #[case("0 s", 0.0, Dimension::Time)]
    #[case("500 ms", 0.5, Dimension::Time)]
    #[case("10 Hz", 10.0, Dimension::Frequency)]
    #[case("123456789 ns", 123456789e-9, Dimension::Time)]
    #[case("987654321 GHz", 987654321e9, Dimension::Frequency)]
    #[case("-56 pA", -56e-12, Dimension::Current)]
    #[case("5s", 5.0, Dimension::Time)]
    #[case(" \t 123454321 \t   uHz  \t  ", 123454321e-6, Dimension::Frequency)]
    #[case("2.5e3 mV", 2.5, Dimension::Voltage)]
    #[case("1 daA", 10.0, Dimension::Current)]
    #[case("3 µs", 3e-6, Dimension::Time)]
    #[case("1.5 T", 1.5, Dimension::MagneticField)]
    #[case("20 mT", 0.02, Dimension::MagneticField)]
    fn from_string(#[case] text: &str, #[case] value: f64, #[case] dimension: Dimension) {
        let quantity: Quantity = text.parse().unwrap();
        assert_eq!(quantity.dimension(), dimension);
        assert_relative_eq!(quantity.value(), value, max_relative = 1e-12);
    }

    #[rstest]
    #[case("")]
    #[case("0")]
    #[case("s")]
    #[case("0seconds")]
    #[case("0 something")]
    #[case("1234 anything")]
    #[case("s 0")]
    #[case("1.s")]
    fn bad_from_string(#[case] text: &str) {
        assert!(text.parse::<Quantity>().is_err(), "{text:?} should not parse");
    }

    #[test]
    fn spacing_is_irrelevant() {
        assert_eq!("5s".parse::<Quantity>(), "5 s".parse::<Quantity>());
    }

    #[test]
    fn unknown_unit_is_reported() {
        assert_eq!(
            "0 something".parse::<Quantity>(),
            Err(QuantityParseError::UnknownUnit {
                unit: "something".to_owned()
            })
        );
    }

    #[test]
    fn assert_dimension() {
        let quantity = Quantity::new(5.0, Dimension::Time);

        assert!(quantity.has_dimension(Dimension::Time));
        assert!(!quantity.has_dimension(Dimension::Frequency));

        assert!(quantity.assert_dimension(Dimension::Time).is_ok());
        assert_eq!(
            quantity.assert_dimension(Dimension::Frequency),
            Err(IncompatibleDimensions {
                left: Dimension::Time,
                right: Dimension::Frequency
            })
        );
    }

    #[test]
    fn comparison() {
        let time = |value| Quantity::new(value, Dimension::Time);
        let frequency = |value| Quantity::new(value, Dimension::Frequency);

        assert!(time(1.0).try_eq(&time(1.0)).unwrap());
        assert!(time(1.0).try_lt(&time(2.0)).unwrap());
        assert!(time(5.5).try_ge(&time(5.5)).unwrap());
        assert!(time(5.5).try_ne(&time(5.4)).unwrap());
        assert!(!time(5.5).try_gt(&time(5.5)).unwrap());
        assert!(time(5.4).try_le(&time(5.5)).unwrap());

        assert!(time(1.0).try_gt(&frequency(1.0)).is_err());
        assert!(time(1.0).try_le(&frequency(1.0)).is_err());
        assert!(time(1.0).try_eq(&frequency(1.0)).is_err());
        assert!(time(1.0).try_ne(&frequency(1.0)).is_err());
        assert!(time(1.0).checked_add(frequency(1.0)).is_err());
    }

    #[test]
    fn prefix_does_not_affect_equality() {
        let parsed: Quantity = "1000 ms".parse().unwrap();
        assert_eq!(parsed.original_prefix(), Some(Prefix::Milli));
        assert_eq!(parsed, Quantity::new(1.0, Dimension::Time));
    }

    #[rstest]
    #[case(0.0, Dimension::Time, "0 s")]
    #[case(1.0, Dimension::Time, "1 s")]
    #[case(10.0, Dimension::Current, "10 A")]
    #[case(0.5, Dimension::Frequency, "500 mHz")]
    #[case(1234.0, Dimension::Time, "1.234 ks")]
    #[case(-123456789.0, Dimension::Frequency, "-123.456789 MHz")]
    #[case(3e40, Dimension::Current, "3e16 YA")]
    #[case(-3e40, Dimension::Current, "-3e16 YA")]
    #[case(7e-40, Dimension::Current, "7e-16 yA")]
    #[case(-7e-40, Dimension::Current, "-7e-16 yA")]
    fn to_string(#[case] value: f64, #[case] dimension: Dimension, #[case] expected: &str) {
        let quantity = Quantity::new(value, dimension);
        assert_eq!(quantity.to_string(), expected);

        let reparsed: Quantity = quantity.to_string().parse().unwrap();
        assert_relative_eq!(reparsed, quantity, max_relative = 1e-9);
    }

    #[test]
    fn keeps_original_prefix() {
        let unprefixed = Quantity::new(1234.0, Dimension::Time);
        assert_eq!(unprefixed.to_string(), "1.234 ks");

        let kept: Quantity = "1234 ns".parse().unwrap();
        assert_eq!(kept.to_string(), "1234 ns");

        let mut cleared = kept;
        cleared.set_original_prefix(None);
        assert_eq!(cleared.to_string(), "1.234 us");
        assert_eq!(kept.without_original_prefix().to_string(), "1.234 us");
    }

    #[test]
    fn with_unit() {
        let millivolt = Quantity::with_unit(1.0, "mV").unwrap();
        assert_eq!(millivolt.dimension(), Dimension::Voltage);
        assert_relative_eq!(millivolt.value(), 1e-3);
        assert_eq!(millivolt.to_string(), "1 mV");
        assert!(Quantity::with_unit(1.0, "furlong").is_err());
    }

    #[test]
    fn serde_uses_text_form() {
        #[derive(Deserialize, Serialize)]
        struct Wrapper {
            rate: Quantity,
        }

        let wrapper: Wrapper = toml::from_str(r#"rate = "1.2 GHz""#).unwrap();
        assert_relative_eq!(wrapper.rate.value(), 1.2e9);
        assert_eq!(
            toml::to_string(&wrapper).unwrap().trim(),
            r#"rate = "1.2 GHz""#
        );
    }

    #[test]
    fn measures() {
        let length: Measure<Second> = "8 ns".parse::<Quantity>().unwrap().try_into().unwrap();
        let rate: Measure<Hertz> = Measure::new(1e9);
        assert_relative_eq!(length * rate, 8.0);
        assert!(length < length + Measure::new(1e-9));
        assert!(Measure::<Volt>::try_from(Quantity::new(1.0, Dimension::Time)).is_err());
        assert_eq!(
            Quantity::from(Measure::<Volt>::new(0.5)),
            Quantity::new(0.5, Dimension::Voltage)
        );
    }

    proptest! {
        #[test]
        fn text_round_trip(mantissa in -999.0f64..999.0, exponent in -30i32..30, dimension_index in 0usize..5) {
            let dimension = Dimension::iter().nth(dimension_index).unwrap();
            let quantity = Quantity::new(mantissa * 10f64.powi(exponent), dimension);
            let reparsed: Quantity = quantity.to_string().parse().unwrap();
            prop_assert_eq!(reparsed.dimension(), dimension);
            if quantity.value() == 0.0 {
                prop_assert_eq!(reparsed.value(), 0.0);
            } else {
                prop_assert!(((reparsed.value() - quantity.value()) / quantity.value()).abs() < 1e-9);
            }
        }
    }
}
