//! Unit-bearing quantity handling
//!
//! The host file format renders numeric tool parameters as strings
//! with a unit suffix, e.g. `"12.5 mm"` or `"60 °"`, and depending on
//! the UI locale the decimal separator may be a comma. Parsing here
//! accepts both separators; formatting produces the canonical
//! dot-separated form (the format codec applies the locale rewrite).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement unit carried by a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Millimeters
    Millimeter,
    /// Inches
    Inch,
    /// Degrees (cutting edge angles, tip angles)
    Degree,
}

impl Default for Unit {
    fn default() -> Self {
        Self::Millimeter
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeter => write!(f, "mm"),
            Self::Inch => write!(f, "in"),
            Self::Degree => write!(f, "\u{00b0}"),
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mm" => Ok(Self::Millimeter),
            "in" | "inch" | "\"" => Ok(Self::Inch),
            "\u{00b0}" | "deg" | "degree" => Ok(Self::Degree),
            other => Err(format!("Unknown unit: {}", other)),
        }
    }
}

/// A numeric value together with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// The numeric magnitude.
    pub value: f64,
    /// The unit of the magnitude.
    pub unit: Unit,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Millimeter quantity shorthand
    pub fn mm(value: f64) -> Self {
        Self::new(value, Unit::Millimeter)
    }

    /// Degree quantity shorthand
    pub fn degrees(value: f64) -> Self {
        Self::new(value, Unit::Degree)
    }

    /// Convert to another length unit. Degrees do not convert.
    pub fn to_unit(&self, unit: Unit) -> Option<Quantity> {
        let value = match (self.unit, unit) {
            (a, b) if a == b => self.value,
            (Unit::Millimeter, Unit::Inch) => self.value / 25.4,
            (Unit::Inch, Unit::Millimeter) => self.value * 25.4,
            _ => return None,
        };
        Some(Quantity::new(value, unit))
    }

    /// Split a quantity string into its numeric prefix and unit
    /// suffix. The suffix may be separated by whitespace or attached
    /// directly; either part may be empty.
    pub fn split_suffix(input: &str) -> (&str, &str) {
        let input = input.trim();
        let split = input
            .find(|c: char| !c.is_ascii_digit() && !matches!(c, '+' | '-' | '.' | ',' | 'e' | 'E'))
            .unwrap_or(input.len());
        let (number, suffix) = input.split_at(split);
        (number, suffix.trim())
    }

    /// Parse a quantity string, falling back to `default_unit` when no
    /// unit suffix is present. A comma decimal separator is accepted.
    ///
    /// * `input` - String to parse, e.g. `"12,5 mm"`, `"12.5mm"`, `"3"`
    /// * `default_unit` - Unit assumed for bare numbers
    pub fn parse_with_unit(input: &str, default_unit: Unit) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("Empty quantity".to_string());
        }

        let (number, suffix) = Self::split_suffix(input);
        let number = number.replace(',', ".");
        let value = number
            .parse::<f64>()
            .map_err(|_| format!("Invalid number: {}", input))?;

        let unit = if suffix.is_empty() {
            default_unit
        } else {
            suffix.parse::<Unit>()?
        };
        Ok(Self { value, unit })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_unit(s, Unit::Millimeter)
    }
}
