//! Cell value parsers.
//!
//! Each parser turns one present [`Cell`] into a [`FieldValue`]. A parser error
//! is a plain message; the mapper attaches coordinates and logs it. New source
//! encodings are added as new [`CellParser`] implementations, never by
//! touching the mapper.

use rust_decimal::Decimal;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::cell::Cell;

/// A parsed value, ready to be stored by a field setter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Bool(bool),
}

impl FieldValue {
    /// Text representation; numbers and booleans are formatted.
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Decimal(d) => d.normalize().to_string(),
            FieldValue::Bool(b) => b.to_string(),
        }
    }

    pub fn into_integer(self) -> Result<i64, String> {
        match self {
            FieldValue::Integer(i) => Ok(i),
            FieldValue::Decimal(d) if d.fract().is_zero() => {
                i64::try_from(d).map_err(|e| e.to_string())
            }
            FieldValue::Text(s) => s.trim().parse().map_err(|e| format!("'{s}': {e}")),
            other => Err(format!("expected an integer, found {other:?}")),
        }
    }

    pub fn into_decimal(self) -> Result<Decimal, String> {
        match self {
            FieldValue::Decimal(d) => Ok(d),
            FieldValue::Integer(i) => Ok(Decimal::from(i)),
            FieldValue::Text(s) => Decimal::from_str(s.trim()).map_err(|e| format!("'{s}': {e}")),
            FieldValue::Bool(b) => Err(format!("expected a number, found {b}")),
        }
    }

    pub fn into_bool(self) -> Result<bool, String> {
        match self {
            FieldValue::Bool(b) => Ok(b),
            other => Err(format!("expected a boolean, found {other:?}")),
        }
    }
}

/// Converts one cell into a field value.
pub trait CellParser: Send + Sync + fmt::Debug {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Parse a present cell. Errors are recoverable.
    fn parse(&self, cell: &Cell) -> Result<FieldValue, String>;
}

/// Copies the cell's native representation without conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl CellParser for DefaultParser {
    fn name(&self) -> &'static str {
        "default"
    }

    fn parse(&self, cell: &Cell) -> Result<FieldValue, String> {
        match cell {
            Cell::Text(s) => Ok(FieldValue::Text(s.clone())),
            Cell::Int(i) => Ok(FieldValue::Integer(*i)),
            Cell::Float(f) => decimal_from_float(*f).map(FieldValue::Decimal),
            Cell::Bool(b) => Ok(FieldValue::Bool(*b)),
            Cell::Empty => Err("cell is empty".into()),
        }
    }
}

/// Base-10 integer stored as text. Integral numeric cells are accepted as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerTextParser;

impl CellParser for IntegerTextParser {
    fn name(&self) -> &'static str {
        "integer-text"
    }

    fn parse(&self, cell: &Cell) -> Result<FieldValue, String> {
        match cell {
            Cell::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|e| format!("'{s}' is not an integer: {e}")),
            Cell::Int(i) => Ok(FieldValue::Integer(*i)),
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Ok(FieldValue::Integer(*f as i64))
            }
            other => Err(format!("'{other}' is not an integer")),
        }
    }
}

/// Fractional percentage (0.19) stored as a number, returned as percent (19).
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageParser;

impl CellParser for PercentageParser {
    fn name(&self) -> &'static str {
        "percentage"
    }

    fn parse(&self, cell: &Cell) -> Result<FieldValue, String> {
        let fraction = match cell {
            Cell::Float(f) => decimal_from_float(*f)?,
            Cell::Int(i) => Decimal::from(*i),
            Cell::Text(s) => {
                Decimal::from_str(s.trim()).map_err(|e| format!("'{s}' is not a number: {e}"))?
            }
            other => return Err(format!("'{other}' is not a number")),
        };
        fraction
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(FieldValue::Decimal)
            .ok_or_else(|| format!("percentage {fraction} overflows"))
    }
}

/// Two fixed localized tokens mapped to `true` / `false`.
#[derive(Debug, Clone)]
pub struct LocalizedYesNoParser {
    yes: Cow<'static, str>,
    no: Cow<'static, str>,
}

impl LocalizedYesNoParser {
    /// Arabic "yes".
    pub const ARABIC_YES: &'static str = "نعم";
    /// Arabic "no".
    pub const ARABIC_NO: &'static str = "لا";

    pub fn new(yes: impl Into<Cow<'static, str>>, no: impl Into<Cow<'static, str>>) -> Self {
        Self {
            yes: yes.into(),
            no: no.into(),
        }
    }
}

impl Default for LocalizedYesNoParser {
    fn default() -> Self {
        Self::new(Self::ARABIC_YES, Self::ARABIC_NO)
    }
}

impl CellParser for LocalizedYesNoParser {
    fn name(&self) -> &'static str {
        "localized-yes-no"
    }

    fn parse(&self, cell: &Cell) -> Result<FieldValue, String> {
        let Cell::Text(s) = cell else {
            return Err(format!("'{cell}' is not text"));
        };
        let token = s.trim();
        if token == self.yes {
            Ok(FieldValue::Bool(true))
        } else if token == self.no {
            Ok(FieldValue::Bool(false))
        } else {
            Err(format!(
                "'{token}' is neither '{}' nor '{}'",
                self.yes, self.no
            ))
        }
    }
}

fn decimal_from_float(f: f64) -> Result<Decimal, String> {
    Decimal::try_from(f).map_err(|e| format!("{f} is not representable: {e}"))
}
