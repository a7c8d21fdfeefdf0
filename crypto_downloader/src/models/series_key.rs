//! Identity of a downloadable dataset: a trading symbol plus a timeframe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::timeframe::{Timeframe, TimeframeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Symbol cannot be empty")]
    Empty,

    #[error("Symbol '{symbol}' contains unsupported character {found:?}")]
    InvalidCharacter { symbol: String, found: char },
}

/// Exchange trading symbol such as `BTCUSDT`.
///
/// Only ASCII letters, digits, `-` and `_` are accepted, which keeps every
/// symbol usable as a file-name component. Letters are upper-cased, the form
/// exchanges list symbols in, so symbols differing only by case are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SymbolError> {
        let symbol = raw.as_ref().trim();
        if symbol.is_empty() {
            return Err(SymbolError::Empty);
        }
        if let Some(found) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SymbolError::InvalidCharacter {
                symbol: symbol.to_string(),
                found,
            });
        }
        Ok(Self(symbol.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum SeriesKeyError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Timeframe(#[from] TimeframeError),
}

/// `(symbol, timeframe)` pair naming one stored series.
///
/// Displays as `{symbol}_{timeframe}`, e.g. `BTCUSDT_15m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
}

impl SeriesKey {
    pub fn new(symbol: Symbol, timeframe: Timeframe) -> Self {
        Self { symbol, timeframe }
    }

    /// Builds a key from raw strings, validating both parts.
    pub fn parse(symbol: &str, timeframe: &str) -> Result<Self, SeriesKeyError> {
        Ok(Self {
            symbol: Symbol::new(symbol)?,
            timeframe: timeframe.parse()?,
        })
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.symbol, self.timeframe)
    }
}
