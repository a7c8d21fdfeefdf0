//! Candle intervals supported by the downloader.
//!
//! A [`Timeframe`] pairs an amount with a [`TimeframeUnit`]. Only the
//! combinations exchanges publish klines for are constructible, so every
//! value can be used verbatim as an API `interval` parameter and as part of
//! a storage file name.
//!
//! ```
//! use crypto_downloader::models::timeframe::{Timeframe, TimeframeUnit};
//!
//! let tf: Timeframe = "15m".parse().unwrap();
//! assert_eq!(tf, Timeframe::new(15, TimeframeUnit::Minute).unwrap());
//! assert_eq!(tf.to_string(), "15m");
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeframeError {
    #[error("Unsupported amount {amount} for {unit:?}; allowed: {allowed:?}")]
    UnsupportedAmount {
        unit: TimeframeUnit,
        amount: u32,
        allowed: &'static [u32],
    },

    #[error("Invalid timeframe input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeframeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeframeUnit {
    /// Amounts the exchange accepts for this unit.
    pub const fn allowed_amounts(self) -> &'static [u32] {
        match self {
            TimeframeUnit::Minute => &[1, 3, 5, 15, 30],
            TimeframeUnit::Hour => &[1, 2, 4, 6, 8, 12],
            TimeframeUnit::Day => &[1, 3],
            TimeframeUnit::Week => &[1],
            TimeframeUnit::Month => &[1],
        }
    }

    const fn suffix(self) -> char {
        match self {
            TimeframeUnit::Minute => 'm',
            TimeframeUnit::Hour => 'h',
            TimeframeUnit::Day => 'd',
            TimeframeUnit::Week => 'w',
            TimeframeUnit::Month => 'M',
        }
    }

    fn from_suffix(c: char) -> Option<Self> {
        match c {
            'm' => Some(TimeframeUnit::Minute),
            'h' => Some(TimeframeUnit::Hour),
            'd' => Some(TimeframeUnit::Day),
            'w' => Some(TimeframeUnit::Week),
            'M' => Some(TimeframeUnit::Month),
            _ => None,
        }
    }
}

/// A validated candle interval, e.g. 15-Minute or 1-Hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timeframe {
    amount: u32,
    unit: TimeframeUnit,
}

impl Timeframe {
    pub const M1: Timeframe = Timeframe::from_parts(1, TimeframeUnit::Minute);
    pub const M5: Timeframe = Timeframe::from_parts(5, TimeframeUnit::Minute);
    pub const M15: Timeframe = Timeframe::from_parts(15, TimeframeUnit::Minute);
    pub const M30: Timeframe = Timeframe::from_parts(30, TimeframeUnit::Minute);
    pub const H1: Timeframe = Timeframe::from_parts(1, TimeframeUnit::Hour);
    pub const H4: Timeframe = Timeframe::from_parts(4, TimeframeUnit::Hour);
    pub const D1: Timeframe = Timeframe::from_parts(1, TimeframeUnit::Day);
    pub const W1: Timeframe = Timeframe::from_parts(1, TimeframeUnit::Week);

    const fn from_parts(amount: u32, unit: TimeframeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn new(amount: u32, unit: TimeframeUnit) -> Result<Self, TimeframeError> {
        let allowed = unit.allowed_amounts();
        if !allowed.contains(&amount) {
            return Err(TimeframeError::UnsupportedAmount {
                unit,
                amount,
                allowed,
            });
        }
        Ok(Self { amount, unit })
    }

    pub const fn amount(&self) -> u32 {
        self.amount
    }

    pub const fn unit(&self) -> TimeframeUnit {
        self.unit
    }

    /// Label used in storage file names.
    ///
    /// Same as the display form except months, which become `1mo` so that
    /// `1m` and `1M` cannot share a file on case-insensitive filesystems.
    pub fn file_label(&self) -> String {
        match self.unit {
            TimeframeUnit::Month => format!("{}mo", self.amount),
            _ => self.to_string(),
        }
    }

    /// Every supported timeframe, shortest first.
    pub fn all() -> Vec<Timeframe> {
        [
            TimeframeUnit::Minute,
            TimeframeUnit::Hour,
            TimeframeUnit::Day,
            TimeframeUnit::Week,
            TimeframeUnit::Month,
        ]
        .into_iter()
        .flat_map(|unit| {
            unit.allowed_amounts()
                .iter()
                .map(move |&amount| Timeframe::from_parts(amount, unit))
        })
        .collect()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(last) = s.chars().last() else {
            return Err(TimeframeError::InvalidInput {
                message: "empty timeframe".into(),
            });
        };
        let unit = TimeframeUnit::from_suffix(last).ok_or_else(|| TimeframeError::InvalidInput {
            message: format!("unknown unit '{last}' in '{s}'"),
        })?;
        let digits = &s[..s.len() - last.len_utf8()];
        // Plain decimal without sign or leading zero, so only canonical labels parse.
        let canonical = !digits.is_empty()
            && !digits.starts_with('0')
            && digits.bytes().all(|b| b.is_ascii_digit());
        let amount: u32 = digits
            .parse()
            .ok()
            .filter(|_| canonical)
            .ok_or_else(|| TimeframeError::InvalidInput {
                message: format!("invalid amount in '{s}'"),
            })?;
        Timeframe::new(amount, unit)
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
