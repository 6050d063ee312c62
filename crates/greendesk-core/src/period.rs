//! Calendar periods: months, quarters, and the "today" reference used for
//! past-period checks.
//!
//! Month is the source of truth. A quarter is always derived from a month and
//! is never stored on its own.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::CoreError;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A calendar month, 1 (January) through 12 (December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    pub fn new(n: u8) -> Result<Self, CoreError> {
        if (1..=12).contains(&n) {
            Ok(Self(n))
        } else {
            Err(CoreError::InvalidMonth(n as i64))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn quarter(self) -> Quarter {
        Quarter::of(self)
    }

    pub fn abbr(self) -> &'static str {
        MONTH_ABBR[(self.0 - 1) as usize]
    }

    /// All twelve months in order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }
}

impl TryFrom<u8> for Month {
    type Error = CoreError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Month::new(n)
    }
}

impl From<Month> for u8 {
    fn from(m: Month) -> u8 {
        m.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

impl FromStr for Month {
    type Err = CoreError;

    /// Accepts a number (`"3"`), a three-letter abbreviation (`"mar"`), or
    /// the full English name (`"March"`). Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return u8::try_from(n)
                .map_err(|_| CoreError::InvalidMonth(n))
                .and_then(Month::new);
        }
        let lower = s.to_ascii_lowercase();
        MONTH_ABBR
            .iter()
            .zip(MONTH_NAMES)
            .position(|(abbr, name)| lower.eq_ignore_ascii_case(abbr) || lower == name)
            .map(|i| Month(i as u8 + 1))
            .ok_or_else(|| CoreError::UnknownMonth(s.to_string()))
    }
}

/// A quarter of the year. Q1 = Jan-Mar, Q2 = Apr-Jun, Q3 = Jul-Sep, Q4 = Oct-Dec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quarter {
    Q1 = 1,
    Q2 = 2,
    Q3 = 3,
    Q4 = 4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// `ceil(month / 3)`.
    pub fn of(month: Month) -> Quarter {
        match (month.number() + 2) / 3 {
            1 => Quarter::Q1,
            2 => Quarter::Q2,
            3 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn first_month(self) -> Month {
        Month(self.number() * 3 - 2)
    }

    pub fn last_month(self) -> Month {
        Month(self.number() * 3)
    }

    pub fn months(self) -> [Month; 3] {
        let first = self.number() * 3 - 2;
        [Month(first), Month(first + 1), Month(first + 2)]
    }

    pub fn contains(self, month: Month) -> bool {
        Quarter::of(month) == self
    }

    pub fn label(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1 (Jan-Mar)",
            Quarter::Q2 => "Q2 (Apr-Jun)",
            Quarter::Q3 => "Q3 (Jul-Sep)",
            Quarter::Q4 => "Q4 (Oct-Dec)",
        }
    }
}

impl TryFrom<u8> for Quarter {
    type Error = CoreError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Quarter::Q1),
            2 => Ok(Quarter::Q2),
            3 => Ok(Quarter::Q3),
            4 => Ok(Quarter::Q4),
            other => Err(CoreError::InvalidQuarter(other as i64)),
        }
    }
}

impl From<Quarter> for u8 {
    fn from(q: Quarter) -> u8 {
        q.number()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl FromStr for Quarter {
    type Err = CoreError;

    /// Accepts `"2"` or `"Q2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix(['Q', 'q']).unwrap_or(s);
        let n: i64 = digits
            .parse()
            .map_err(|_| CoreError::InvalidQuarter(0))?;
        u8::try_from(n)
            .map_err(|_| CoreError::InvalidQuarter(n))
            .and_then(Quarter::try_from)
    }
}

/// The current point in time at month resolution.
///
/// Past-ness is always evaluated against an explicit `YearMonth` so that
/// classification stays a pure function; only the binary reads the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

impl YearMonth {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        // chrono months are always 1..=12
        Self {
            year: date.year(),
            month: Month(date.month() as u8),
        }
    }

    /// Local wall-clock month.
    pub fn now() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// A month of `year` is past when it precedes this month.
    pub fn is_month_past(self, year: i32, month: Month) -> bool {
        year < self.year || (year == self.year && month < self.month)
    }

    /// A quarter of `year` is past when its last month precedes this month.
    pub fn is_quarter_past(self, year: i32, quarter: Quarter) -> bool {
        self.is_month_past(year, quarter.last_month())
    }
}

/// Granularity for billing and report views. Sent as the `viewMode` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Monthly,
    Quarterly,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Monthly => "monthly",
            ViewMode::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(ViewMode::Monthly),
            "quarterly" | "quarter" => Ok(ViewMode::Quarterly),
            _ => Err(CoreError::UnknownViewMode(s.to_string())),
        }
    }
}
