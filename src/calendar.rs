use crate::error::{BudgetError, Result};
use crate::schema::{BudgetRecord, EntryType};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A calendar year-month, the grouping key for monthly views.
///
/// Parses strictly from `YYYY-MM` (zero-padded, month 01-12) and serializes
/// back to the same string. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(BudgetError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Parses a strict `YYYY-MM` string, e.g. "2024-03".
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.len() != 7 {
            return Err(BudgetError::InvalidMonth(value.to_string()));
        }
        let first = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
            .map_err(|_| BudgetError::InvalidMonth(value.to_string()))?;
        Ok(Self {
            year: first.year(),
            month: first.month(),
        })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month validated on construction")
    }

    pub fn last_day(&self) -> NaiveDate {
        last_day_of_month(self.year, self.month)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// How many days of this month have elapsed at `as_of`: 0 before the
    /// month starts, the full month after it ends or when `as_of` is absent.
    pub fn elapsed_day(&self, as_of: Option<NaiveDate>) -> u32 {
        match as_of {
            None => self.days_in_month(),
            Some(d) if d < self.first_day() => 0,
            Some(d) if d > self.last_day() => self.days_in_month(),
            Some(d) => d.day(),
        }
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = BudgetError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

impl schemars::JsonSchema for MonthKey {
    fn schema_name() -> String {
        "MonthKey".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut schema: schemars::schema::SchemaObject = String::json_schema(gen).into();
        schema.format = Some("year-month".to_string());
        schema.into()
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

/// Calendar days in an inclusive range that carry no recorded Expense activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NoSpendReport {
    /// No-spend days in ascending order.
    pub days: Vec<NaiveDate>,
    pub count: usize,
    /// Longest run of consecutive no-spend days within the range.
    pub longest_streak: usize,
}

/// Scans the inclusive calendar range `start..=end` and reports every day
/// without a recorded Expense transaction.
///
/// A dated Expense record marks its day as spend activity regardless of
/// amount; Income records and undated Expense records never mark days.
/// An empty range (`end < start`) yields an empty report.
pub fn no_spend_days(records: &[BudgetRecord], start: NaiveDate, end: NaiveDate) -> NoSpendReport {
    let spend_days: HashSet<NaiveDate> = records
        .iter()
        .filter(|r| r.entry_type == EntryType::Expense)
        .filter_map(|r| r.date)
        .collect();

    let mut days = Vec::new();
    let mut longest_streak = 0usize;
    let mut current_streak = 0usize;

    let mut day = start;
    while day <= end {
        if spend_days.contains(&day) {
            current_streak = 0;
        } else {
            days.push(day);
            current_streak += 1;
            longest_streak = longest_streak.max(current_streak);
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    NoSpendReport {
        count: days.len(),
        days,
        longest_streak,
    }
}
