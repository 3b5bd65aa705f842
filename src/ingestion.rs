use crate::calendar::MonthKey;
use crate::error::{BudgetError, Result};
use crate::schema::{BudgetRecord, EntryType, LoadOptions, Section};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A raw tabular row keyed by its original header names, before any
/// validation. This is the interchange type for non-CSV frontends.
pub type RawRow = BTreeMap<String, String>;

/// Original header names behind each canonical column, as found by
/// [`resolve_columns`].
#[derive(Debug, Clone)]
struct Columns {
    category: String,
    entry_type: String,
    budget: String,
    actual: String,
    month: Option<String>,
    date: Option<String>,
    section: Option<String>,
}

/// Canonical name behind a raw header, ignoring letter case and any trailing
/// parenthesized unit: "Budget (€)", "budget" and "Budget (EUR)" all resolve
/// to Budget.
pub(crate) fn canonical_header(header: &str) -> Option<&'static str> {
    let base = match header.find('(') {
        Some(idx) => &header[..idx],
        None => header,
    };
    match base.trim().to_lowercase().as_str() {
        "category" => Some("Category"),
        "type" => Some("Type"),
        "budget" => Some("Budget"),
        "actual" => Some("Actual"),
        "month" => Some("Month"),
        "date" => Some("Date"),
        "section" => Some("Section"),
        _ => None,
    }
}

/// Maps raw headers to the canonical columns. The first matching header
/// wins. Category, Type, Budget and Actual are required; Month, Date and
/// Section are optional.
fn resolve_columns<'a, I>(headers: I) -> Result<Columns>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut found: BTreeMap<&'static str, String> = BTreeMap::new();

    for header in headers {
        let key = match canonical_header(header) {
            Some(key) => key,
            None => continue,
        };
        found.entry(key).or_insert_with(|| header.to_string());
    }

    let mut require = |column: &'static str| -> Result<String> {
        found.remove(column).ok_or(BudgetError::MissingColumn {
            column: column.to_string(),
        })
    };

    Ok(Columns {
        category: require("Category")?,
        entry_type: require("Type")?,
        budget: require("Budget")?,
        actual: require("Actual")?,
        month: found.remove("Month"),
        date: found.remove("Date"),
        section: found.remove("Section"),
    })
}

/// Parses an amount cell. The configured currency symbol may lead or trail
/// the number ("€ 450", "450 €", "450€"). An empty cell counts as zero.
/// Anything else must parse to a finite decimal.
fn parse_amount(row: usize, column: &'static str, value: &str, options: &LoadOptions) -> Result<f64> {
    let mut cell = value.trim();
    if cell.is_empty() {
        return Ok(0.0);
    }

    let symbol = options.currency_symbol.as_str();
    if !symbol.is_empty() {
        if let Some(stripped) = cell.strip_prefix(symbol) {
            cell = stripped.trim();
        } else if let Some(stripped) = cell.strip_suffix(symbol) {
            cell = stripped.trim();
        }
    }

    let amount: f64 = cell.parse().map_err(|_| BudgetError::InvalidAmount {
        row,
        column: column.to_string(),
        value: value.trim().to_string(),
    })?;

    if !amount.is_finite() {
        return Err(BudgetError::InvalidAmount {
            row,
            column: column.to_string(),
            value: value.trim().to_string(),
        });
    }

    Ok(amount)
}

fn cell<'a>(row: &'a RawRow, column: &Option<String>) -> &'a str {
    column
        .as_ref()
        .and_then(|name| row.get(name))
        .map(|v| v.trim())
        .unwrap_or("")
}

fn parse_row(index: usize, row: &RawRow, columns: &Columns, options: &LoadOptions) -> Result<BudgetRecord> {
    let category = row
        .get(&columns.category)
        .map(|v| v.trim())
        .unwrap_or("");
    if category.is_empty() {
        return Err(BudgetError::MissingField {
            row: index,
            column: "Category".to_string(),
        });
    }

    let raw_type = row
        .get(&columns.entry_type)
        .map(|v| v.trim())
        .unwrap_or("");
    if raw_type.is_empty() {
        return Err(BudgetError::MissingField {
            row: index,
            column: "Type".to_string(),
        });
    }
    let entry_type = EntryType::parse(raw_type).ok_or_else(|| BudgetError::InvalidType {
        row: index,
        value: raw_type.to_string(),
    })?;

    let budget_amount = parse_amount(
        index,
        "Budget",
        row.get(&columns.budget).map(String::as_str).unwrap_or(""),
        options,
    )?;
    let actual_amount = parse_amount(
        index,
        "Actual",
        row.get(&columns.actual).map(String::as_str).unwrap_or(""),
        options,
    )?;

    let raw_month = cell(row, &columns.month);
    let month = if raw_month.is_empty() {
        None
    } else {
        Some(
            MonthKey::parse(raw_month).map_err(|_| BudgetError::InvalidDateFormat {
                row: index,
                column: "Month".to_string(),
                value: raw_month.to_string(),
                expected: "YYYY-MM",
            })?,
        )
    };

    let raw_date = cell(row, &columns.date);
    let date = if raw_date.is_empty() {
        None
    } else {
        Some(
            NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
                BudgetError::InvalidDateFormat {
                    row: index,
                    column: "Date".to_string(),
                    value: raw_date.to_string(),
                    expected: "YYYY-MM-DD",
                }
            })?,
        )
    };

    if let (Some(m), Some(d)) = (month, date) {
        if !m.contains(d) {
            return Err(BudgetError::DateMonthMismatch {
                row: index,
                date: d.to_string(),
                date_month: MonthKey::from_date(d).to_string(),
                month: m.to_string(),
            });
        }
    }

    let raw_section = cell(row, &columns.section);
    let section = if raw_section.is_empty() {
        None
    } else {
        Some(
            Section::parse(raw_section).ok_or_else(|| BudgetError::InvalidSection {
                row: index,
                value: raw_section.to_string(),
            })?,
        )
    };

    Ok(BudgetRecord {
        category: category.to_string(),
        entry_type,
        budget_amount,
        actual_amount,
        month,
        date,
        section,
    })
}

/// Validates already-parsed rows into typed records.
///
/// Stops at the first invalid row; row numbers in errors are 1-based over
/// the data rows. Column resolution uses the first row's keys, so an empty
/// slice loads as an empty record set.
pub fn load_records(rows: &[RawRow], options: &LoadOptions) -> Result<Vec<BudgetRecord>> {
    let first = match rows.first() {
        Some(row) => row,
        None => return Ok(Vec::new()),
    };
    let columns = resolve_columns(first.keys().map(String::as_str))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_row(i + 1, row, &columns, options))
        .collect()
}

/// Reads and validates CSV data from any reader.
///
/// The header row is resolved first, so a file with data rows but a missing
/// required column fails before any row is parsed. Blank input loads as an
/// empty record set.
pub fn read_records<R: Read>(reader: R, options: &LoadOptions) -> Result<Vec<BudgetRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(Vec::new());
    }
    let columns = resolve_columns(headers.iter())?;

    let mut records = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let raw = result?;
        let row: RawRow = headers
            .iter()
            .zip(raw.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        records.push(parse_row(i + 1, &row, &columns, options)?);
    }

    Ok(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Vec<BudgetRecord>> {
    let file = File::open(path)?;
    read_records(file, options)
}
