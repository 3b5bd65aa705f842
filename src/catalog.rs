use crate::error::{BudgetError, Result};
use crate::ingestion::{canonical_header, RawRow};
use crate::schema::{BudgetRecord, EntryType, Section};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryEntry {
    pub name: String,
    pub entry_type: EntryType,
    pub section: Section,
}

/// The known categories with their Income/Expense type and 50/30/20
/// section. Acts as the source of truth when classifying records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCatalog {
    pub entries: Vec<CategoryEntry>,
}

impl CategoryCatalog {
    /// The built-in starter catalog for a personal household budget.
    pub fn standard() -> Self {
        let seed: [(&str, EntryType, Section); 16] = [
            ("Salary", EntryType::Income, Section::Savings),
            ("Other Income", EntryType::Income, Section::Savings),
            ("Rent", EntryType::Expense, Section::Needs),
            ("Insurance", EntryType::Expense, Section::Needs),
            ("Phone", EntryType::Expense, Section::Needs),
            ("Debts", EntryType::Expense, Section::Needs),
            (
                "Phone Subs (ChatGPT, Google Cloud, Apple Music, Extra)",
                EntryType::Expense,
                Section::Wants,
            ),
            ("Clothing", EntryType::Expense, Section::Wants),
            ("Restaurant & Food Delivery", EntryType::Expense, Section::Wants),
            ("Bet", EntryType::Expense, Section::Wants),
            ("Trade", EntryType::Expense, Section::Wants),
            ("Groceries", EntryType::Expense, Section::Needs),
            ("Transport", EntryType::Expense, Section::Needs),
            ("Utilities", EntryType::Expense, Section::Needs),
            ("Entertainment", EntryType::Expense, Section::Wants),
            ("Miscellaneous", EntryType::Expense, Section::Wants),
        ];

        Self {
            entries: seed
                .into_iter()
                .map(|(name, entry_type, section)| CategoryEntry {
                    name: name.to_string(),
                    entry_type,
                    section,
                })
                .collect(),
        }
    }

    /// Builds a catalog from raw rows with Category, Type and Section
    /// columns, keeping the row order. All three columns are required.
    pub fn from_rows(rows: &[RawRow]) -> Result<Self> {
        let first = match rows.first() {
            Some(row) => row,
            None => return Ok(Self { entries: Vec::new() }),
        };

        let mut columns: BTreeMap<&'static str, String> = BTreeMap::new();
        for header in first.keys() {
            if let Some(key) = canonical_header(header) {
                columns.entry(key).or_insert_with(|| header.clone());
            }
        }
        let mut require = |column: &'static str| -> Result<String> {
            columns.remove(column).ok_or(BudgetError::MissingColumn {
                column: column.to_string(),
            })
        };
        let name_col = require("Category")?;
        let type_col = require("Type")?;
        let section_col = require("Section")?;

        let mut entries = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let index = i + 1;
            let name = row.get(&name_col).map(|v| v.trim()).unwrap_or("");
            if name.is_empty() {
                return Err(BudgetError::MissingField {
                    row: index,
                    column: "Category".to_string(),
                });
            }

            let raw_type = row.get(&type_col).map(|v| v.trim()).unwrap_or("");
            let entry_type = EntryType::parse(raw_type).ok_or_else(|| BudgetError::InvalidType {
                row: index,
                value: raw_type.to_string(),
            })?;

            let raw_section = row.get(&section_col).map(|v| v.trim()).unwrap_or("");
            let section = Section::parse(raw_section).ok_or_else(|| BudgetError::InvalidSection {
                row: index,
                value: raw_section.to_string(),
            })?;

            entries.push(CategoryEntry {
                name: name.to_string(),
                entry_type,
                section,
            });
        }

        Ok(Self { entries })
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let raw = result?;
            let row: RawRow = headers
                .iter()
                .zip(raw.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect();
            rows.push(row);
        }

        Self::from_rows(&rows)
    }

    pub fn section_for(&self, category: &str) -> Option<Section> {
        self.entries
            .iter()
            .find(|e| e.name == category)
            .map(|e| e.section.clone())
    }

    pub fn entry_type_for(&self, category: &str) -> Option<EntryType> {
        self.entries
            .iter()
            .find(|e| e.name == category)
            .map(|e| e.entry_type.clone())
    }

    /// Stamps the catalog section onto every record whose category is
    /// known. The catalog wins over a section already on the record; rows
    /// with unknown categories keep whatever they carried.
    pub fn apply_sections(&self, records: &mut [BudgetRecord]) {
        for record in records.iter_mut() {
            if let Some(section) = self.section_for(&record.category) {
                record.section = Some(section);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Category,Type,Section\n");

        for entry in &self.entries {
            output.push_str(&format!(
                "{},{},{}\n",
                csv_field(&entry.name),
                entry.entry_type,
                entry.section
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Category Catalog\n\n");

        output.push_str("## Income\n\n");
        for entry in self.entries.iter().filter(|e| e.entry_type == EntryType::Income) {
            output.push_str(&format!("- {} ({})\n", entry.name, entry.section));
        }
        output.push('\n');

        output.push_str("## Expenses\n\n");
        for entry in self.entries.iter().filter(|e| e.entry_type == EntryType::Expense) {
            output.push_str(&format!("- {} ({})\n", entry.name, entry.section));
        }
        output.push('\n');

        output
    }
}

pub(crate) fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
