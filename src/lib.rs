//! # Budget Evaluator
//!
//! A library for evaluating personal budget plans against actual spending:
//! load tabular records, grade every category against its plan, and track
//! savings, spending pace and no-spend days month by month.
//!
//! ## Core Concepts
//!
//! - **Records**: typed rows with a category, Income/Expense type, planned and actual
//!   amounts, and optionally a month, a transaction date and a 50/30/20 section
//! - **Summaries**: per-category totals with variance (actual minus budget) and a
//!   guardrail grading of `Ok`, `Warning` or `Breach`
//! - **Guardrails**: variance thresholds per category plus in-month rules for overall
//!   pace, hard caps and loss limits
//! - **No-Spend Tracking**: calendar days in a range without any recorded expense
//!
//! ## Example
//!
//! ```rust,ignore
//! use budget_evaluator::*;
//!
//! let data = "\
//! Month,Category,Type,Budget (€),Actual (€)
//! 2024-03,Groceries,Expense,450,470.50
//! 2024-03,Salary,Income,2600,2600
//! ";
//!
//! let evaluator = BudgetEvaluator::default().with_catalog(CategoryCatalog::standard());
//! let records = evaluator.load_csv(data.as_bytes()).unwrap();
//!
//! let report = evaluator.monthly_report(&records, "2024-03".parse().unwrap(), None);
//! println!("{}", report.to_markdown());
//! ```

pub mod analytics;
pub mod calendar;
pub mod catalog;
pub mod error;
pub mod guardrails;
pub mod ingestion;
pub mod recommendations;
pub mod report;
pub mod schema;
pub mod summary;

pub use analytics::{
    monthly_totals, rolling_actuals, section_breakdown, spending_pace, MonthlyTotals, RollingPoint,
    SectionBreakdown, SpendingPace,
};
pub use calendar::{no_spend_days, MonthKey, NoSpendReport};
pub use catalog::{CategoryCatalog, CategoryEntry};
pub use error::{BudgetError, Result};
pub use guardrails::{
    evaluate_alerts, GuardrailAlert, GuardrailStatus, GuardrailThresholds, SpendingLimits,
};
pub use ingestion::*;
pub use recommendations::build_recommendations;
pub use report::MonthlyReport;
pub use schema::*;
pub use summary::{summarize, CategorySummary, GroupBy};

use chrono::NaiveDate;
use log::{debug, info};
use std::io::Read;
use std::path::Path;

/// Entry point that ties configuration, catalog and the evaluation steps
/// together. Construct once, then load and evaluate as needed.
pub struct BudgetEvaluator {
    config: EvaluatorConfig,
    catalog: Option<CategoryCatalog>,
}

impl BudgetEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    /// Attaches a category catalog. Loaded records then get their sections
    /// stamped from it, with the catalog winning over row-level sections.
    pub fn with_catalog(mut self, catalog: CategoryCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn load_csv<R: Read>(&self, reader: R) -> Result<Vec<BudgetRecord>> {
        let records = ingestion::read_records(reader, &self.config.load)?;
        Ok(self.classify(records))
    }

    pub fn load_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<BudgetRecord>> {
        info!("Loading budget records from {}", path.as_ref().display());
        let records = ingestion::read_records_from_path(path, &self.config.load)?;
        Ok(self.classify(records))
    }

    pub fn load_rows(&self, rows: &[RawRow]) -> Result<Vec<BudgetRecord>> {
        let records = ingestion::load_records(rows, &self.config.load)?;
        Ok(self.classify(records))
    }

    fn classify(&self, mut records: Vec<BudgetRecord>) -> Vec<BudgetRecord> {
        info!("Loaded {} budget records", records.len());
        if let Some(catalog) = &self.catalog {
            catalog.apply_sections(&mut records);
            debug!(
                "Stamped sections from a catalog of {} categories",
                catalog.len()
            );
        }
        records
    }

    /// Per-category summaries grouped by month, graded against the
    /// configured thresholds.
    pub fn summarize(&self, records: &[BudgetRecord]) -> Vec<CategorySummary> {
        summary::summarize(records, &GroupBy::default(), &self.config.thresholds)
    }

    pub fn summarize_with(&self, records: &[BudgetRecord], group_by: &GroupBy) -> Vec<CategorySummary> {
        summary::summarize(records, group_by, &self.config.thresholds)
    }

    /// In-month alert scan against the configured spending limits.
    pub fn alerts(
        &self,
        records: &[BudgetRecord],
        month: MonthKey,
        as_of: Option<NaiveDate>,
    ) -> Vec<GuardrailAlert> {
        guardrails::evaluate_alerts(records, month, &self.config.limits, as_of)
    }

    /// No-spend days over an explicit calendar range.
    pub fn no_spend(
        &self,
        records: &[BudgetRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> NoSpendReport {
        calendar::no_spend_days(records, start, end)
    }

    pub fn monthly_report(
        &self,
        records: &[BudgetRecord],
        month: MonthKey,
        as_of: Option<NaiveDate>,
    ) -> MonthlyReport {
        info!("Building budget report for {}", month);
        MonthlyReport::build(records, month, as_of, &self.config)
    }
}

impl Default for BudgetEvaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}

/// Loads CSV data and builds one month's report with default configuration
/// and the standard catalog.
pub fn evaluate_csv<R: Read>(reader: R, month: MonthKey) -> Result<MonthlyReport> {
    let evaluator = BudgetEvaluator::default().with_catalog(CategoryCatalog::standard());
    let records = evaluator.load_csv(reader)?;
    Ok(evaluator.monthly_report(&records, month, None))
}
