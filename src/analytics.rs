use crate::calendar::MonthKey;
use crate::schema::{BudgetRecord, EntryType, Section};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Actual money in, out and kept for one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MonthlyTotals {
    pub month: MonthKey,
    pub income: f64,
    pub expense: f64,

    #[schemars(description = "Income minus expenses")]
    pub savings: f64,

    #[schemars(description = "Savings as a percentage of income, zero when there is no income")]
    pub savings_rate: f64,
}

/// 50/30/20 view of one month's actuals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SectionBreakdown {
    pub month: MonthKey,
    pub income: f64,
    pub needs: f64,
    pub wants: f64,

    #[schemars(description = "Expense actuals with no section, kept out of the implied savings")]
    pub unclassified: f64,

    #[schemars(
        description = "Income left after needs, wants and unclassified spending, floored at zero. Expense rows classified as Savings are transfers and count here implicitly."
    )]
    pub savings: f64,
}

/// Where in-month spending stands against a time-proportional plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SpendingPace {
    pub month: MonthKey,
    pub monthly_budget: f64,
    pub spent_to_date: f64,

    #[schemars(description = "The share of the monthly budget proportional to the elapsed days")]
    pub expected_to_date: f64,

    pub days_elapsed: u32,
    pub days_in_month: u32,
}

/// One month of a category's actuals with its trailing mean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RollingPoint {
    pub month: MonthKey,
    pub actual: f64,

    #[schemars(description = "Mean of up to `window` trailing months, the current one included")]
    pub rolling_mean: f64,
}

/// Sums actual income and expenses per month, in chronological order.
/// Records without a month are skipped.
pub fn monthly_totals(records: &[BudgetRecord]) -> Vec<MonthlyTotals> {
    let mut months: BTreeMap<MonthKey, (f64, f64)> = BTreeMap::new();

    for record in records {
        let month = match record.month {
            Some(m) => m,
            None => continue,
        };
        let entry = months.entry(month).or_insert((0.0, 0.0));
        match record.entry_type {
            EntryType::Income => entry.0 += record.actual_amount,
            EntryType::Expense => entry.1 += record.actual_amount,
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| {
            let savings = income - expense;
            let savings_rate = if income > 0.0 {
                savings / income * 100.0
            } else {
                0.0
            };
            MonthlyTotals {
                month,
                income,
                expense,
                savings,
                savings_rate,
            }
        })
        .collect()
}

/// Splits one month's expense actuals into the 50/30/20 buckets.
///
/// Expense rows classified as Savings are transfers, so they reduce none of
/// the buckets and show up in the implied savings instead.
pub fn section_breakdown(records: &[BudgetRecord], month: MonthKey) -> SectionBreakdown {
    let mut income = 0.0;
    let mut needs = 0.0;
    let mut wants = 0.0;
    let mut unclassified = 0.0;

    for record in records.iter().filter(|r| r.month == Some(month)) {
        match record.entry_type {
            EntryType::Income => income += record.actual_amount,
            EntryType::Expense => match record.section {
                Some(Section::Needs) => needs += record.actual_amount,
                Some(Section::Wants) => wants += record.actual_amount,
                Some(Section::Savings) => {}
                None => unclassified += record.actual_amount,
            },
        }
    }

    let savings = (income - needs - wants - unclassified).max(0.0);

    SectionBreakdown {
        month,
        income,
        needs,
        wants,
        unclassified,
        savings,
    }
}

/// Compares spending so far against the elapsed share of the monthly budget.
///
/// The budget covers the whole month. Spending counts dated expense rows up
/// to `as_of` plus all undated expense rows of the month; with `None` the
/// month is treated as fully elapsed.
pub fn spending_pace(records: &[BudgetRecord], month: MonthKey, as_of: Option<NaiveDate>) -> SpendingPace {
    let expenses: Vec<&BudgetRecord> = records
        .iter()
        .filter(|r| r.month == Some(month) && r.entry_type == EntryType::Expense)
        .collect();

    let monthly_budget: f64 = expenses.iter().map(|r| r.budget_amount).sum();
    let spent_to_date: f64 = expenses
        .iter()
        .filter(|r| r.counts_through(as_of))
        .map(|r| r.actual_amount)
        .sum();

    let days_in_month = month.days_in_month();
    let days_elapsed = month.elapsed_day(as_of);
    let expected_to_date = monthly_budget * f64::from(days_elapsed) / f64::from(days_in_month);

    SpendingPace {
        month,
        monthly_budget,
        spent_to_date,
        expected_to_date,
        days_elapsed,
        days_in_month,
    }
}

/// Trailing mean of a category's monthly expense actuals.
///
/// The window slides over the months that actually carry data for the
/// category; calendar gaps are not zero-filled. A window below one is
/// treated as one.
pub fn rolling_actuals(records: &[BudgetRecord], category: &str, window: usize) -> Vec<RollingPoint> {
    let window = window.max(1);

    let mut months: BTreeMap<MonthKey, f64> = BTreeMap::new();
    for record in records {
        if record.entry_type != EntryType::Expense || record.category != category {
            continue;
        }
        if let Some(month) = record.month {
            *months.entry(month).or_insert(0.0) += record.actual_amount;
        }
    }

    let series: Vec<(MonthKey, f64)> = months.into_iter().collect();
    series
        .iter()
        .enumerate()
        .map(|(i, &(month, actual))| {
            let from = (i + 1).saturating_sub(window);
            let tail = &series[from..=i];
            let rolling_mean = tail.iter().map(|(_, v)| v).sum::<f64>() / tail.len() as f64;
            RollingPoint {
                month,
                actual,
                rolling_mean,
            }
        })
        .collect()
}
