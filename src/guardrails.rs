use crate::calendar::MonthKey;
use crate::schema::{BudgetRecord, EntryType};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered outcome of checking a category against its thresholds.
/// `Ok < Warning < Breach`, so the worst status of a set is its maximum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum GuardrailStatus {
    #[schemars(description = "Spending is within plan, or the line is not graded (Income, or no budget set)")]
    Ok,

    #[schemars(description = "Spending is near the budget: the variance ratio is above the warning threshold")]
    Warning,

    #[schemars(description = "Spending went over budget: the variance ratio is above the breach threshold")]
    Breach,
}

impl std::fmt::Display for GuardrailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "Ok"),
            Self::Warning => write!(f, "Warning"),
            Self::Breach => write!(f, "Breach"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct GuardrailThresholds {
    #[schemars(
        description = "Variance ratio (actual / budget) above which an expense category is graded Warning. Defaults to 0.9."
    )]
    pub warning_ratio: f64,

    #[schemars(
        description = "Variance ratio (actual / budget) above which an expense category is graded Breach. Defaults to 1.0."
    )]
    pub breach_ratio: f64,
}

impl Default for GuardrailThresholds {
    fn default() -> Self {
        Self {
            warning_ratio: 0.9,
            breach_ratio: 1.0,
        }
    }
}

impl GuardrailThresholds {
    /// Grades a variance ratio. Comparisons are strict, so a ratio exactly at
    /// a threshold stays below it: 0.9 is `Ok`, 1.0 is `Warning`.
    ///
    /// A missing ratio (no budget to compare against) is always `Ok`.
    pub fn status_for(&self, variance_ratio: Option<f64>) -> GuardrailStatus {
        match variance_ratio {
            Some(ratio) if ratio > self.breach_ratio => GuardrailStatus::Breach,
            Some(ratio) if ratio > self.warning_ratio => GuardrailStatus::Warning,
            _ => GuardrailStatus::Ok,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SpendingLimits {
    #[serde(default = "default_pace_ratio")]
    #[schemars(
        description = "Fraction of the monthly expense budget that may be spent before the cutoff day without raising a pace alert. Defaults to 0.8."
    )]
    pub overall_pace_ratio: f64,

    #[serde(default = "default_pace_cutoff_day")]
    #[schemars(
        description = "Day of month before which the pace rule applies. Once this day is reached the rule goes quiet. Defaults to 20."
    )]
    pub overall_pace_cutoff_day: u32,

    #[serde(default)]
    #[schemars(
        description = "Per-category spending ceilings in account currency. A cap of zero or below disables the entry."
    )]
    pub hard_caps: BTreeMap<String, f64>,

    #[serde(default)]
    #[schemars(
        description = "Per-category loss limits for high-risk lines such as 'Trade' or 'Bet'. Exceeding one is graded Breach. Zero disables the entry."
    )]
    pub loss_limits: BTreeMap<String, f64>,
}

fn default_pace_ratio() -> f64 {
    0.8
}

fn default_pace_cutoff_day() -> u32 {
    20
}

impl Default for SpendingLimits {
    fn default() -> Self {
        Self {
            overall_pace_ratio: default_pace_ratio(),
            overall_pace_cutoff_day: default_pace_cutoff_day(),
            hard_caps: BTreeMap::new(),
            loss_limits: BTreeMap::new(),
        }
    }
}

/// A single in-month limit violation found by [`evaluate_alerts`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardrailAlert {
    #[schemars(description = "Spending crossed the pace threshold early in the month")]
    OverallPace {
        budget: f64,
        spent: f64,
        /// Day of month the scan was anchored to.
        day: u32,
    },

    #[schemars(description = "A category spent past its configured hard cap")]
    HardCapExceeded { category: String, cap: f64, spent: f64 },

    #[schemars(description = "A high-risk category lost more than its configured limit")]
    LossLimitExceeded { category: String, limit: f64, spent: f64 },
}

impl GuardrailAlert {
    pub fn severity(&self) -> GuardrailStatus {
        match self {
            Self::OverallPace { .. } | Self::HardCapExceeded { .. } => GuardrailStatus::Warning,
            Self::LossLimitExceeded { .. } => GuardrailStatus::Breach,
        }
    }
}

impl std::fmt::Display for GuardrailAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverallPace { budget, spent, day } => write!(
                f,
                "Overall spending has reached {:.0}% of the monthly budget by day {}. Slow down now.",
                spent / budget * 100.0,
                day
            ),
            Self::HardCapExceeded { category, cap, .. } => write!(
                f,
                "Category '{}' exceeded its hard cap of {:.0}€. Consider a spending freeze.",
                category, cap
            ),
            Self::LossLimitExceeded { category, limit, .. } => write!(
                f,
                "{}: Loss limit of {:.0}€ exceeded. Pause activity.",
                category, limit
            ),
        }
    }
}

/// Scans one month of records against the configured spending limits.
///
/// `as_of` anchors the scan to a day: dated expense rows after it are
/// ignored and the pace rule compares against that day of the month.
/// With `None` the whole month counts and the pace rule cannot fire.
/// Undated rows always count as in-month spending.
///
/// Alert order is deterministic: pace first, then hard caps and loss
/// limits in category order.
pub fn evaluate_alerts(
    records: &[BudgetRecord],
    month: MonthKey,
    limits: &SpendingLimits,
    as_of: Option<NaiveDate>,
) -> Vec<GuardrailAlert> {
    let expenses: Vec<&BudgetRecord> = records
        .iter()
        .filter(|r| r.month == Some(month) && r.entry_type == EntryType::Expense)
        .collect();

    // The plan covers the whole month; only spending respects the cutoff.
    let budget_total: f64 = expenses.iter().map(|r| r.budget_amount).sum();
    let spent_total: f64 = expenses
        .iter()
        .filter(|r| r.counts_through(as_of))
        .map(|r| r.actual_amount)
        .sum();

    let day_in_month = month.elapsed_day(as_of);

    let mut alerts = Vec::new();

    if budget_total > 0.0
        && day_in_month < limits.overall_pace_cutoff_day
        && spent_total > limits.overall_pace_ratio * budget_total
    {
        alerts.push(GuardrailAlert::OverallPace {
            budget: budget_total,
            spent: spent_total,
            day: day_in_month,
        });
    }

    for (category, cap) in &limits.hard_caps {
        if *cap <= 0.0 {
            continue;
        }
        let spent: f64 = expenses
            .iter()
            .filter(|r| &r.category == category && r.counts_through(as_of))
            .map(|r| r.actual_amount)
            .sum();
        if spent > *cap {
            alerts.push(GuardrailAlert::HardCapExceeded {
                category: category.clone(),
                cap: *cap,
                spent,
            });
        }
    }

    for (category, limit) in &limits.loss_limits {
        if *limit <= 0.0 {
            continue;
        }
        let spent: f64 = expenses
            .iter()
            .filter(|r| &r.category == category && r.counts_through(as_of))
            .map(|r| r.actual_amount)
            .sum();
        if spent > *limit {
            alerts.push(GuardrailAlert::LossLimitExceeded {
                category: category.clone(),
                limit: *limit,
                spent,
            });
        }
    }

    alerts
}
