use crate::analytics::{
    monthly_totals, section_breakdown, spending_pace, MonthlyTotals, SectionBreakdown, SpendingPace,
};
use crate::calendar::{no_spend_days, MonthKey, NoSpendReport};
use crate::catalog::csv_field;
use crate::guardrails::{evaluate_alerts, GuardrailAlert, GuardrailStatus};
use crate::recommendations::build_recommendations;
use crate::schema::{BudgetRecord, EvaluatorConfig, Goals};
use crate::summary::{summarize, CategorySummary, GroupBy};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything the evaluator knows about one month, ready for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MonthlyReport {
    pub month: MonthKey,
    pub totals: MonthlyTotals,
    pub summaries: Vec<CategorySummary>,
    pub breakdown: SectionBreakdown,
    pub pace: SpendingPace,
    pub alerts: Vec<GuardrailAlert>,

    #[schemars(description = "No-spend days from the first of the month through `as_of`, or the whole month")]
    pub no_spend: NoSpendReport,

    #[schemars(description = "The goals the report was graded against")]
    pub goals: Goals,

    pub recommendations: Vec<String>,
}

impl MonthlyReport {
    /// Builds the report for one month out of the full record set.
    ///
    /// `as_of` anchors the pace tracker, the alert scan and the no-spend
    /// range to a day; `None` evaluates the month as fully elapsed.
    pub fn build(
        records: &[BudgetRecord],
        month: MonthKey,
        as_of: Option<NaiveDate>,
        config: &EvaluatorConfig,
    ) -> Self {
        let month_records: Vec<BudgetRecord> = records
            .iter()
            .filter(|r| r.month == Some(month))
            .cloned()
            .collect();

        let summaries = summarize(&month_records, &GroupBy::default(), &config.thresholds);
        let totals = monthly_totals(&month_records)
            .into_iter()
            .find(|t| t.month == month)
            .unwrap_or(MonthlyTotals {
                month,
                income: 0.0,
                expense: 0.0,
                savings: 0.0,
                savings_rate: 0.0,
            });
        let breakdown = section_breakdown(records, month);
        let pace = spending_pace(records, month, as_of);
        let alerts = evaluate_alerts(records, month, &config.limits, as_of);

        let no_spend_end = as_of.map_or(month.last_day(), |d| d.min(month.last_day()));
        let no_spend = no_spend_days(&month_records, month.first_day(), no_spend_end);

        let recommendations = build_recommendations(&summaries, Some(&totals), &config.goals);

        Self {
            month,
            totals,
            summaries,
            breakdown,
            pace,
            alerts,
            no_spend,
            goals: config.goals.clone(),
            recommendations,
        }
    }

    /// The worst grading anywhere in the report, across category statuses
    /// and alert severities.
    pub fn worst_status(&self) -> GuardrailStatus {
        self.summaries
            .iter()
            .map(|s| s.guardrail_status.clone())
            .chain(self.alerts.iter().map(|a| a.severity()))
            .max()
            .unwrap_or(GuardrailStatus::Ok)
    }

    /// Whether the tracked range met the configured no-spend day goal.
    pub fn no_spend_goal_met(&self) -> bool {
        self.no_spend.count >= self.goals.no_spend_goal
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(MonthlyReport)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Month,Category,Type,Section,Budget (€),Actual (€),Variance (€),Ratio,Status,Records\n");

        for summary in &self.summaries {
            let section = summary
                .section
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_default();
            let ratio = summary
                .variance_ratio
                .map(|r| format!("{:.4}", r))
                .unwrap_or_default();
            output.push_str(&format!(
                "{},{},{},{},{:.2},{:.2},{:.2},{},{},{}\n",
                self.month,
                csv_field(&summary.category),
                summary.entry_type,
                section,
                summary.budget_amount,
                summary.actual_amount,
                summary.variance,
                ratio,
                summary.guardrail_status,
                summary.record_count
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Budget Report - {}\n\n", self.month));
        output.push_str(&format!(
            "Income: {:.0}€   Expenses: {:.0}€   Savings: {:.0}€ ({:.1}%)\n\n",
            self.totals.income, self.totals.expense, self.totals.savings, self.totals.savings_rate
        ));

        output.push_str("## Categories\n\n");
        for summary in &self.summaries {
            let section = summary
                .section
                .as_ref()
                .map(|s| format!(" ({})", s))
                .unwrap_or_default();
            let marker = match summary.guardrail_status {
                GuardrailStatus::Ok => String::new(),
                ref status => format!(" **[{}]**", status),
            };
            output.push_str(&format!(
                "- {}{}: budget {:.2}€, actual {:.2}€, variance {:+.2}€{}\n",
                summary.category,
                section,
                summary.budget_amount,
                summary.actual_amount,
                summary.variance,
                marker
            ));
        }
        output.push('\n');

        output.push_str("## 50/30/20\n\n");
        output.push_str(&format!("- Needs: {:.2}€\n", self.breakdown.needs));
        output.push_str(&format!("- Wants: {:.2}€\n", self.breakdown.wants));
        output.push_str(&format!("- Unclassified: {:.2}€\n", self.breakdown.unclassified));
        output.push_str(&format!("- Savings: {:.2}€\n\n", self.breakdown.savings));

        output.push_str("## Pace\n\n");
        output.push_str(&format!(
            "Budget: {:.0}€ | Spent to date: {:.0}€ | Expected by today: {:.0}€\n\n",
            self.pace.monthly_budget, self.pace.spent_to_date, self.pace.expected_to_date
        ));

        output.push_str("## Guardrails\n\n");
        if self.alerts.is_empty() {
            output.push_str("No guardrail breaches detected.\n\n");
        } else {
            for alert in &self.alerts {
                output.push_str(&format!("- {}\n", alert));
            }
            output.push('\n');
        }

        output.push_str("## No-Spend Days\n\n");
        output.push_str(&format!(
            "{} no-spend days, longest streak {} (goal: {})\n\n",
            self.no_spend.count, self.no_spend.longest_streak, self.goals.no_spend_goal
        ));

        output.push_str("## Recommendations\n\n");
        for line in &self.recommendations {
            output.push_str(&format!("- {}\n", line));
        }
        output.push('\n');

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntryType, Section};

    fn march_records() -> Vec<BudgetRecord> {
        let month = MonthKey::parse("2024-03").unwrap();
        let record = |category: &str, entry_type: EntryType, budget: f64, actual: f64, day: Option<u32>, section: Option<Section>| BudgetRecord {
            category: category.to_string(),
            entry_type,
            budget_amount: budget,
            actual_amount: actual,
            month: Some(month),
            date: day.map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap()),
            section,
        };

        vec![
            record("Salary", EntryType::Income, 2600.0, 2600.0, None, None),
            record("Rent", EntryType::Expense, 800.0, 800.0, Some(1), Some(Section::Needs)),
            record("Groceries", EntryType::Expense, 450.0, 470.50, Some(12), Some(Section::Needs)),
            record("Entertainment", EntryType::Expense, 150.0, 90.0, Some(16), Some(Section::Wants)),
        ]
    }

    #[test]
    fn test_build_collects_the_month() {
        let mut records = march_records();
        records.push(BudgetRecord {
            category: "Rent".to_string(),
            entry_type: EntryType::Expense,
            budget_amount: 800.0,
            actual_amount: 800.0,
            month: Some(MonthKey::parse("2024-02").unwrap()),
            date: None,
            section: Some(Section::Needs),
        });

        let report = MonthlyReport::build(
            &records,
            MonthKey::parse("2024-03").unwrap(),
            None,
            &EvaluatorConfig::default(),
        );

        assert_eq!(report.summaries.len(), 4);
        assert!(report.summaries.iter().all(|s| s.month == Some(report.month)));
        assert_eq!(report.totals.income, 2600.0);
        assert!((report.totals.expense - 1360.5).abs() < 1e-9);
        assert_eq!(report.pace.days_elapsed, 31);
        assert_eq!(report.worst_status(), GuardrailStatus::Breach);
        // 28 no-spend days against the default goal of 8.
        assert!(report.no_spend_goal_met());
    }

    #[test]
    fn test_empty_month_builds_a_zero_report() {
        let report = MonthlyReport::build(
            &[],
            MonthKey::parse("2024-03").unwrap(),
            None,
            &EvaluatorConfig::default(),
        );

        assert!(report.summaries.is_empty());
        assert_eq!(report.totals.income, 0.0);
        assert_eq!(report.no_spend.count, 31);
        assert_eq!(report.worst_status(), GuardrailStatus::Ok);
    }

    #[test]
    fn test_markdown_export() {
        let report = MonthlyReport::build(
            &march_records(),
            MonthKey::parse("2024-03").unwrap(),
            None,
            &EvaluatorConfig::default(),
        );
        let markdown = report.to_markdown();

        assert!(markdown.contains("# Budget Report - 2024-03"));
        assert!(markdown.contains("Income: 2600€"));
        assert!(markdown.contains("- Groceries (Needs): budget 450.00€, actual 470.50€, variance +20.50€ **[Breach]**"));
        assert!(markdown.contains("No guardrail breaches detected."));
        assert!(markdown.contains("## Recommendations"));
    }

    #[test]
    fn test_csv_export() {
        let report = MonthlyReport::build(
            &march_records(),
            MonthKey::parse("2024-03").unwrap(),
            None,
            &EvaluatorConfig::default(),
        );
        let csv = report.to_csv();

        assert!(csv.starts_with("Month,Category,Type,Section,Budget (€),Actual (€)"));
        assert!(csv.contains("2024-03,Groceries,Expense,Needs,450.00,470.50,20.50,1.0456,Breach,1"));
        assert!(csv.contains("2024-03,Salary,Income,,2600.00,2600.00,0.00,1.0000,Ok,1"));
    }

    #[test]
    fn test_no_spend_range_stops_at_as_of() {
        let report = MonthlyReport::build(
            &march_records(),
            MonthKey::parse("2024-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15),
            &EvaluatorConfig::default(),
        );

        // Days 1 through 15 minus the two dated spends on the 1st and 12th.
        assert_eq!(report.no_spend.count, 13);
        assert_eq!(report.pace.days_elapsed, 15);
        assert!(report.no_spend_goal_met());

        // Four days into the month only three can be no-spend days.
        let early = MonthlyReport::build(
            &march_records(),
            MonthKey::parse("2024-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 4),
            &EvaluatorConfig::default(),
        );
        assert_eq!(early.no_spend.count, 3);
        assert!(!early.no_spend_goal_met());
    }

    #[test]
    fn test_schema_covers_the_report_shape() {
        let schema = MonthlyReport::schema_as_json().unwrap();
        assert!(schema.contains("summaries"));
        assert!(schema.contains("no_spend"));
        assert!(schema.contains("recommendations"));
    }
}
