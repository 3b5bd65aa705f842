use crate::calendar::MonthKey;
use crate::guardrails::{GuardrailThresholds, SpendingLimits};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum EntryType {
    #[schemars(description = "Money coming in: salary, side income, refunds (guardrails never apply)")]
    Income,

    #[schemars(description = "Money going out: planned and tracked spending (guardrails apply)")]
    Expense,
}

impl EntryType {
    /// Parses a raw cell value, ignoring surrounding whitespace and letter case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Section {
    #[schemars(description = "Essential spending: rent, groceries, utilities, insurance (the 50 in 50/30/20)")]
    Needs,

    #[schemars(description = "Discretionary spending: dining out, hobbies, subscriptions (the 30 in 50/30/20)")]
    Wants,

    #[schemars(description = "Transfers to savings or investments (the 20 in 50/30/20)")]
    Savings,
}

impl Section {
    /// Parses a raw cell value, ignoring surrounding whitespace and letter case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "needs" => Some(Self::Needs),
            "wants" => Some(Self::Wants),
            "savings" => Some(Self::Savings),
            _ => None,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Needs => write!(f, "Needs"),
            Self::Wants => write!(f, "Wants"),
            Self::Savings => write!(f, "Savings"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BudgetRecord {
    #[schemars(description = "The budget line name as it appears in the plan (e.g., 'Groceries', 'Rent', 'Salary')")]
    pub category: String,

    #[schemars(description = "Whether this line is Income or Expense")]
    pub entry_type: EntryType,

    #[schemars(description = "The planned amount for the period, in account currency")]
    pub budget_amount: f64,

    #[schemars(description = "The amount actually earned or spent, in account currency")]
    pub actual_amount: f64,

    #[schemars(description = "The calendar month this row belongs to, when the source data is monthly")]
    pub month: Option<MonthKey>,

    #[schemars(
        description = "The transaction date for day-level rows. When both month and date are present they must agree."
    )]
    pub date: Option<NaiveDate>,

    #[schemars(description = "50/30/20 classification of the line, when the source data carries one")]
    pub section: Option<Section>,
}

impl BudgetRecord {
    /// Whether this row counts for a scan anchored at `as_of`. A cutoff only
    /// filters dated rows; undated rows always count.
    pub fn counts_through(&self, as_of: Option<NaiveDate>) -> bool {
        match (as_of, self.date) {
            (Some(cutoff), Some(date)) => date <= cutoff,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LoadOptions {
    #[schemars(
        description = "Currency symbol stripped from amount cells before parsing (leading or trailing, e.g. '€ 450' or '450 €')"
    )]
    pub currency_symbol: String,

    #[schemars(description = "CSV field delimiter as a byte. Defaults to a comma.")]
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
            delimiter: b',',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Goals {
    #[schemars(description = "Target amount moved into savings each month, in account currency")]
    pub savings_goal: f64,

    #[schemars(description = "Target savings rate as a percentage of income (e.g. 20.0 for 20%)")]
    pub savings_rate_goal: f64,

    #[schemars(description = "Target number of no-spend days per month")]
    pub no_spend_goal: usize,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            savings_goal: 300.0,
            savings_rate_goal: 20.0,
            no_spend_goal: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
pub struct EvaluatorConfig {
    #[serde(default)]
    #[schemars(description = "How raw tabular data is read and normalized")]
    pub load: LoadOptions,

    #[serde(default)]
    #[schemars(description = "Variance ratio thresholds that grade each expense category")]
    pub thresholds: GuardrailThresholds,

    #[serde(default)]
    #[schemars(description = "In-month spending limits checked by the alert scan")]
    pub limits: SpendingLimits,

    #[serde(default)]
    #[schemars(description = "Monthly goals referenced by recommendations")]
    pub goals: Goals,
}

impl EvaluatorConfig {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EvaluatorConfig)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
