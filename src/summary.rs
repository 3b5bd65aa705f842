use crate::calendar::MonthKey;
use crate::guardrails::{GuardrailStatus, GuardrailThresholds};
use crate::schema::{BudgetRecord, EntryType, Section};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Controls how records are grouped before totals are taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct GroupBy {
    #[schemars(description = "Group by calendar month. Off, all months of a category merge into one row.")]
    pub month: bool,

    #[schemars(description = "Group by 50/30/20 section, splitting categories that span sections")]
    pub section: bool,
}

impl Default for GroupBy {
    fn default() -> Self {
        Self {
            month: true,
            section: false,
        }
    }
}

/// Aggregated totals and grading for one category group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CategorySummary {
    pub category: String,
    pub entry_type: EntryType,
    pub month: Option<MonthKey>,
    pub section: Option<Section>,
    pub budget_amount: f64,
    pub actual_amount: f64,

    #[schemars(description = "Actual minus budget. Positive means over plan for expenses, above plan for income.")]
    pub variance: f64,

    #[schemars(description = "Actual divided by budget, absent when the budget is zero")]
    pub variance_ratio: Option<f64>,

    #[schemars(description = "Threshold grading of the group. Income is never graded and stays Ok.")]
    pub guardrail_status: GuardrailStatus,

    #[schemars(description = "Number of records merged into this group")]
    pub record_count: usize,
}

#[derive(Debug, Default)]
struct Bucket {
    budget: f64,
    actual: f64,
    count: usize,
    section: Option<Option<Section>>,
    mixed_sections: bool,
}

impl Bucket {
    fn merge(&mut self, record: &BudgetRecord) {
        self.budget += record.budget_amount;
        self.actual += record.actual_amount;
        self.count += 1;
        match &self.section {
            None => self.section = Some(record.section.clone()),
            Some(seen) if *seen != record.section => self.mixed_sections = true,
            _ => {}
        }
    }

    fn section(&self) -> Option<Section> {
        if self.mixed_sections {
            None
        } else {
            self.section.clone().flatten()
        }
    }
}

/// Aggregates records into per-category totals with variance and grading.
///
/// Groups are keyed by category and entry type, plus month and section when
/// enabled. Output order is deterministic: category name, then month, with
/// all-time rows first. Without section grouping, a group keeps its section
/// only when all of its records agree on one.
pub fn summarize(
    records: &[BudgetRecord],
    group_by: &GroupBy,
    thresholds: &GuardrailThresholds,
) -> Vec<CategorySummary> {
    let mut buckets: BTreeMap<(String, Option<MonthKey>, EntryType, Option<Section>), Bucket> =
        BTreeMap::new();

    for record in records {
        let key = (
            record.category.clone(),
            if group_by.month { record.month } else { None },
            record.entry_type.clone(),
            if group_by.section {
                record.section.clone()
            } else {
                None
            },
        );
        buckets.entry(key).or_default().merge(record);
    }

    buckets
        .into_iter()
        .map(|((category, month, entry_type, key_section), bucket)| {
            let variance = bucket.actual - bucket.budget;
            let variance_ratio = if bucket.budget != 0.0 {
                Some(bucket.actual / bucket.budget)
            } else {
                None
            };
            let guardrail_status = if entry_type == EntryType::Income {
                GuardrailStatus::Ok
            } else {
                thresholds.status_for(variance_ratio)
            };
            let section = if group_by.section {
                key_section
            } else {
                bucket.section()
            };

            CategorySummary {
                category,
                entry_type,
                month,
                section,
                budget_amount: bucket.budget,
                actual_amount: bucket.actual,
                variance,
                variance_ratio,
                guardrail_status,
                record_count: bucket.count,
            }
        })
        .collect()
}
