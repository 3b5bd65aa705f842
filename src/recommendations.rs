use crate::analytics::MonthlyTotals;
use crate::schema::{EntryType, Goals};
use crate::summary::CategorySummary;

/// Turns one month's summaries into short, actionable advice lines.
///
/// Lines appear in a fixed order: the savings gap against the goal, the
/// savings rate against its goal, the five worst overspent expense
/// categories, then a subscriptions nudge. When nothing needs attention a
/// single all-clear line is returned.
pub fn build_recommendations(
    summaries: &[CategorySummary],
    totals: Option<&MonthlyTotals>,
    goals: &Goals,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(totals) = totals {
        let goal_gap = goals.savings_goal - totals.savings;
        if goal_gap > 0.0 {
            lines.push(format!(
                "Increase savings by {:.0}€ to hit the monthly goal.",
                goal_gap
            ));
        }
        if totals.income > 0.0 && totals.savings_rate < goals.savings_rate_goal {
            lines.push(format!(
                "Savings rate is {:.1}%. Aim for {:.0}%.",
                totals.savings_rate, goals.savings_rate_goal
            ));
        }
    }

    let mut overspent: Vec<&CategorySummary> = summaries
        .iter()
        .filter(|s| s.entry_type == EntryType::Expense && s.variance > 0.0)
        .collect();
    overspent.sort_by(|a, b| b.variance.partial_cmp(&a.variance).unwrap_or(std::cmp::Ordering::Equal));
    for summary in overspent.iter().take(5) {
        lines.push(format!(
            "Reduce {} by {:.0}€ to meet budget.",
            summary.category, summary.variance
        ));
    }

    let subscription_total: f64 = summaries
        .iter()
        .filter(|s| s.entry_type == EntryType::Expense && s.category.to_lowercase().contains("subs"))
        .map(|s| s.actual_amount)
        .sum();
    if subscription_total > 0.0 {
        lines.push(format!(
            "Subscriptions total {:.0}€. Cancel/pause one for 60 days.",
            subscription_total
        ));
    }

    if lines.is_empty() {
        lines.push("No immediate risks. Keep your plan.".to_string());
    }

    lines
}
