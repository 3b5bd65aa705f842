use budget_evaluator::{BudgetEvaluator, CategoryCatalog, EvaluatorConfig, MonthKey};
use std::env;

const SAMPLE: &str = "\
Month,Date,Category,Type,Budget (€),Actual (€)
2024-02,,Salary,Income,2600,2600
2024-02,2024-02-02,Rent,Expense,800,800
2024-02,2024-02-10,Groceries,Expense,450,421.80
2024-02,2024-02-21,Entertainment,Expense,100,118
2024-03,,Salary,Income,2600,2600
2024-03,2024-03-01,Rent,Expense,800,800
2024-03,2024-03-12,Groceries,Expense,450,470.50
2024-03,2024-03-15,Trade,Expense,100,210
";

fn main() -> anyhow::Result<()> {
    let mut config = EvaluatorConfig::default();
    config.limits.loss_limits.insert("Trade".to_string(), 150.0);

    let evaluator = BudgetEvaluator::new(config).with_catalog(CategoryCatalog::standard());

    let records = match env::args().nth(1) {
        Some(path) => evaluator.load_csv_path(&path)?,
        None => {
            eprintln!("No CSV path given, evaluating built-in sample data.");
            eprintln!("Usage: csv_import <budget.csv>\n");
            evaluator.load_csv(SAMPLE.as_bytes())?
        }
    };

    let mut months: Vec<MonthKey> = records.iter().filter_map(|r| r.month).collect();
    months.sort();
    months.dedup();

    println!("Loaded {} records across {} month(s).\n", records.len(), months.len());

    for summary in evaluator.summarize(&records) {
        let month = summary
            .month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<30} {:>9.2}€ of {:>9.2}€  [{}]",
            month,
            summary.category,
            summary.actual_amount,
            summary.budget_amount,
            summary.guardrail_status
        );
    }

    if let Some(&latest) = months.last() {
        let report = evaluator.monthly_report(&records, latest, None);
        println!("\nLatest month: {}", latest);
        println!(
            "Income: {:.2}€, expenses: {:.2}€, savings: {:.2}€ ({:.1}%)",
            report.totals.income,
            report.totals.expense,
            report.totals.savings,
            report.totals.savings_rate
        );
        for alert in &report.alerts {
            println!("! {}", alert);
        }
        for line in &report.recommendations {
            println!("> {}", line);
        }
    }

    Ok(())
}
