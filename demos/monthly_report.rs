use budget_evaluator::{BudgetEvaluator, CategoryCatalog, GuardrailStatus, MonthKey};

fn main() {
    let data = "\
Month,Date,Category,Type,Budget (€),Actual (€)
2024-03,,Salary,Income,2600,2600
2024-03,2024-03-01,Rent,Expense,800,800
2024-03,2024-03-04,Groceries,Expense,450,470.50
2024-03,2024-03-09,Transport,Expense,90,64
2024-03,2024-03-11,Restaurant & Food Delivery,Expense,150,162.75
2024-03,2024-03-16,Entertainment,Expense,100,45
";

    let evaluator = BudgetEvaluator::default().with_catalog(CategoryCatalog::standard());
    let records = evaluator
        .load_csv(data.as_bytes())
        .expect("sample data should load");

    let month: MonthKey = "2024-03".parse().expect("sample month should parse");
    let report = evaluator.monthly_report(&records, month, None);

    println!("{}", report.to_markdown());

    match report.worst_status() {
        GuardrailStatus::Ok => println!("Verdict: on plan."),
        GuardrailStatus::Warning => println!("Verdict: close to the line in places."),
        GuardrailStatus::Breach => println!("Verdict: over budget, see the markers above."),
    }
}
