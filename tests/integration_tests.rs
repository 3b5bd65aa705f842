use budget_evaluator::*;
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;

fn csv_line(
    month: &str,
    date: &str,
    category: &str,
    entry_type: &str,
    budget: f64,
    actual: f64,
    section: &str,
) -> String {
    format!(
        "{},{},{},{},{},{},{}\n",
        month, date, category, entry_type, budget, actual, section
    )
}

fn household_march_csv() -> String {
    let mut data = String::from("Month,Date,Category,Type,Budget (€),Actual (€),Section\n");
    data.push_str(&csv_line("2024-03", "", "Salary", "Income", 2600.0, 2600.0, "Savings"));
    data.push_str(&csv_line("2024-03", "", "Other Income", "Income", 0.0, 120.0, "Savings"));
    data.push_str(&csv_line("2024-03", "2024-03-01", "Rent", "Expense", 800.0, 800.0, "Needs"));
    data.push_str(&csv_line("2024-03", "2024-03-03", "Insurance", "Expense", 120.0, 118.40, "Needs"));
    data.push_str(&csv_line("2024-03", "2024-03-05", "Groceries", "Expense", 450.0, 180.20, "Needs"));
    data.push_str(&csv_line("2024-03", "2024-03-19", "Groceries", "Expense", 0.0, 290.30, "Needs"));
    data.push_str(&csv_line("2024-03", "2024-03-08", "Transport", "Expense", 90.0, 64.0, "Needs"));
    data.push_str(&csv_line(
        "2024-03",
        "2024-03-11",
        "Restaurant & Food Delivery",
        "Expense",
        150.0,
        162.75,
        "Wants",
    ));
    data.push_str(&csv_line("2024-03", "2024-03-16", "Entertainment", "Expense", 100.0, 45.0, "Wants"));
    data.push_str(&csv_line(
        "2024-03",
        "",
        "\"Phone Subs (ChatGPT, Google Cloud, Apple Music, Extra)\"",
        "Expense",
        60.0,
        58.97,
        "Wants",
    ));
    data
}

#[test]
fn test_comprehensive_household_month() {
    let evaluator = BudgetEvaluator::default();
    let records = evaluator
        .load_csv(household_march_csv().as_bytes())
        .unwrap();
    assert_eq!(records.len(), 10);

    let month = MonthKey::parse("2024-03").unwrap();
    let report = evaluator.monthly_report(&records, month, None);

    assert_eq!(report.totals.income, 2720.0);
    let expected_expense = 800.0 + 118.40 + 180.20 + 290.30 + 64.0 + 162.75 + 45.0 + 58.97;
    assert!(
        (report.totals.expense - expected_expense).abs() < 1e-9,
        "Expenses should sum to {}, got {}",
        expected_expense,
        report.totals.expense
    );
    assert!(
        (report.totals.savings - (2720.0 - expected_expense)).abs() < 1e-9,
        "Savings must equal income minus expenses"
    );

    // Both Groceries rows collapse into one summary line.
    let groceries = report
        .summaries
        .iter()
        .find(|s| s.category == "Groceries")
        .unwrap();
    assert_eq!(groceries.record_count, 2);
    assert!((groceries.budget_amount - 450.0).abs() < 1e-9);
    assert!((groceries.actual_amount - 470.50).abs() < 1e-9);
    assert!((groceries.variance - 20.50).abs() < 1e-9);
    assert!((groceries.variance_ratio.unwrap() - 470.50 / 450.0).abs() < 1e-9);
    assert_eq!(groceries.guardrail_status, GuardrailStatus::Breach);

    let restaurants = report
        .summaries
        .iter()
        .find(|s| s.category == "Restaurant & Food Delivery")
        .unwrap();
    assert_eq!(restaurants.guardrail_status, GuardrailStatus::Breach);

    let insurance = report
        .summaries
        .iter()
        .find(|s| s.category == "Insurance")
        .unwrap();
    // 118.40 / 120 is above 0.9 but not above 1.0.
    assert_eq!(insurance.guardrail_status, GuardrailStatus::Warning);

    let salary = report
        .summaries
        .iter()
        .find(|s| s.category == "Salary")
        .unwrap();
    assert_eq!(salary.guardrail_status, GuardrailStatus::Ok);

    assert!((report.breakdown.needs - (800.0 + 118.40 + 180.20 + 290.30 + 64.0)).abs() < 1e-9);
    assert!((report.breakdown.wants - (162.75 + 45.0 + 58.97)).abs() < 1e-9);
    assert_eq!(report.breakdown.unclassified, 0.0);

    let mut file = File::create("test_household_report.md").unwrap();
    file.write_all(report.to_markdown().as_bytes()).unwrap();

    let mut file = File::create("test_household_report.csv").unwrap();
    file.write_all(report.to_csv().as_bytes()).unwrap();

    let mut file = File::create("test_household_report.json").unwrap();
    file.write_all(report.to_json().unwrap().as_bytes()).unwrap();

    println!("✓ Household month test passed - output: test_household_report.md");
}

#[test]
fn test_mid_month_cutoff() {
    let evaluator = BudgetEvaluator::default();
    let records = evaluator
        .load_csv(household_march_csv().as_bytes())
        .unwrap();

    let month = MonthKey::parse("2024-03").unwrap();
    let as_of = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let report = evaluator.monthly_report(&records, month, Some(as_of));

    // The plan still covers the whole month.
    let expected_budget = 800.0 + 120.0 + 450.0 + 90.0 + 150.0 + 100.0 + 60.0;
    assert!(
        (report.pace.monthly_budget - expected_budget).abs() < 1e-9,
        "Budget must not be cut off, got {}",
        report.pace.monthly_budget
    );

    // Spending counts dated rows through the 10th plus the undated subscription row.
    let expected_spent = 800.0 + 118.40 + 180.20 + 64.0 + 58.97;
    assert!(
        (report.pace.spent_to_date - expected_spent).abs() < 1e-9,
        "Spent to date should be {}, got {}",
        expected_spent,
        report.pace.spent_to_date
    );
    assert_eq!(report.pace.days_elapsed, 10);
    assert_eq!(report.pace.days_in_month, 31);
    assert!((report.pace.expected_to_date - expected_budget * 10.0 / 31.0).abs() < 1e-9);

    // 1221.57 of a 1770 budget is 69% by day 10: no pace alert.
    assert!(report.alerts.is_empty());

    // The no-spend range ends at the cutoff: days 2, 4, 6, 7, 9 and 10.
    assert_eq!(report.no_spend.count, 6);
    assert_eq!(report.no_spend.longest_streak, 2);
}

#[test]
fn test_guardrail_escalation() {
    let mut data = String::from("Month,Date,Category,Type,Budget (€),Actual (€),Section\n");
    data.push_str(&csv_line("2024-05", "2024-05-02", "Groceries", "Expense", 400.0, 250.0, ""));
    data.push_str(&csv_line(
        "2024-05",
        "2024-05-04",
        "Restaurant & Food Delivery",
        "Expense",
        150.0,
        190.0,
        "",
    ));
    data.push_str(&csv_line("2024-05", "2024-05-06", "Trade", "Expense", 100.0, 260.0, ""));

    let mut config = EvaluatorConfig::default();
    config
        .limits
        .hard_caps
        .insert("Restaurant & Food Delivery".to_string(), 180.0);
    config.limits.loss_limits.insert("Trade".to_string(), 200.0);

    let evaluator = BudgetEvaluator::new(config);
    let records = evaluator.load_csv(data.as_bytes()).unwrap();

    let month = MonthKey::parse("2024-05").unwrap();
    let as_of = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
    let report = evaluator.monthly_report(&records, month, Some(as_of));

    // 700 spent of a 650 budget by day 8 trips the pace rule as well.
    assert_eq!(report.alerts.len(), 3);
    match &report.alerts[0] {
        GuardrailAlert::OverallPace { budget, spent, day } => {
            assert!((budget - 650.0).abs() < 1e-9);
            assert!((spent - 700.0).abs() < 1e-9);
            assert_eq!(*day, 8);
        }
        other => panic!("Expected a pace alert first, got {:?}", other),
    }
    match &report.alerts[1] {
        GuardrailAlert::HardCapExceeded { category, cap, spent } => {
            assert_eq!(category, "Restaurant & Food Delivery");
            assert!((cap - 180.0).abs() < 1e-9);
            assert!((spent - 190.0).abs() < 1e-9);
        }
        other => panic!("Expected a hard cap alert second, got {:?}", other),
    }
    match &report.alerts[2] {
        GuardrailAlert::LossLimitExceeded { category, limit, spent } => {
            assert_eq!(category, "Trade");
            assert!((limit - 200.0).abs() < 1e-9);
            assert!((spent - 260.0).abs() < 1e-9);
        }
        other => panic!("Expected a loss limit alert third, got {:?}", other),
    }

    assert_eq!(report.worst_status(), GuardrailStatus::Breach);

    let rendered = report.to_markdown();
    assert!(rendered.contains("Slow down now."));
    assert!(rendered.contains("Consider a spending freeze."));
    assert!(rendered.contains("Trade: Loss limit of 200€ exceeded. Pause activity."));

    println!("✓ Guardrail escalation test passed");
}

#[test]
fn test_validation_errors_carry_row_indices() {
    let evaluator = BudgetEvaluator::default();

    let data = "\
Category,Type,Budget (€),Actual (€)
Groceries,Expense,450,470.50
Savings,Transfer,200,200
";
    let err = evaluator.load_csv(data.as_bytes()).unwrap_err();
    match err {
        BudgetError::InvalidType { row, value } => {
            assert_eq!(row, 2);
            assert_eq!(value, "Transfer");
        }
        other => panic!("Expected InvalidType, got {:?}", other),
    }

    let data = "\
Category,Type,Budget (€),Actual (€),Date
Groceries,Expense,450,470.50,2024-03-12
Rent,Expense,800,800,12/03/2024
";
    let err = evaluator.load_csv(data.as_bytes()).unwrap_err();
    match err {
        BudgetError::InvalidDateFormat {
            row,
            value,
            expected,
            ..
        } => {
            assert_eq!(row, 2);
            assert_eq!(value, "12/03/2024");
            assert_eq!(expected, "YYYY-MM-DD");
        }
        other => panic!("Expected InvalidDateFormat, got {:?}", other),
    }

    let data = "\
Category,Type,Budget (€),Actual (€)
Groceries,Expense,abc,470.50
";
    let err = evaluator.load_csv(data.as_bytes()).unwrap_err();
    match err {
        BudgetError::InvalidAmount { row, column, value } => {
            assert_eq!(row, 1);
            assert_eq!(column, "Budget");
            assert_eq!(value, "abc");
        }
        other => panic!("Expected InvalidAmount, got {:?}", other),
    }

    let data = "\
Category,Budget (€),Actual (€)
Groceries,450,470.50
";
    let err = evaluator.load_csv(data.as_bytes()).unwrap_err();
    match err {
        BudgetError::MissingColumn { column } => assert_eq!(column, "Type"),
        other => panic!("Expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_date_only_rows_group_as_all_time() {
    let evaluator = BudgetEvaluator::default();
    let data = "\
Month,Date,Category,Type,Budget (€),Actual (€)
,2025-01-15,Groceries,Expense,300,320
";
    let records = evaluator.load_csv(data.as_bytes()).unwrap();
    assert_eq!(records[0].month, None);
    assert_eq!(
        records[0].date,
        Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
    );

    // An empty Month cell means all-time even under month-keyed grouping.
    let summaries = evaluator.summarize(&records);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].month, None);
    assert_eq!(summaries[0].guardrail_status, GuardrailStatus::Breach);
}

#[test]
fn test_no_spend_tracking_over_a_range() {
    let evaluator = BudgetEvaluator::default();
    let data = "\
Month,Date,Category,Type,Budget (€),Actual (€)
2024-01,2024-01-02,Groceries,Expense,450,32.50
2024-01,2024-01-05,Transport,Expense,90,12.00
2024-01,2024-01-05,Groceries,Expense,0,18.40
2024-01,2024-01-03,Salary,Income,0,2600
";
    let records = evaluator.load_csv(data.as_bytes()).unwrap();

    let tracked = no_spend_days(
        &records,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
    );

    // Income on the 3rd does not spoil the day; only expenses count.
    assert_eq!(
        tracked.days,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        ]
    );
    assert_eq!(tracked.count, 3);
    assert_eq!(tracked.longest_streak, 2);

    println!("✓ No-spend tracking test passed");
}

#[test]
fn test_catalog_classification() {
    let catalog = CategoryCatalog::standard();
    let evaluator = BudgetEvaluator::default().with_catalog(catalog.clone());

    // Row-level sections lose against the catalog; unknown categories keep theirs.
    let data = "\
Month,Category,Type,Budget (€),Actual (€),Section
2024-03,Groceries,Expense,450,470.50,Wants
2024-03,Entertainment,Expense,100,45,
2024-03,Llama Grooming,Expense,40,35,Wants
";
    let records = evaluator.load_csv(data.as_bytes()).unwrap();

    assert_eq!(records[0].section, Some(Section::Needs));
    assert_eq!(records[1].section, Some(Section::Wants));
    assert_eq!(records[2].section, Some(Section::Wants));

    assert_eq!(catalog.section_for("Rent"), Some(Section::Needs));
    assert_eq!(catalog.section_for("Bet"), Some(Section::Wants));
    assert_eq!(catalog.entry_type_for("Salary"), Some(EntryType::Income));
    assert_eq!(catalog.section_for("Llama Grooming"), None);

    let mut file = File::create("test_catalog.json").unwrap();
    file.write_all(catalog.to_json().unwrap().as_bytes()).unwrap();

    let mut file = File::create("test_catalog.csv").unwrap();
    file.write_all(catalog.to_csv().as_bytes()).unwrap();

    let mut file = File::create("test_catalog.md").unwrap();
    file.write_all(catalog.to_markdown().as_bytes()).unwrap();

    println!("✓ Catalog classification test passed");
    println!("  - Catalog: test_catalog.json");
    println!("  - Catalog: test_catalog.csv");
    println!("  - Catalog: test_catalog.md");
}

#[test]
fn test_rolling_actuals_across_months() {
    let evaluator = BudgetEvaluator::default();
    let data = "\
Month,Category,Type,Budget (€),Actual (€)
2024-01,Groceries,Expense,450,420
2024-02,Groceries,Expense,450,480
2024-04,Groceries,Expense,450,450
2024-01,Salary,Income,2600,2600
";
    let records = evaluator.load_csv(data.as_bytes()).unwrap();

    let points = rolling_actuals(&records, "Groceries", 3);
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].month, MonthKey::parse("2024-01").unwrap());
    assert!((points[0].rolling_mean - 420.0).abs() < 1e-9);
    assert!((points[1].rolling_mean - 450.0).abs() < 1e-9);
    // March carries no data, so the window slides over Jan, Feb and Apr.
    assert_eq!(points[2].month, MonthKey::parse("2024-04").unwrap());
    assert!((points[2].rolling_mean - 450.0).abs() < 1e-9);
}

#[test]
fn test_schema_generation() {
    let schema_json = EvaluatorConfig::schema_as_json().unwrap();

    let mut file = File::create("schema_output.json").unwrap();
    file.write_all(schema_json.as_bytes()).unwrap();

    assert!(schema_json.contains("warning_ratio"));
    assert!(schema_json.contains("breach_ratio"));
    assert!(schema_json.contains("hard_caps"));
    assert!(schema_json.contains("loss_limits"));
    assert!(schema_json.contains("savings_goal"));
    assert!(schema_json.contains("currency_symbol"));

    let report_schema = MonthlyReport::schema_as_json().unwrap();
    assert!(report_schema.contains("guardrail_status"));
    assert!(report_schema.contains("longest_streak"));

    println!("✓ Schema generation test passed - output: schema_output.json");
}

#[test]
fn test_report_export_round_trip() {
    let month = MonthKey::parse("2024-03").unwrap();
    let report = evaluate_csv(household_march_csv().as_bytes(), month).unwrap();

    let json = report.to_json().unwrap();
    let parsed: MonthlyReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let csv = report.to_csv();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Month,Category,Type,Section,Budget (€),Actual (€),Variance (€),Ratio,Status,Records"
    );
    assert!(csv.contains("2024-03,Groceries,Expense,Needs,450.00,470.50,20.50,1.0456,Breach,2"));
    assert!(csv.contains("\"Phone Subs (ChatGPT, Google Cloud, Apple Music, Extra)\""));

    let markdown = report.to_markdown();
    assert!(markdown.contains("# Budget Report - 2024-03"));
    assert!(markdown.contains("## 50/30/20"));
    assert!(markdown.contains("**[Breach]**"));
}
