//! Allocation properties over the reference tables.

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use portfolio_core::{
    allocator::Allocator,
    classifier::{Classifier, RiskProfile},
    config::PortfolioConfig,
    record::{AllocationRow, RespondentRecord},
};

fn respondent(range: &str, tolerance: &str) -> RespondentRecord {
    RespondentRecord {
        investor_id:            "INV001".into(),
        name:                   "Asha Rao".into(),
        investment_range_label: range.into(),
        risk_tolerance_label:   tolerance.into(),
        timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
    }
}

/// The worked example: ₹3–6 lakh, moderate tolerance.
#[test]
fn golden_medium_respondent() {
    let config = PortfolioConfig::reference();
    let classifier = Classifier::new(&config);
    let allocator = Allocator::new(&config).unwrap();

    let record = classifier.classify(respondent(
        "₹3,00,001 – ₹6,00,000",
        "I can tolerate moderate ups and downs",
    ));
    assert_eq!(record.investment_amount, Some(450_000.0));
    assert_eq!(record.risk_profile, Some(RiskProfile::Medium));

    let rows: Vec<AllocationRow> = allocator.allocate(&record).unwrap().collect();
    assert_eq!(rows.len(), 3);

    let expected = [
        ("Equity",     40.0, 180_000.0, 12.0, 21_600.0),
        ("Govt Bonds", 40.0, 180_000.0,  7.0, 12_600.0),
        ("Gold",       20.0,  90_000.0,  6.0,  5_400.0),
    ];
    for (row, (asset, pct, amount, ret, profit)) in rows.iter().zip(expected) {
        assert_eq!(row.investor_id, "INV001");
        assert_eq!(row.name, "Asha Rao");
        assert_eq!(row.risk_profile, RiskProfile::Medium);
        assert_eq!(row.asset_class, asset);
        assert_abs_diff_eq!(row.allocation_pct, pct, epsilon = 1e-9);
        assert_eq!(row.investment_amount, Some(amount));
        assert_abs_diff_eq!(row.expected_return_pct, ret, epsilon = 1e-9);
        assert_eq!(row.expected_profit, Some(profit));
        assert_eq!(row.investment_date, record.respondent.timestamp);
    }
}

/// Every (range, profile) pair: row count matches the rule and the rounded
/// amounts add back up to the respondent's amount within per-row rounding.
#[test]
fn allocated_amounts_sum_to_investment() {
    let config = PortfolioConfig::reference();
    let classifier = Classifier::new(&config);
    let allocator = Allocator::new(&config).unwrap();

    for range in &config.investment_ranges {
        for statement in &config.risk_statements {
            let record = classifier.classify(respondent(&range.label, &statement.statement));
            let rule_len = config.rule_for(statement.risk_profile).unwrap().weights.len();

            let rows: Vec<_> = allocator.allocate(&record).unwrap().collect();
            assert_eq!(rows.len(), rule_len);

            let total: f64 = rows.iter().map(|r| r.investment_amount.unwrap()).sum();
            assert!(
                (total - range.amount).abs() <= rule_len as f64 * 0.5,
                "{} / {}: allocated {total}, expected {}",
                range.label,
                statement.risk_profile,
                range.amount
            );

            let pct: f64 = rows.iter().map(|r| r.allocation_pct).sum();
            assert_abs_diff_eq!(pct, 100.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn allocation_is_deterministic() {
    let config = PortfolioConfig::reference();
    let classifier = Classifier::new(&config);
    let allocator = Allocator::new(&config).unwrap();
    let record = classifier.classify(respondent(
        "₹6,00,001 – ₹10,00,000",
        "I am comfortable with high fluctuations for higher returns",
    ));

    let a: Vec<_> = allocator.allocate(&record).unwrap().collect();
    let b: Vec<_> = allocator.allocate(&record).unwrap().collect();
    assert_eq!(a, b);

    // A second allocator over the same tables agrees too.
    let other = Allocator::new(&config).unwrap();
    let c: Vec<_> = other.allocate(&record).unwrap().collect();
    assert_eq!(a, c);
}

#[test]
fn unmapped_range_still_allocates_with_absent_amounts() {
    let config = PortfolioConfig::reference();
    let classifier = Classifier::new(&config);
    let allocator = Allocator::new(&config).unwrap();

    let record = classifier.classify(respondent(
        "₹50,000 – ₹1,00,000",
        "I prefer stable returns even if growth is low",
    ));
    assert_eq!(record.investment_amount, None);

    let rows: Vec<_> = allocator.allocate(&record).unwrap().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.investment_amount.is_none() && r.expected_profit.is_none()));
    assert_eq!(rows[1].asset_class, "Govt Bonds");
    assert_abs_diff_eq!(rows[1].allocation_pct, 60.0, epsilon = 1e-9);
}

/// Alternate tables are injected the same way as the reference ones.
#[test]
fn custom_tables_drive_allocation() {
    let mut config = PortfolioConfig::reference();
    config.investment_ranges[0].amount = 1_000.0;
    config.market_assumptions[0].expected_return = 0.10;

    let classifier = Classifier::new(&config);
    let allocator = Allocator::new(&config).unwrap();
    let record = classifier.classify(respondent(
        &config.investment_ranges[0].label,
        "I am comfortable with high fluctuations for higher returns",
    ));

    let equity = allocator.allocate(&record).unwrap().next().unwrap();
    assert_eq!(equity.investment_amount, Some(600.0));
    assert_eq!(equity.expected_profit, Some(60.0));
}
