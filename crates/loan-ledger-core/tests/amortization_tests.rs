use loan_ledger_core::amortization::{
    build_amortization, compute_schedule, summarize_schedule, AmortizationInput, ScheduleRow,
};
use loan_ledger_core::LoanError;
use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TOLERANCE: Decimal = dec!(0.01);

fn principal_sum(rows: &[ScheduleRow]) -> Decimal {
    rows.iter().map(|r| r.principal).sum()
}

// ===========================================================================
// Known-answer scenarios
// ===========================================================================

#[test]
fn test_construction_loan_with_six_month_io() {
    // 1,000,000 at 8% for 24 months, first 6 interest-only
    let rows = compute_schedule(dec!(1_000_000), dec!(0.08), 24, 6).unwrap();
    assert_eq!(rows.len(), 24);

    for row in &rows[..6] {
        assert!(
            (row.interest - dec!(6666.67)).abs() < TOLERANCE,
            "I/O interest should be ~6,666.67, got {}",
            row.interest
        );
        assert_eq!(row.principal, Decimal::ZERO);
        assert_eq!(row.payment, row.interest);
        assert_eq!(row.balance, dec!(1_000_000));
    }

    // Level payment over 18 months at 0.6667% ≈ 59,140
    let level = rows[6].payment;
    assert!(
        level > dec!(59_100) && level < dec!(59_200),
        "Expected level payment ~59,140, got {}",
        level
    );
    // Month 7 interest is still on the full balance
    assert!((rows[6].interest - dec!(6666.67)).abs() < TOLERANCE);

    for row in &rows[6..23] {
        assert_eq!(row.payment, level);
    }
    assert!((rows[23].payment - level).abs() < TOLERANCE);
    assert_eq!(rows[23].balance, Decimal::ZERO);
    assert!((principal_sum(&rows) - dec!(1_000_000)).abs() <= TOLERANCE);
}

#[test]
fn test_io_until_final_month() {
    // Last month repays everything
    let rows = compute_schedule(dec!(750_000), dec!(0.1), 12, 11).unwrap();
    assert_eq!(rows[10].balance, dec!(750_000));
    assert_eq!(rows[11].principal, dec!(750_000));
    assert_eq!(rows[11].balance, Decimal::ZERO);
    // 750,000 * 0.1 / 12 = 6,250 interest plus principal
    assert!((rows[11].payment - dec!(756_250)).abs() < TOLERANCE);
}

#[test]
fn test_zero_rate_with_io() {
    let rows = compute_schedule(dec!(90_000), Decimal::ZERO, 12, 3).unwrap();
    for row in &rows[..3] {
        assert_eq!(row.payment, Decimal::ZERO);
    }
    for row in &rows[3..] {
        assert_eq!(row.interest, Decimal::ZERO);
        assert_eq!(row.principal, dec!(10_000));
    }
    assert_eq!(rows[11].balance, Decimal::ZERO);
}

#[test]
fn test_summary_of_construction_loan() {
    let rows = compute_schedule(dec!(1_000_000), dec!(0.08), 24, 6).unwrap();
    let summary = summarize_schedule(&rows, 24);
    assert!((summary.total_principal - dec!(1_000_000)).abs() < TOLERANCE);
    assert!((summary.total_payments - summary.total_principal - summary.total_interest).abs() < TOLERANCE);
    assert_eq!(summary.monthly_average, summary.total_interest / dec!(24));
    assert!((summary.annual_average - summary.total_interest / dec!(2)).abs() < TOLERANCE);
}

#[test]
fn test_thirty_year_mortgage_payment() {
    let input = AmortizationInput::new(dec!(400_000), dec!(0.065), 360, 0);
    let out = build_amortization(&input).unwrap();
    // Standard 30y payment at 6.5% ≈ 2,528.27
    assert!((out.result.level_payment - dec!(2528.27)).abs() < TOLERANCE);
    assert_eq!(out.result.schedule.len(), 360);
    assert_eq!(out.result.ending_balance, Decimal::ZERO);
}

#[test]
fn test_rate_expressed_as_percent_rejected() {
    // 8.5 is a percentage, not a fraction
    let err = compute_schedule(dec!(100_000), dec!(8.5), 12, 0).unwrap_err();
    match err {
        LoanError::InvalidLoanTerms { field, .. } => assert_eq!(field, "annual_rate"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_repeat_calls_identical() {
    let a = compute_schedule(dec!(2_345_678.90), dec!(0.0675), 60, 18).unwrap();
    let b = compute_schedule(dec!(2_345_678.90), dec!(0.0675), 60, 18).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_large_balance_over_very_long_term() {
    // Growth factor fits in a Decimal, balance times factor does not
    for (rate, term) in [(dec!(0.20), 3100u32), (dec!(0.9999), 620)] {
        let principal = dec!(1_000_000_000);
        let rows = compute_schedule(principal, rate, term, 0).unwrap();
        assert_eq!(rows.len(), term as usize);
        assert_eq!(rows[term as usize - 1].balance, Decimal::ZERO);
        assert!((principal_sum(&rows) - principal).abs() <= TOLERANCE);
    }
}

// ===========================================================================
// Schedule properties
// ===========================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_schedule_invariants(
        principal_cents in 0i64..1_000_000_000,
        rate_bp in 0i64..9_999,
        term in 1u32..=360,
        io_raw in 0u32..=360,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let rate = Decimal::new(rate_bp, 4);
        let io = io_raw % (term + 1);

        let rows = compute_schedule(principal, rate, term, io).unwrap();

        // Length and ordering
        prop_assert_eq!(rows.len(), term as usize);
        for (i, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.month, i as u32 + 1);
        }

        // Interest-only rows
        for row in rows.iter().take(io as usize) {
            prop_assert_eq!(row.principal, Decimal::ZERO);
            prop_assert_eq!(row.payment, row.interest);
        }

        // Balance never rises
        let mut previous = principal;
        for row in &rows {
            prop_assert!(row.balance <= previous);
            prop_assert!(row.principal >= Decimal::ZERO);
            previous = row.balance;
        }

        if io < term {
            prop_assert!(rows[term as usize - 1].balance.abs() <= TOLERANCE);
            prop_assert!((principal_sum(&rows) - principal).abs() <= TOLERANCE);
        } else {
            prop_assert_eq!(rows[term as usize - 1].balance, principal);
        }
    }

    #[test]
    fn prop_zero_rate_is_straight_line(
        principal_cents in 1i64..100_000_000,
        term in 1u32..=120,
        io_raw in 0u32..=120,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let io = io_raw % term;
        let amortizing = Decimal::from(term - io);
        let per_month = principal / amortizing;

        let rows = compute_schedule(principal, Decimal::ZERO, term, io).unwrap();
        for row in &rows {
            prop_assert_eq!(row.interest, Decimal::ZERO);
        }
        for row in rows.iter().skip(io as usize) {
            prop_assert!((row.principal - per_month).abs() <= TOLERANCE);
        }
        prop_assert_eq!(rows[term as usize - 1].balance, Decimal::ZERO);
    }

    #[test]
    fn prop_rounded_schedule_conserves_principal(
        principal_cents in 0i64..1_000_000_000,
        rate_bp in 0i64..2_500,
        term in 1u32..=240,
        io_raw in 0u32..=240,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let mut input = AmortizationInput::new(principal, Decimal::new(rate_bp, 4), term, io_raw % term);
        input.round_to_cents = true;

        let out = build_amortization(&input).unwrap();
        prop_assert_eq!(out.result.summary.total_principal, principal);
        prop_assert_eq!(out.result.ending_balance, Decimal::ZERO);
    }
}
