/// Fixed qualifying benchmark used by the stress test.
pub const STRESS_BENCHMARK_RATE: f64 = 0.0525;
/// Added to the contract rate when it sits below the benchmark.
pub const STRESS_RATE_BUFFER: f64 = 0.02;

/// `(downpayment ratio upper bound, premium rate)`, checked in order.
/// A downpayment at or above the last bound is uninsured.
const MORTGAGE_INSURANCE_TIERS: [(f64, f64); 3] = [(0.10, 0.04), (0.15, 0.031), (0.20, 0.028)];

/// Rate the borrower has to qualify at.
///
/// Below the benchmark the buffer is added; at or above it the benchmark
/// replaces the contract rate, even when that lowers it.
pub fn qualifying_rate(contract_rate: f64, is_stress_tested: bool) -> f64 {
    if !is_stress_tested {
        return contract_rate;
    }
    if contract_rate < STRESS_BENCHMARK_RATE {
        contract_rate + STRESS_RATE_BUFFER
    } else {
        STRESS_BENCHMARK_RATE
    }
}

/// Premium rate charged on the loan amount, `None` when no insurance applies.
pub fn mortgage_insurance_rate(downpayment_percentage: f64) -> Option<f64> {
    MORTGAGE_INSURANCE_TIERS
        .iter()
        .find(|(upper, _)| downpayment_percentage < *upper)
        .map(|(_, rate)| *rate)
}

/// Converts a nominal annual rate compounded semi-annually into the
/// equivalent monthly periodic rate.
pub fn monthly_periodic_rate(annual_rate: f64) -> f64 {
    let effective_annual_rate = (1.0 + annual_rate / 2.0).powf(2.0) - 1.0;
    (1.0 + effective_annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Level payment that amortizes `principal` over `amortization_years * payments_per_year`
/// periods. Zero periods give a zero denominator, so the result is infinite
/// (or NaN when the rate is also zero); callers rely on that.
pub fn periodic_payment(
    periodic_rate: f64,
    principal: f64,
    amortization_years: f64,
    payments_per_year: u32,
) -> f64 {
    let exponent = -amortization_years * f64::from(payments_per_year);
    (periodic_rate * principal) / (1.0 - (1.0 + periodic_rate).powf(exponent))
}

/// Everything about a request that stays fixed while the search moves the
/// property value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LoanTerms {
    pub(crate) downpayment_percentage: f64,
    pub(crate) insurance_rate: Option<f64>,
    pub(crate) qualifying_rate: f64,
    pub(crate) monthly_rate: f64,
    pub(crate) amortization_years: f64,
    pub(crate) payments_per_year: u32,
    pub(crate) property_tax_percentage: f64,
    pub(crate) monthly_income: f64,
}

impl LoanTerms {
    pub(crate) fn new(
        downpayment_percentage: f64,
        contract_rate: f64,
        is_stress_tested: bool,
        amortization_years: f64,
        payments_per_year: u32,
        property_tax_percentage: f64,
        total_income: f64,
    ) -> Self {
        let qualifying_rate = qualifying_rate(contract_rate, is_stress_tested);
        Self {
            downpayment_percentage,
            insurance_rate: mortgage_insurance_rate(downpayment_percentage),
            qualifying_rate,
            monthly_rate: monthly_periodic_rate(qualifying_rate),
            amortization_years,
            payments_per_year,
            property_tax_percentage,
            monthly_income: total_income / 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CandidateCost {
    pub(crate) downpayment: f64,
    pub(crate) loan_amount: f64,
    pub(crate) insurance_premium: f64,
    pub(crate) mortgage_principal: f64,
    pub(crate) mortgage_payment: f64,
    pub(crate) monthly_property_tax: f64,
    pub(crate) gds_ratio: f64,
}

pub(crate) fn evaluate_candidate(terms: &LoanTerms, property_value: f64) -> CandidateCost {
    let downpayment = property_value * terms.downpayment_percentage;
    let loan_amount = property_value - downpayment;
    let insurance_premium = terms.insurance_rate.map_or(0.0, |rate| loan_amount * rate);
    let mortgage_principal = loan_amount + insurance_premium;

    let mortgage_payment = periodic_payment(
        terms.monthly_rate,
        mortgage_principal,
        terms.amortization_years,
        terms.payments_per_year,
    );
    let monthly_property_tax = (property_value * terms.property_tax_percentage) / 12.0;
    let gds_ratio = (mortgage_payment + monthly_property_tax) / terms.monthly_income;

    CandidateCost {
        downpayment,
        loan_amount,
        insurance_premium,
        mortgage_principal,
        mortgage_payment,
        monthly_property_tax,
        gds_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_terms() -> LoanTerms {
        LoanTerms::new(0.20, 0.03, true, 25.0, 12, 0.01, 60_000.0)
    }

    #[test]
    fn stress_test_adds_buffer_below_benchmark() {
        assert_approx(qualifying_rate(0.03, true), 0.05);
        assert_approx(qualifying_rate(0.0, true), 0.02);
        assert_approx(qualifying_rate(0.04, true), 0.06);
    }

    #[test]
    fn stress_test_uses_benchmark_at_or_above_it() {
        assert_approx(qualifying_rate(0.0525, true), STRESS_BENCHMARK_RATE);
        assert_approx(qualifying_rate(0.08, true), STRESS_BENCHMARK_RATE);
        assert_approx(qualifying_rate(1.0, true), STRESS_BENCHMARK_RATE);
    }

    #[test]
    fn unstressed_rate_is_contract_rate() {
        assert_eq!(qualifying_rate(0.08, false), 0.08);
        assert_eq!(qualifying_rate(0.0, false), 0.0);
    }

    #[test]
    fn insurance_tiers_follow_downpayment_bounds() {
        assert_eq!(mortgage_insurance_rate(0.0), Some(0.04));
        assert_eq!(mortgage_insurance_rate(0.0999), Some(0.04));
        assert_eq!(mortgage_insurance_rate(0.10), Some(0.031));
        assert_eq!(mortgage_insurance_rate(0.1499), Some(0.031));
        assert_eq!(mortgage_insurance_rate(0.15), Some(0.028));
        assert_eq!(mortgage_insurance_rate(0.1999), Some(0.028));
        assert_eq!(mortgage_insurance_rate(0.20), None);
        assert_eq!(mortgage_insurance_rate(1.0), None);
    }

    #[test]
    fn monthly_rate_converts_semi_annual_compounding() {
        assert_approx(monthly_periodic_rate(0.05), 0.004_123_915_465_144_234);
        assert_approx(monthly_periodic_rate(0.03), 0.002_484_516_724_648_777);
        assert_eq!(monthly_periodic_rate(0.0), 0.0);
    }

    #[test]
    fn periodic_payment_matches_annuity_formula() {
        let rate = monthly_periodic_rate(0.05);
        let payment = periodic_payment(rate, 240_000.0, 25.0, 12);
        assert!(
            (payment - 1_395.851_964_088_837).abs() <= 1e-6,
            "got {payment}"
        );
    }

    #[test]
    fn zero_periods_give_non_finite_payment() {
        let rate = monthly_periodic_rate(0.05);
        assert!(periodic_payment(rate, 100_000.0, 0.0, 12).is_infinite());
        assert!(periodic_payment(rate, 100_000.0, 25.0, 0).is_infinite());
        assert!(periodic_payment(0.0, 100_000.0, 25.0, 12).is_nan());
    }

    #[test]
    fn candidate_without_insurance_borrows_the_remainder() {
        let cost = evaluate_candidate(&sample_terms(), 300_000.0);
        assert_approx(cost.downpayment, 60_000.0);
        assert_approx(cost.loan_amount, 240_000.0);
        assert_eq!(cost.insurance_premium, 0.0);
        assert_approx(cost.mortgage_principal, 240_000.0);
        assert_approx(cost.monthly_property_tax, 250.0);
        assert_approx(
            cost.gds_ratio,
            (cost.mortgage_payment + cost.monthly_property_tax) / 5_000.0,
        );
    }

    #[test]
    fn candidate_with_small_downpayment_is_insured() {
        let terms = LoanTerms::new(0.05, 0.03, true, 25.0, 12, 0.01, 60_000.0);
        let cost = evaluate_candidate(&terms, 200_000.0);
        assert_approx(cost.loan_amount, 190_000.0);
        assert_approx(cost.insurance_premium, 7_600.0);
        assert_approx(cost.mortgage_principal, 197_600.0);
    }

    #[test]
    fn terms_capture_monthly_income_and_stressed_rate() {
        let terms = sample_terms();
        assert_approx(terms.monthly_income, 5_000.0);
        assert_approx(terms.qualifying_rate, 0.05);
        assert_approx(terms.monthly_rate, monthly_periodic_rate(0.05));
        assert_eq!(terms.insurance_rate, None);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_gds_grows_with_property_value(
            value_steps in 1u32..2_000,
            extra_steps in 1u32..200,
            downpayment_bp in 0u32..10_001,
            rate_bp in 0u32..2_000,
            tax_bp in 0u32..500,
            income in 1_000u32..500_000,
        ) {
            let terms = LoanTerms::new(
                downpayment_bp as f64 / 10_000.0,
                rate_bp as f64 / 10_000.0,
                true,
                25.0,
                12,
                tax_bp as f64 / 10_000.0,
                income as f64,
            );
            let lower = evaluate_candidate(&terms, value_steps as f64 * 1_000.0);
            let higher = evaluate_candidate(&terms, (value_steps + extra_steps) as f64 * 1_000.0);
            prop_assert!(lower.gds_ratio.is_finite());
            prop_assert!(higher.gds_ratio >= lower.gds_ratio);
        }

        #[test]
        fn prop_stressed_rate_never_below_buffered_floor(rate_bp in 0u32..10_000) {
            let rate = rate_bp as f64 / 10_000.0;
            let stressed = qualifying_rate(rate, true);
            prop_assert!(stressed >= STRESS_RATE_BUFFER);
            prop_assert!(stressed <= STRESS_BENCHMARK_RATE + STRESS_RATE_BUFFER);
        }
    }
}
