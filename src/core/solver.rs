use tracing::debug;

use super::engine::{CandidateCost, LoanTerms, evaluate_candidate};
use super::error::{CalculationError, Result};
use super::types::{
    AffordabilityBreakdown, CalculationRequest, MAX_AMORTIZATION_YEARS, MAX_INPUT_VALUE,
    MAX_PAYMENT_FREQUENCY,
};

/// Request fields after validation, with the required values unwrapped.
#[derive(Debug, Clone, Copy)]
struct ValidatedRequest {
    target: f64,
    precision: f64,
    max_search_steps: u64,
    total_income: f64,
    terms: LoanTerms,
}

/// Largest property value, in steps of `precision`, whose housing costs reach
/// the target share of income. `None` when the request is invalid or the
/// search gives up.
pub fn affordable_property_value(request: &CalculationRequest) -> Option<f64> {
    compute(request).ok()
}

pub fn compute(request: &CalculationRequest) -> Result<f64> {
    compute_breakdown(request).map(|breakdown| breakdown.property_value)
}

pub fn compute_breakdown(request: &CalculationRequest) -> Result<AffordabilityBreakdown> {
    let validated = validate_request(request)?;

    if validated.total_income == 0.0 {
        debug!("zero income, skipping search");
        return Ok(empty_breakdown(&validated.terms));
    }

    let breakdown = search_affordable_value(&validated)?;
    debug!(
        property_value = breakdown.property_value,
        gds_ratio = breakdown.gds_ratio,
        steps = breakdown.search_steps,
        "affordability search finished"
    );
    Ok(breakdown)
}

fn search_affordable_value(request: &ValidatedRequest) -> Result<AffordabilityBreakdown> {
    let mut property_value = 0.0;
    let mut gds_ratio = 0.0;
    let mut last_cost = None;
    let mut steps = 0u64;

    // A non-finite ratio fails the comparison and ends the search.
    while gds_ratio < request.target {
        if steps == request.max_search_steps {
            return Err(CalculationError::SearchLimitExceeded {
                max_steps: request.max_search_steps,
            });
        }
        steps += 1;
        property_value += request.precision;
        let cost = evaluate_candidate(&request.terms, property_value);
        gds_ratio = cost.gds_ratio;
        last_cost = Some(cost);
    }

    Ok(match last_cost {
        Some(cost) => breakdown_from_cost(&request.terms, property_value, cost, steps),
        None => empty_breakdown(&request.terms),
    })
}

fn breakdown_from_cost(
    terms: &LoanTerms,
    property_value: f64,
    cost: CandidateCost,
    search_steps: u64,
) -> AffordabilityBreakdown {
    AffordabilityBreakdown {
        property_value,
        downpayment: cost.downpayment,
        loan_amount: cost.loan_amount,
        mortgage_insurance_premium: cost.insurance_premium,
        mortgage_principal: cost.mortgage_principal,
        qualifying_rate: terms.qualifying_rate,
        monthly_periodic_rate: terms.monthly_rate,
        mortgage_payment: cost.mortgage_payment,
        monthly_property_tax: cost.monthly_property_tax,
        gds_ratio: cost.gds_ratio,
        search_steps,
    }
}

fn empty_breakdown(terms: &LoanTerms) -> AffordabilityBreakdown {
    AffordabilityBreakdown {
        property_value: 0.0,
        downpayment: 0.0,
        loan_amount: 0.0,
        mortgage_insurance_premium: 0.0,
        mortgage_principal: 0.0,
        qualifying_rate: terms.qualifying_rate,
        monthly_periodic_rate: terms.monthly_rate,
        mortgage_payment: 0.0,
        monthly_property_tax: 0.0,
        gds_ratio: 0.0,
        search_steps: 0,
    }
}

fn validate_request(request: &CalculationRequest) -> Result<ValidatedRequest> {
    if !(0.0..=1.0).contains(&request.target) {
        return Err(CalculationError::invalid(
            "target",
            format!("must be between 0 and 1, got {}", request.target),
        ));
    }
    if !(0.0..=1.0).contains(&request.downpayment_percentage) {
        return Err(CalculationError::invalid(
            "downpayment_percentage",
            format!(
                "must be between 0 and 1, got {}",
                request.downpayment_percentage
            ),
        ));
    }
    if !(0.0..MAX_AMORTIZATION_YEARS).contains(&request.amortization_period) {
        return Err(CalculationError::invalid(
            "amortization_period",
            format!(
                "must be >= 0 and < {MAX_AMORTIZATION_YEARS}, got {}",
                request.amortization_period
            ),
        ));
    }
    if request.payment_frequency > MAX_PAYMENT_FREQUENCY {
        return Err(CalculationError::invalid(
            "payment_frequency",
            format!(
                "must be between 0 and {MAX_PAYMENT_FREQUENCY}, got {}",
                request.payment_frequency
            ),
        ));
    }
    if !request.precision.is_finite() || request.precision <= 0.0 {
        return Err(CalculationError::invalid(
            "precision",
            format!("must be finite and > 0, got {}", request.precision),
        ));
    }
    let interest_rate = bounded_required("interest_rate", request.interest_rate)?;
    let property_tax_percentage =
        bounded_required("property_tax_percentage", request.property_tax_percentage)?;

    let Some(total_income) = request.total_income else {
        return Err(CalculationError::invalid("total_income", "is required"));
    };
    if total_income.is_nan() || total_income >= MAX_INPUT_VALUE {
        return Err(CalculationError::invalid(
            "total_income",
            format!("must be < {MAX_INPUT_VALUE}, got {total_income}"),
        ));
    }

    if request.max_search_steps == 0 {
        return Err(CalculationError::invalid("max_search_steps", "must be > 0"));
    }

    Ok(ValidatedRequest {
        target: request.target,
        precision: request.precision,
        max_search_steps: request.max_search_steps,
        total_income,
        terms: LoanTerms::new(
            request.downpayment_percentage,
            interest_rate,
            request.is_stress_tested,
            request.amortization_period,
            request.payment_frequency,
            property_tax_percentage,
            total_income,
        ),
    })
}

fn bounded_required(field: &'static str, value: Option<f64>) -> Result<f64> {
    let Some(value) = value else {
        return Err(CalculationError::invalid(field, "is required"));
    };
    if !(0.0..MAX_INPUT_VALUE).contains(&value) {
        return Err(CalculationError::invalid(
            field,
            format!("must be >= 0 and < {MAX_INPUT_VALUE}, got {value}"),
        ));
    }
    Ok(value)
}
