use serde::Serialize;

/// Largest value accepted for unbounded numeric inputs (2^53 - 1).
pub const MAX_INPUT_VALUE: f64 = 9_007_199_254_740_991.0;

pub const DEFAULT_TARGET_GDS: f64 = 0.32;
pub const DEFAULT_DOWNPAYMENT_PERCENTAGE: f64 = 0.20;
pub const DEFAULT_AMORTIZATION_YEARS: f64 = 25.0;
pub const DEFAULT_PAYMENT_FREQUENCY: u32 = 12;
pub const DEFAULT_PRECISION: f64 = 1_000.0;
pub const DEFAULT_MAX_SEARCH_STEPS: u64 = 10_000_000;

pub const MAX_AMORTIZATION_YEARS: f64 = 100.0;
pub const MAX_PAYMENT_FREQUENCY: u32 = 12;

/// Inputs for a single affordability calculation.
///
/// Ratios are fractions (0.05 is 5%). The three `Option` fields are required:
/// leaving any of them as `None` makes the request invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    /// Target gross debt service ratio, in `[0, 1]`.
    pub target: f64,
    /// Share of the property value paid up front, in `[0, 1]`.
    pub downpayment_percentage: f64,
    /// Years to repay the loan, in `[0, 100)`.
    pub amortization_period: f64,
    /// Payments per year, in `[0, 12]`.
    pub payment_frequency: u32,
    pub is_stress_tested: bool,
    /// Step between candidate property values; also the rounding unit of the result.
    pub precision: f64,
    /// Nominal annual rate, compounded semi-annually.
    pub interest_rate: Option<f64>,
    /// Annual property tax as a share of property value.
    pub property_tax_percentage: Option<f64>,
    /// Gross annual income.
    pub total_income: Option<f64>,
    /// Upper bound on candidate values tried before giving up.
    pub max_search_steps: u64,
}

impl Default for CalculationRequest {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_GDS,
            downpayment_percentage: DEFAULT_DOWNPAYMENT_PERCENTAGE,
            amortization_period: DEFAULT_AMORTIZATION_YEARS,
            payment_frequency: DEFAULT_PAYMENT_FREQUENCY,
            is_stress_tested: true,
            precision: DEFAULT_PRECISION,
            interest_rate: None,
            property_tax_percentage: None,
            total_income: None,
            max_search_steps: DEFAULT_MAX_SEARCH_STEPS,
        }
    }
}

impl CalculationRequest {
    pub fn new(interest_rate: f64, property_tax_percentage: f64, total_income: f64) -> Self {
        Self {
            interest_rate: Some(interest_rate),
            property_tax_percentage: Some(property_tax_percentage),
            total_income: Some(total_income),
            ..Self::default()
        }
    }
}

/// Housing costs of the first candidate that reached the target ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityBreakdown {
    pub property_value: f64,
    pub downpayment: f64,
    pub loan_amount: f64,
    pub mortgage_insurance_premium: f64,
    pub mortgage_principal: f64,
    pub qualifying_rate: f64,
    pub monthly_periodic_rate: f64,
    pub mortgage_payment: f64,
    pub monthly_property_tax: f64,
    pub gds_ratio: f64,
    pub search_steps: u64,
}
