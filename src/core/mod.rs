mod engine;
mod error;
mod solver;
mod types;

pub use engine::{
    STRESS_BENCHMARK_RATE, STRESS_RATE_BUFFER, monthly_periodic_rate, mortgage_insurance_rate,
    periodic_payment, qualifying_rate,
};
pub use error::CalculationError;
pub use solver::{affordable_property_value, compute, compute_breakdown};
pub use types::{
    AffordabilityBreakdown, CalculationRequest, DEFAULT_AMORTIZATION_YEARS,
    DEFAULT_DOWNPAYMENT_PERCENTAGE, DEFAULT_MAX_SEARCH_STEPS, DEFAULT_PAYMENT_FREQUENCY,
    DEFAULT_PRECISION, DEFAULT_TARGET_GDS, MAX_AMORTIZATION_YEARS, MAX_INPUT_VALUE,
    MAX_PAYMENT_FREQUENCY,
};
