use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AffordabilityBreakdown, CalculationError, CalculationRequest, DEFAULT_AMORTIZATION_YEARS,
    DEFAULT_DOWNPAYMENT_PERCENTAGE, DEFAULT_MAX_SEARCH_STEPS, DEFAULT_PAYMENT_FREQUENCY,
    DEFAULT_PRECISION, DEFAULT_TARGET_GDS, compute_breakdown,
};

const NO_RESULT_PREFIX: &str = "cannot compute affordability with the given inputs";

#[derive(Parser, Debug)]
#[command(
    name = "afford",
    about = "Maximum affordable property value for a target gross debt service ratio",
    after_help = "Run `afford serve [port]` to start the HTTP API instead."
)]
pub struct Cli {
    #[arg(long, help = "Annual interest rate as a ratio, e.g. 0.05 for 5%")]
    interest_rate: f64,
    #[arg(long, help = "Annual property tax as a ratio of property value, e.g. 0.01")]
    property_tax_percentage: f64,
    #[arg(long, help = "Gross annual income")]
    total_income: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_TARGET_GDS,
        help = "Target share of monthly income spent on housing"
    )]
    target: f64,
    #[arg(long, default_value_t = DEFAULT_DOWNPAYMENT_PERCENTAGE)]
    downpayment_percentage: f64,
    #[arg(long, default_value_t = DEFAULT_AMORTIZATION_YEARS, help = "Amortization period in years")]
    amortization_period: f64,
    #[arg(long, default_value_t = DEFAULT_PAYMENT_FREQUENCY, help = "Payments per year")]
    payment_frequency: u32,
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        help = "Qualify at the stress-test rate"
    )]
    stress_tested: bool,
    #[arg(
        long,
        default_value_t = DEFAULT_PRECISION,
        help = "Step between candidate property values"
    )]
    precision: f64,
    #[arg(long, default_value_t = DEFAULT_MAX_SEARCH_STEPS)]
    max_search_steps: u64,
    #[arg(long, help = "Print the qualifying candidate's costs as JSON")]
    breakdown: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AffordabilityPayload {
    target: Option<f64>,
    downpayment_percentage: Option<f64>,
    amortization_period: Option<f64>,
    payment_frequency: Option<u32>,
    is_stress_tested: Option<bool>,
    precision: Option<f64>,
    interest_rate: Option<f64>,
    property_tax_percentage: Option<f64>,
    total_income: Option<f64>,
    max_search_steps: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AffordabilityResponse {
    property_value: f64,
    breakdown: AffordabilityBreakdown,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_request(cli: &Cli) -> CalculationRequest {
    CalculationRequest {
        target: cli.target,
        downpayment_percentage: cli.downpayment_percentage,
        amortization_period: cli.amortization_period,
        payment_frequency: cli.payment_frequency,
        is_stress_tested: cli.stress_tested,
        precision: cli.precision,
        interest_rate: Some(cli.interest_rate),
        property_tax_percentage: Some(cli.property_tax_percentage),
        total_income: Some(cli.total_income),
        max_search_steps: cli.max_search_steps,
    }
}

pub fn run_cli(cli: &Cli) -> Result<(), String> {
    let output = render_cli_output(cli)?;
    println!("{output}");
    Ok(())
}

fn render_cli_output(cli: &Cli) -> Result<String, String> {
    let breakdown = compute_breakdown(&build_request(cli)).map_err(no_result_message)?;
    if cli.breakdown {
        serde_json::to_string_pretty(&breakdown)
            .map_err(|e| format!("failed to serialize breakdown: {e}"))
    } else {
        Ok(format_property_value(breakdown.property_value))
    }
}

fn format_property_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn no_result_message(err: CalculationError) -> String {
    format!("{NO_RESULT_PREFIX}: {err}")
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/affordability",
            get(affordability_get_handler).post(affordability_post_handler),
        )
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "affordability HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/affordability");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn affordability_get_handler(
    payload: Result<Query<AffordabilityPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => affordability_handler_impl(payload).await,
        Err(rejection) => bad_payload_response(&rejection.body_text()),
    }
}

async fn affordability_post_handler(
    payload: Result<Json<AffordabilityPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => affordability_handler_impl(payload).await,
        Err(rejection) => bad_payload_response(&rejection.body_text()),
    }
}

fn bad_payload_response(detail: &str) -> Response {
    warn!(detail, "malformed affordability payload");
    error_response(
        StatusCode::BAD_REQUEST,
        &format!("Invalid API payload: {detail}"),
    )
}

async fn affordability_handler_impl(payload: AffordabilityPayload) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    match compute_breakdown(&request) {
        Ok(breakdown) => json_response(
            StatusCode::OK,
            AffordabilityResponse {
                property_value: breakdown.property_value,
                breakdown,
            },
        ),
        Err(err) => {
            if err.is_invalid_input() {
                warn!(error = %err, "rejected affordability request");
            } else {
                warn!(error = %err, "affordability search exhausted its step budget");
            }
            error_response(StatusCode::BAD_REQUEST, &no_result_message(err))
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<CalculationRequest, String> {
    let payload = serde_json::from_str::<AffordabilityPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    request_from_payload(payload)
}

fn request_from_payload(payload: AffordabilityPayload) -> Result<CalculationRequest, String> {
    let mut request = CalculationRequest::default();

    if let Some(v) = payload.target {
        request.target = v;
    }
    if let Some(v) = payload.downpayment_percentage {
        request.downpayment_percentage = v;
    }
    if let Some(v) = payload.amortization_period {
        request.amortization_period = v;
    }
    if let Some(v) = payload.payment_frequency {
        request.payment_frequency = v;
    }
    if let Some(v) = payload.is_stress_tested {
        request.is_stress_tested = v;
    }
    if let Some(v) = payload.precision {
        request.precision = v;
    }
    if let Some(v) = payload.max_search_steps {
        if v > DEFAULT_MAX_SEARCH_STEPS {
            return Err(format!(
                "maxSearchSteps must be <= {DEFAULT_MAX_SEARCH_STEPS}, got {v}"
            ));
        }
        request.max_search_steps = v;
    }

    request.interest_rate = payload.interest_rate;
    request.property_tax_percentage = payload.property_tax_percentage;
    request.total_income = payload.total_income;

    Ok(request)
}
