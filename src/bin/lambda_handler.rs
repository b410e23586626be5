//! AWS Lambda handler for running agency plans
//!
//! Accepts a JSON parameter bundle (missing fields take defaults) and returns
//! the three-scenario plan with benchmarks.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use agency_planner::{plan, PlanResult, SimulationParameters};
use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use aws_lambda_events::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub generated_at: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub parameters: SimulationParameters,
    pub plan: PlanResult,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Content-Type", HeaderValue::from_static("application/json"));
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert("Access-Control-Allow-Methods", HeaderValue::from_static("POST, OPTIONS"));
    headers.insert("Access-Control-Allow-Headers", HeaderValue::from_static("Content-Type"));
    headers
}

fn response(status: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    LambdaFunctionUrlResponse {
        status_code: status,
        headers: cors_headers(),
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status: i64, message: &str) -> Result<LambdaFunctionUrlResponse, Error> {
    let body = serde_json::to_string(&ErrorBody { error: message })?;
    Ok(response(status, Some(body)))
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    // CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(response(200, None));
    }

    if request.is_base64_encoded {
        return error_response(400, "base64-encoded bodies are not supported");
    }

    let body = request.body.unwrap_or_else(|| "{}".to_string());
    let params: SimulationParameters = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let result = match plan(&params) {
        Ok(result) => result,
        Err(e) => {
            warn!("rejected parameters: {}", e);
            return error_response(422, &e.to_string());
        }
    };

    let execution_time_ms = start.elapsed().as_millis() as u64;
    info!(
        "planned {} months in {}ms, rule of 20 score {:.1}",
        params.projection_months, execution_time_ms, result.benchmarks.rule_of_20_score
    );

    let payload = PlanResponse {
        generated_at: Utc::now(),
        execution_time_ms,
        parameters: params,
        plan: result,
    };
    Ok(response(200, Some(serde_json::to_string(&payload)?)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
