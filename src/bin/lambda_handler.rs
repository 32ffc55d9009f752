//! AWS Lambda handler for running what-if scenarios
//!
//! Accepts a single scenario or a batch of scenarios as JSON and returns the
//! projected trajectories with their summaries.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use std::time::Instant;

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use finance_projection::primitives::IrrOptions;
use finance_projection::{EngineConfig, Scenario, ScenarioOutcome, ScenarioRunner};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Request body: either one scenario or a list of them with optional engine settings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProjectionRequest {
    Batch {
        scenarios: Vec<Scenario>,
        #[serde(default)]
        config: Option<EngineConfig>,
    },
    Single(Scenario),
}

/// Per-scenario response entry
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScenarioResponse {
    Ok(ScenarioOutcome),
    Failed { name: String, error: String },
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub scenario_count: usize,
    pub failed_count: usize,
    pub results: Vec<ScenarioResponse>,
    pub execution_time_ms: u64,
}

fn json_response(status: u16, body: &impl Serialize) -> Value {
    json!({
        "statusCode": status,
        "headers": { "Content-Type": "application/json" },
        "body": serde_json::to_string(body).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e)),
    })
}

fn error_response(status: u16, message: &str) -> Value {
    json_response(status, &json!({ "error": message }))
}

/// Keep caller-supplied limits within the engine defaults
fn bounded_config(config: EngineConfig) -> EngineConfig {
    let defaults = EngineConfig::default();
    EngineConfig {
        max_periods: config.max_periods.min(defaults.max_periods),
        max_years: config.max_years.min(defaults.max_years),
        irr: IrrOptions {
            max_iterations: config.irr.max_iterations.min(defaults.irr.max_iterations),
            ..config.irr
        },
        ..config
    }
}

/// Turn a Function URL request body into an HTTP-shaped JSON response
fn respond(body: Option<&str>, is_base64_encoded: bool, start: Instant) -> Value {
    if is_base64_encoded {
        return error_response(400, "base64-encoded bodies are not supported");
    }
    let body = match body {
        Some(body) if !body.trim().is_empty() => body,
        _ => return error_response(400, "request body is required"),
    };

    let parsed: ProjectionRequest = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("rejecting malformed request: {}", e);
            return error_response(400, &format!("invalid request: {}", e));
        }
    };

    match parsed {
        ProjectionRequest::Single(scenario) => match ScenarioRunner::new().run(&scenario) {
            Ok(outcome) => json_response(200, &outcome),
            Err(e) => error_response(400, &e.to_string()),
        },
        ProjectionRequest::Batch { scenarios, config } => {
            let runner = ScenarioRunner::with_config(bounded_config(config.unwrap_or_default()));
            let results: Vec<ScenarioResponse> = scenarios
                .iter()
                .zip(runner.run_batch(&scenarios))
                .map(|(scenario, result)| match result {
                    Ok(outcome) => ScenarioResponse::Ok(outcome),
                    Err(e) => ScenarioResponse::Failed {
                        name: scenario.display_name(),
                        error: e.to_string(),
                    },
                })
                .collect();

            let failed_count = results
                .iter()
                .filter(|r| matches!(r, ScenarioResponse::Failed { .. }))
                .count();
            log::info!("ran {} scenarios ({} failed)", results.len(), failed_count);

            let response = BatchResponse {
                scenario_count: results.len(),
                failed_count,
                results,
                execution_time_ms: start.elapsed().as_millis() as u64,
            };
            json_response(200, &response)
        }
    }
}

async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<Value, Error> {
    let start = Instant::now();
    let request = event.payload;
    Ok(respond(request.body.as_deref(), request.is_base64_encoded, start))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
