//! Net present value and Internal Rate of Return (IRR)
//!
//! Cash flows are indexed by period, starting at period 0 (undiscounted).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Tuning knobs for the Newton-Raphson IRR solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrOptions {
    /// Starting rate for the iteration
    pub guess: f64,
    pub max_iterations: u32,
    /// Converged once successive rates differ by less than this
    pub tolerance: f64,
}

impl Default for IrrOptions {
    fn default() -> Self {
        Self {
            guess: 0.1,
            max_iterations: 1000,
            tolerance: 1e-7,
        }
    }
}

/// Net present value of `cash_flows` discounted at `rate` per period
pub fn npv(rate: f64, cash_flows: &[f64]) -> Result<f64> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(ProjectionError::InvalidRate {
            rate,
            reason: "discount rate must be finite and greater than -100%",
        });
    }

    Ok(cash_flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum())
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cash_flows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

/// Periodic IRR of `cash_flows` (negative = outflow, positive = inflow)
///
/// Newton-Raphson on `npv(rate) = 0`. With several sign changes the series can have
/// more than one root; the solver returns whichever one the iteration reaches from
/// `options.guess`.
pub fn irr(cash_flows: &[f64], options: &IrrOptions) -> Result<f64> {
    if cash_flows.is_empty() {
        return Err(ProjectionError::InvalidInput(
            "IRR needs at least one cash flow".to_string(),
        ));
    }
    if cash_flows.iter().any(|cf| !cf.is_finite()) {
        return Err(ProjectionError::InvalidInput(
            "cash flows must be finite".to_string(),
        ));
    }

    let mut rate = options.guess;

    for iteration in 0..options.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cash_flows, rate);

        // Flat NPV curve: Newton step undefined
        if dnpv == 0.0 || !dnpv.is_finite() {
            debug!("IRR derivative vanished at rate {} (iteration {})", rate, iteration);
            return Err(ProjectionError::NoConvergence {
                iterations: iteration,
                last_rate: rate,
            });
        }

        let new_rate = rate - npv / dnpv;
        if !new_rate.is_finite() {
            return Err(ProjectionError::NoConvergence {
                iterations: iteration + 1,
                last_rate: rate,
            });
        }

        if (new_rate - rate).abs() < options.tolerance {
            debug!("IRR converged to {} after {} iterations", new_rate, iteration + 1);
            return Ok(new_rate);
        }

        rate = new_rate;
    }

    Err(ProjectionError::NoConvergence {
        iterations: options.max_iterations,
        last_rate: rate,
    })
}

/// [`irr`] with the default guess (10%), iteration limit and tolerance
pub fn irr_default(cash_flows: &[f64]) -> Result<f64> {
    irr(cash_flows, &IrrOptions::default())
}
