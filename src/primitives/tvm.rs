//! Closed-form time-value-of-money formulas
//!
//! Rates are annual decimals (0.07 for 7%). `periods` is expressed in years and is
//! multiplied by the compounding frequency to get the number of compounding steps.

use crate::error::{check_periodic_rate, ProjectionError, Result, ZERO_RATE_EPSILON};

/// Default compounding frequency for single-sum future/present value
pub const DEFAULT_LUMP_SUM_COMPOUNDING: u32 = 1;

/// Default compounding frequency for annuities and loan payoff (monthly)
pub const DEFAULT_ANNUITY_COMPOUNDING: u32 = 12;

/// Split an annual rate into (periodic rate, total periods) after validating both
fn periodic_terms(rate: f64, periods: f64, compounding_per_year: u32) -> Result<(f64, f64)> {
    if compounding_per_year == 0 {
        return Err(ProjectionError::InvalidRate {
            rate,
            reason: "compounding frequency must be at least 1",
        });
    }
    if !periods.is_finite() || periods < 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "periods must be a finite non-negative number, got {}",
            periods
        )));
    }

    let m = compounding_per_year as f64;
    let periodic_rate = rate / m;
    check_periodic_rate(rate, periodic_rate)?;

    Ok((periodic_rate, periods * m))
}

/// FV = PV * (1 + r/m)^(n*m)
pub fn future_value(present_value: f64, rate: f64, periods: f64, compounding_per_year: u32) -> Result<f64> {
    let (r, n) = periodic_terms(rate, periods, compounding_per_year)?;
    Ok(present_value * (1.0 + r).powf(n))
}

/// PV = FV / (1 + r/m)^(n*m)
pub fn present_value(future_value: f64, rate: f64, periods: f64, compounding_per_year: u32) -> Result<f64> {
    let (r, n) = periodic_terms(rate, periods, compounding_per_year)?;
    Ok(future_value / (1.0 + r).powf(n))
}

/// Future value of a level payment made at the end of each period
///
/// `payment * ((1 + r)^n - 1) / r`, or `payment * n` when the periodic rate is zero.
pub fn annuity_future_value(payment: f64, rate: f64, periods: f64, compounding_per_year: u32) -> Result<f64> {
    let (r, n) = periodic_terms(rate, periods, compounding_per_year)?;

    if r.abs() < ZERO_RATE_EPSILON {
        return Ok(payment * n);
    }

    Ok(payment * (((1.0 + r).powf(n) - 1.0) / r))
}

/// Present value of a level payment made at the end of each period
///
/// `payment * (1 - (1 + r)^-n) / r`, or `payment * n` when the periodic rate is zero.
pub fn annuity_present_value(payment: f64, rate: f64, periods: f64, compounding_per_year: u32) -> Result<f64> {
    let (r, n) = periodic_terms(rate, periods, compounding_per_year)?;

    if r.abs() < ZERO_RATE_EPSILON {
        return Ok(payment * n);
    }

    Ok(payment * (1.0 - (1.0 + r).powf(-n)) / r)
}

/// Number of payment periods needed to retire `principal` with a level `payment`
///
/// Fails with [`ProjectionError::InsufficientPayment`] when the payment does not
/// cover one period of interest, where the closed form has no finite answer.
pub fn loan_payoff_periods(principal: f64, rate: f64, payment: f64, compounding_per_year: u32) -> Result<f64> {
    let (r, _) = periodic_terms(rate, 0.0, compounding_per_year)?;

    if !principal.is_finite() || principal <= 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "principal must be positive, got {}",
            principal
        )));
    }

    let periodic_interest = r * principal;
    if !payment.is_finite() || payment <= periodic_interest || payment <= 0.0 {
        return Err(ProjectionError::InsufficientPayment {
            payment,
            periodic_interest,
            remaining_balance: principal,
        });
    }

    if r.abs() < ZERO_RATE_EPSILON {
        return Ok(principal / payment);
    }

    Ok((payment / (payment - periodic_interest)).ln() / (1.0 + r).ln())
}

/// Effective annual rate of a nominal rate compounded `compounding_per_year` times
pub fn effective_annual_rate(nominal_rate: f64, compounding_per_year: u32) -> Result<f64> {
    let (r, n) = periodic_terms(nominal_rate, 1.0, compounding_per_year)?;
    Ok((1.0 + r).powf(n) - 1.0)
}

/// Inflation-adjusted (Fisher) rate of return
///
/// Only `inflation_rate <= -1` leaves the formula undefined; any finite nominal
/// rate is accepted.
pub fn real_rate(nominal_rate: f64, inflation_rate: f64) -> Result<f64> {
    if !nominal_rate.is_finite() {
        return Err(ProjectionError::InvalidRate {
            rate: nominal_rate,
            reason: "rate must be finite",
        });
    }
    check_periodic_rate(inflation_rate, inflation_rate)?;
    Ok((1.0 + nominal_rate) / (1.0 + inflation_rate) - 1.0)
}
