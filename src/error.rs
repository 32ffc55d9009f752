//! Error types for projection and time-value calculations
//!
//! Every calculation that can leave its numeric domain reports it here instead of
//! letting `NaN`, `Infinity` or a capped iteration count reach the caller.

use thiserror::Error;

/// Errors raised by the projection engine and the time-value primitives
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Rate makes the formula undefined (non-finite, or periodic growth factor <= 0)
    #[error("invalid rate {rate}: {reason}")]
    InvalidRate { rate: f64, reason: &'static str },

    /// Regular payment cannot retire the balance: it does not exceed the periodic
    /// interest, or the period cap was reached with `remaining_balance` still owed
    #[error("payment {payment:.2} does not retire balance {remaining_balance:.2} (periodic interest {periodic_interest:.2}); loan cannot amortize")]
    InsufficientPayment {
        payment: f64,
        periodic_interest: f64,
        remaining_balance: f64,
    },

    /// Newton-Raphson root finder gave up
    #[error("IRR did not converge after {iterations} iterations (last rate {last_rate})")]
    NoConvergence { iterations: u32, last_rate: f64 },

    /// Out-of-domain input that is not a rate (negative amounts, empty series, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Periodic rates closer to zero than this use the zero-rate limit of a formula
pub(crate) const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Reject non-finite rates and rates whose periodic growth factor is not positive
pub(crate) fn check_periodic_rate(rate: f64, periodic_rate: f64) -> Result<()> {
    if !rate.is_finite() || !periodic_rate.is_finite() {
        return Err(ProjectionError::InvalidRate {
            rate,
            reason: "rate must be finite",
        });
    }
    if 1.0 + periodic_rate <= 0.0 {
        return Err(ProjectionError::InvalidRate {
            rate,
            reason: "periodic growth factor must be positive",
        });
    }
    Ok(())
}

/// Reject negative or non-finite amounts
pub(crate) fn check_amount(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_checks() {
        assert!(check_periodic_rate(0.05, 0.05 / 12.0).is_ok());
        assert!(check_periodic_rate(0.0, 0.0).is_ok());
        assert!(matches!(
            check_periodic_rate(f64::NAN, f64::NAN),
            Err(ProjectionError::InvalidRate { .. })
        ));
        assert!(matches!(
            check_periodic_rate(-12.0, -1.0),
            Err(ProjectionError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_amount_checks() {
        assert!(check_amount("payment", 0.0).is_ok());
        assert!(check_amount("payment", -1.0).is_err());
        assert!(check_amount("payment", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ProjectionError::InsufficientPayment {
            payment: 50.0,
            periodic_interest: 83.333,
            remaining_balance: 10_000.0,
        };
        assert_eq!(
            err.to_string(),
            "payment 50.00 does not retire balance 10000.00 (periodic interest 83.33); loan cannot amortize"
        );
    }
}
