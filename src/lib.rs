//! Finance Projection - time-value-of-money engine for what-if scenarios
//!
//! This library provides:
//! - Investment growth projections with monthly contributions and one-time lump sums
//! - Loan payoff projections with one-time prepayments and amortization schedules
//! - Closed-form future/present value, annuity, payoff-period and rate conversions
//! - NPV and Newton-Raphson IRR
//! - Scenario summaries and parallel batch evaluation

pub mod error;
pub mod primitives;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{ProjectionError, Result};
pub use projection::{
    ProjectionEngine, EngineConfig, AccumulationResult, AmortizationResult, OneTimePayment,
    YearOffset, MonthOffset,
    calculate_investment_with_one_time_payments, calculate_loan_with_one_time_payments,
    generate_amortization_schedule,
};
pub use scenario::{Scenario, ScenarioOutcome, ScenarioRunner};
