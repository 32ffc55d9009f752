//! Projection engine for accumulating (investment) and amortizing (loan) trajectories

mod state;
mod engine;
mod breakdown;
mod timing;

pub use state::{AccumulationState, AmortizationState};
pub use engine::{
    ProjectionEngine, EngineConfig,
    calculate_investment_with_one_time_payments, calculate_loan_with_one_time_payments,
    generate_amortization_schedule,
    MONTHS_PER_YEAR, DEFAULT_MAX_PERIODS, DEFAULT_MAX_YEARS, DEFAULT_BALANCE_EPSILON,
};
pub use breakdown::{
    AccumulationResult, AmortizationResult, YearSnapshot, MonthSnapshot, SchedulePeriod,
};
pub use timing::{OneTimePayment, YearOffset, MonthOffset, PaymentTiming, scheduled_total};
