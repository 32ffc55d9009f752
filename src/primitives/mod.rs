//! Closed-form time-value-of-money primitives and NPV/IRR root finding

mod tvm;
mod irr;

pub use tvm::{
    future_value, present_value, annuity_future_value, annuity_present_value,
    loan_payoff_periods, effective_annual_rate, real_rate,
    DEFAULT_LUMP_SUM_COMPOUNDING, DEFAULT_ANNUITY_COMPOUNDING,
};
pub use irr::{npv, irr, irr_default, IrrOptions};
