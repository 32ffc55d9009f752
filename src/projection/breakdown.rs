//! Per-period output structures for accumulating and amortizing trajectories

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cumulative position of an investment at the end of a year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearSnapshot {
    pub year: u32,
    /// Cumulative regular monthly contributions
    pub regular_contributions: f64,
    /// Cumulative one-time contributions actually applied
    pub one_time_contributions: f64,
    pub total_value: f64,
}

/// Complete accumulating trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationResult {
    pub future_value: f64,
    /// One entry per year from 0 to the horizon inclusive
    pub breakdown: Vec<YearSnapshot>,
}

impl AccumulationResult {
    /// Final snapshot (year = horizon)
    pub fn last(&self) -> Option<&YearSnapshot> {
        self.breakdown.last()
    }

    pub fn regular_contributions(&self) -> f64 {
        self.last().map(|s| s.regular_contributions).unwrap_or(0.0)
    }

    pub fn one_time_contributions(&self) -> f64 {
        self.last().map(|s| s.one_time_contributions).unwrap_or(0.0)
    }

    pub fn total_contributions(&self) -> f64 {
        self.regular_contributions() + self.one_time_contributions()
    }

    /// Growth on top of everything contributed
    pub fn interest_earned(&self) -> f64 {
        self.future_value - self.total_contributions()
    }
}

/// One month of a loan payoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthSnapshot {
    pub month: u32,
    /// Scheduled (nominal) regular payment
    pub payment: f64,
    /// Principal retired by the regular payment
    pub principal: f64,
    pub interest: f64,
    /// Extra principal actually applied this month (clamped to the balance)
    pub one_time_payment: f64,
    pub remaining_balance: f64,
}

/// Complete amortizing trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub total_months: u32,
    pub total_interest: f64,
    /// Nominal regular payments plus applied one-time payments
    pub total_payments: f64,
    pub breakdown: Vec<MonthSnapshot>,
}

impl AmortizationResult {
    pub fn final_balance(&self) -> f64 {
        self.breakdown.last().map(|m| m.remaining_balance).unwrap_or(0.0)
    }

    /// Sum of one-time payments that were actually applied
    pub fn extra_payments_applied(&self) -> f64 {
        self.breakdown.iter().map(|m| m.one_time_payment).sum()
    }

    /// Payoff time split into whole years and leftover months
    pub fn years_and_months(&self) -> (u32, u32) {
        (self.total_months / 12, self.total_months % 12)
    }

    /// Calendar date of the final payment when the first payment falls one month after `start`
    pub fn payoff_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        start.checked_add_months(Months::new(self.total_months))
    }

    /// Balance at the end of each year, starting with `principal` at year 0
    ///
    /// The last point is the balance after the final month, so a paid-off loan
    /// always ends at zero.
    pub fn yearly_balances(&self, principal: f64) -> Vec<(u32, f64)> {
        let years = self.total_months.div_ceil(12);
        let mut points = Vec::with_capacity(years as usize + 1);
        points.push((0, principal));

        for year in 1..=years {
            let month = (year * 12).min(self.total_months);
            let balance = self
                .breakdown
                .get(month as usize - 1)
                .map(|m| m.remaining_balance)
                .unwrap_or(0.0);
            points.push((year, balance));
        }

        points
    }
}

/// One period of a fixed-payment amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub period: u32,
    /// Actual amount paid (principal + interest); smaller than scheduled in the last period
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub remaining_balance: f64,
}
