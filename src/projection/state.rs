//! Running state of a trajectory while it is being projected

use super::breakdown::{MonthSnapshot, YearSnapshot};

/// Investment balance and cumulative contributions
#[derive(Debug, Clone, Default)]
pub struct AccumulationState {
    pub value: f64,
    pub regular_contributions: f64,
    pub one_time_contributions: f64,
}

impl AccumulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One month of growth followed by the regular contribution
    pub fn compound_month(&mut self, monthly_rate: f64, monthly_payment: f64) {
        self.value = self.value * (1.0 + monthly_rate) + monthly_payment;
        self.regular_contributions += monthly_payment;
    }

    /// Lump sum added without growth in the period it arrives
    pub fn inject(&mut self, amount: f64) {
        self.value += amount;
        self.one_time_contributions += amount;
    }

    pub fn snapshot(&self, year: u32) -> YearSnapshot {
        YearSnapshot {
            year,
            regular_contributions: self.regular_contributions,
            one_time_contributions: self.one_time_contributions,
            total_value: self.value,
        }
    }
}

/// Outstanding loan balance and running totals
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Months elapsed (the month last processed)
    pub month: u32,
    pub remaining_balance: f64,
    pub total_interest: f64,
    pub total_payments: f64,
}

impl AmortizationState {
    pub fn new(principal: f64) -> Self {
        Self {
            month: 0,
            remaining_balance: principal,
            total_interest: 0.0,
            total_payments: 0.0,
        }
    }

    /// Process the next month: accrue interest, apply the regular payment, then any
    /// extra principal requested for this month
    pub fn advance_month(&mut self, monthly_rate: f64, monthly_payment: f64, extra_requested: f64) -> MonthSnapshot {
        self.month += 1;

        let interest = self.remaining_balance * monthly_rate;
        let principal = (monthly_payment - interest).min(self.remaining_balance);

        self.remaining_balance -= principal;
        self.total_interest += interest;
        // Nominal payment is counted in full even when the last one is partial
        self.total_payments += monthly_payment;

        let extra_applied = extra_requested.min(self.remaining_balance).max(0.0);
        if extra_applied > 0.0 {
            self.remaining_balance -= extra_applied;
            self.total_payments += extra_applied;
        }

        MonthSnapshot {
            month: self.month,
            payment: monthly_payment,
            principal,
            interest,
            one_time_payment: extra_applied,
            remaining_balance: self.remaining_balance.max(0.0),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.remaining_balance <= 0.0
    }
}
