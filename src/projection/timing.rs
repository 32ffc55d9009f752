//! One-time cash events and the period units they are scheduled in
//!
//! An investment trajectory schedules extra contributions by year, a loan trajectory
//! schedules extra payments by month. The unit is part of the type so a year index
//! can never be handed to the loan engine by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProjectionError, Result};

/// A period index that one-time payments can be scheduled against
pub trait PaymentTiming: Copy + Eq + fmt::Debug {
    /// Zero-based or one-based period index, depending on the unit
    fn index(self) -> u32;

    /// Smallest index the owning trajectory can ever visit
    const FIRST: u32;

    const UNIT: &'static str;
}

/// Year index into an accumulating trajectory (0 = before any growth)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearOffset(pub u32);

/// Month index into an amortizing trajectory (1 = first payment month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthOffset(pub u32);

impl PaymentTiming for YearOffset {
    fn index(self) -> u32 {
        self.0
    }

    const FIRST: u32 = 0;
    const UNIT: &'static str = "year";
}

impl PaymentTiming for MonthOffset {
    fn index(self) -> u32 {
        self.0
    }

    const FIRST: u32 = 1;
    const UNIT: &'static str = "month";
}

impl From<u32> for YearOffset {
    fn from(year: u32) -> Self {
        YearOffset(year)
    }
}

impl From<u32> for MonthOffset {
    fn from(month: u32) -> Self {
        MonthOffset(month)
    }
}

impl fmt::Display for YearOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year {}", self.0)
    }
}

impl fmt::Display for MonthOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month {}", self.0)
    }
}

/// Extra, non-recurring cash added to a trajectory at a given period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTimePayment<T> {
    /// Amount added (investment) or prepaid (loan); always positive
    pub amount: f64,
    pub timing: T,
    #[serde(default)]
    pub description: String,
}

impl<T: PaymentTiming> OneTimePayment<T> {
    pub fn new(amount: f64, timing: T, description: impl Into<String>) -> Self {
        Self {
            amount,
            timing,
            description: description.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ProjectionError::InvalidInput(format!(
                "one-time payment at {} {} must have a positive amount, got {}",
                T::UNIT,
                self.timing.index(),
                self.amount
            )));
        }
        if self.timing.index() < T::FIRST {
            return Err(ProjectionError::InvalidInput(format!(
                "one-time payment {} index must be at least {}, got {}",
                T::UNIT,
                T::FIRST,
                self.timing.index()
            )));
        }
        Ok(())
    }
}

impl OneTimePayment<YearOffset> {
    /// Contribution added at the end of `year` (0 = up front)
    pub fn in_year(amount: f64, year: u32) -> Self {
        Self::new(amount, YearOffset(year), "")
    }
}

impl OneTimePayment<MonthOffset> {
    /// Extra principal paid in `month` (1-based)
    pub fn in_month(amount: f64, month: u32) -> Self {
        Self::new(amount, MonthOffset(month), "")
    }
}

/// Validate every payment in a list
pub(crate) fn validate_all<T: PaymentTiming>(payments: &[OneTimePayment<T>]) -> Result<()> {
    payments.iter().try_for_each(OneTimePayment::validate)
}

/// Sum of all payments scheduled at `at`; payments sharing a period are additive
pub(crate) fn total_due<T: PaymentTiming>(payments: &[OneTimePayment<T>], at: T) -> f64 {
    payments
        .iter()
        .filter(|p| p.timing == at)
        .map(|p| p.amount)
        .sum()
}

/// Sum of every payment regardless of whether it falls inside the horizon
pub fn scheduled_total<T>(payments: &[OneTimePayment<T>]) -> f64 {
    payments.iter().map(|p| p.amount).sum()
}
