//! Core projection engine for investment growth and loan payoff trajectories

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{check_amount, check_periodic_rate, ProjectionError, Result};
use crate::primitives::{self, IrrOptions};
use super::breakdown::{AccumulationResult, AmortizationResult, SchedulePeriod};
use super::state::{AccumulationState, AmortizationState};
use super::timing::{total_due, validate_all, MonthOffset, OneTimePayment, PaymentTiming, YearOffset};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Hard ceiling on simulated loan periods
pub const DEFAULT_MAX_PERIODS: u32 = 1000;

/// Longest investment horizon accepted, in years
pub const DEFAULT_MAX_YEARS: u32 = 1000;

/// Balance below which a loan counts as paid off
pub const DEFAULT_BALANCE_EPSILON: f64 = 0.01;

/// Configuration for a projection engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of loan/schedule periods before giving up
    pub max_periods: u32,

    /// Maximum investment horizon in years
    pub max_years: u32,

    /// Remaining balance treated as zero
    pub balance_epsilon: f64,

    /// IRR solver settings
    pub irr: IrrOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_periods: DEFAULT_MAX_PERIODS,
            max_years: DEFAULT_MAX_YEARS,
            balance_epsilon: DEFAULT_BALANCE_EPSILON,
            irr: IrrOptions::default(),
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: EngineConfig,
}

impl ProjectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Grow monthly contributions plus one-time lump sums over `years`
    ///
    /// Each month the balance grows by `annual_rate / 12` and then receives
    /// `monthly_payment`. One-time payments for year `y` land after that year's
    /// twelve steps (year 0: before any step) and only start growing the following
    /// month. Payments scheduled past the horizon are ignored.
    pub fn project_investment(
        &self,
        monthly_payment: f64,
        annual_rate: f64,
        years: u32,
        one_time_payments: &[OneTimePayment<YearOffset>],
    ) -> Result<AccumulationResult> {
        let monthly_rate = annual_rate / MONTHS_PER_YEAR as f64;
        check_periodic_rate(annual_rate, monthly_rate)?;
        check_amount("monthly payment", monthly_payment)?;
        if years > self.config.max_years {
            return Err(ProjectionError::InvalidInput(format!(
                "investment horizon of {} years exceeds the limit of {}",
                years, self.config.max_years
            )));
        }
        validate_all(one_time_payments)?;
        log_beyond_horizon(one_time_payments, years);

        let mut state = AccumulationState::new();
        let mut breakdown = Vec::with_capacity(years as usize + 1);

        for year in 0..=years {
            if year > 0 {
                for _ in 0..MONTHS_PER_YEAR {
                    state.compound_month(monthly_rate, monthly_payment);
                }
            }

            let due = total_due(one_time_payments, YearOffset(year));
            if due > 0.0 {
                state.inject(due);
            }

            breakdown.push(state.snapshot(year));
        }

        Ok(AccumulationResult {
            future_value: state.value,
            breakdown,
        })
    }

    /// Pay down `principal` with a fixed monthly payment plus one-time prepayments
    ///
    /// Fails with [`ProjectionError::InsufficientPayment`] when the payment cannot
    /// cover the first month's interest, or when the balance survives `max_periods`
    /// months.
    pub fn project_loan(
        &self,
        principal: f64,
        annual_rate: f64,
        monthly_payment: f64,
        one_time_payments: &[OneTimePayment<MonthOffset>],
    ) -> Result<AmortizationResult> {
        let monthly_rate = annual_rate / MONTHS_PER_YEAR as f64;
        check_periodic_rate(annual_rate, monthly_rate)?;
        check_principal(principal)?;
        check_amount("monthly payment", monthly_payment)?;
        check_covers_interest(principal, monthly_rate, monthly_payment)?;
        validate_all(one_time_payments)?;

        let mut state = AmortizationState::new(principal);
        let mut breakdown = Vec::new();

        while state.remaining_balance > self.config.balance_epsilon && state.month < self.config.max_periods {
            let extra = total_due(one_time_payments, MonthOffset(state.month + 1));
            let snapshot = state.advance_month(monthly_rate, monthly_payment, extra);

            if extra > snapshot.one_time_payment {
                debug!(
                    "one-time payment of {:.2} in month {} clamped to remaining balance ({:.2} applied)",
                    extra, snapshot.month, snapshot.one_time_payment
                );
            }

            breakdown.push(snapshot);

            if state.is_settled() {
                break;
            }
        }

        if state.remaining_balance > self.config.balance_epsilon {
            warn!(
                "loan of {:.2} still owes {:.2} after {} months",
                principal, state.remaining_balance, state.month
            );
            return Err(ProjectionError::InsufficientPayment {
                payment: monthly_payment,
                periodic_interest: state.remaining_balance * monthly_rate,
                remaining_balance: state.remaining_balance,
            });
        }

        log_beyond_horizon(one_time_payments, state.month);

        Ok(AmortizationResult {
            total_months: state.month,
            total_interest: state.total_interest,
            total_payments: state.total_payments,
            breakdown,
        })
    }

    /// Period-by-period schedule for a fixed-payment loan without extra payments
    pub fn amortization_schedule(
        &self,
        principal: f64,
        annual_rate: f64,
        payment: f64,
        payments_per_year: u32,
    ) -> Result<Vec<SchedulePeriod>> {
        if payments_per_year == 0 {
            return Err(ProjectionError::InvalidRate {
                rate: annual_rate,
                reason: "payments per year must be at least 1",
            });
        }
        let periodic_rate = annual_rate / payments_per_year as f64;
        check_periodic_rate(annual_rate, periodic_rate)?;
        check_principal(principal)?;
        check_amount("payment", payment)?;
        check_covers_interest(principal, periodic_rate, payment)?;

        let mut schedule = Vec::new();
        let mut remaining_balance = principal;
        let mut period = 0;

        while remaining_balance > 0.0 {
            if period >= self.config.max_periods {
                warn!(
                    "schedule for {:.2} still owes {:.2} after {} periods",
                    principal, remaining_balance, period
                );
                return Err(ProjectionError::InsufficientPayment {
                    payment,
                    periodic_interest: remaining_balance * periodic_rate,
                    remaining_balance,
                });
            }
            period += 1;

            let interest = remaining_balance * periodic_rate;
            let principal_paid = (payment - interest).min(remaining_balance);
            remaining_balance -= principal_paid;

            schedule.push(SchedulePeriod {
                period,
                payment: principal_paid + interest,
                principal: principal_paid,
                interest,
                remaining_balance: remaining_balance.max(0.0),
            });

            if remaining_balance < self.config.balance_epsilon {
                break;
            }
        }

        Ok(schedule)
    }

    /// IRR using this engine's solver settings
    pub fn irr(&self, cash_flows: &[f64]) -> Result<f64> {
        primitives::irr(cash_flows, &self.config.irr)
    }
}

fn check_principal(principal: f64) -> Result<()> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "principal must be a positive number, got {}",
            principal
        )));
    }
    Ok(())
}

fn check_covers_interest(principal: f64, periodic_rate: f64, payment: f64) -> Result<()> {
    let periodic_interest = principal * periodic_rate;
    if payment <= periodic_interest || payment <= 0.0 {
        return Err(ProjectionError::InsufficientPayment {
            payment,
            periodic_interest,
            remaining_balance: principal,
        });
    }
    Ok(())
}

fn log_beyond_horizon<T: PaymentTiming>(payments: &[OneTimePayment<T>], last_index: u32) {
    for payment in payments.iter().filter(|p| p.timing.index() > last_index) {
        debug!(
            "ignoring one-time payment of {:.2} at {} {}: past the end ({})",
            payment.amount,
            T::UNIT,
            payment.timing.index(),
            last_index
        );
    }
}

/// Investment projection with the default engine configuration
pub fn calculate_investment_with_one_time_payments(
    monthly_payment: f64,
    annual_rate: f64,
    years: u32,
    one_time_payments: &[OneTimePayment<YearOffset>],
) -> Result<AccumulationResult> {
    ProjectionEngine::default().project_investment(monthly_payment, annual_rate, years, one_time_payments)
}

/// Loan projection with the default engine configuration
pub fn calculate_loan_with_one_time_payments(
    principal: f64,
    annual_rate: f64,
    monthly_payment: f64,
    one_time_payments: &[OneTimePayment<MonthOffset>],
) -> Result<AmortizationResult> {
    ProjectionEngine::default().project_loan(principal, annual_rate, monthly_payment, one_time_payments)
}

/// Amortization schedule with the default engine configuration
pub fn generate_amortization_schedule(
    principal: f64,
    annual_rate: f64,
    payment: f64,
    payments_per_year: u32,
) -> Result<Vec<SchedulePeriod>> {
    ProjectionEngine::default().amortization_schedule(principal, annual_rate, payment, payments_per_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::annuity_future_value;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_investment_year_zero_is_empty() {
        let result = calculate_investment_with_one_time_payments(500.0, 0.07, 0, &[]).unwrap();

        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].year, 0);
        assert_eq!(result.breakdown[0].total_value, 0.0);
        assert_eq!(result.future_value, 0.0);
    }

    #[test]
    fn test_investment_year_zero_injection_has_no_growth() {
        let payments = [OneTimePayment::in_year(10_000.0, 0)];
        let result = calculate_investment_with_one_time_payments(0.0, 0.06, 1, &payments).unwrap();

        assert_eq!(result.breakdown[0].total_value, 10_000.0);
        assert_eq!(result.breakdown[0].one_time_contributions, 10_000.0);
        assert_eq!(result.breakdown[0].regular_contributions, 0.0);

        // Grows for the twelve months of year 1
        let expected = 10_000.0 * (1.0 + 0.06 / 12.0_f64).powi(12);
        assert_relative_eq!(result.future_value, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_investment_injection_does_not_grow_in_its_year() {
        let payments = [OneTimePayment::in_year(1000.0, 2)];
        let with = calculate_investment_with_one_time_payments(0.0, 0.12, 2, &payments).unwrap();

        // Nothing before year 2, then exactly the lump sum
        assert_eq!(with.breakdown[1].total_value, 0.0);
        assert_eq!(with.future_value, 1000.0);

        let longer = calculate_investment_with_one_time_payments(0.0, 0.12, 3, &payments).unwrap();
        assert_relative_eq!(longer.future_value, 1000.0 * 1.01_f64.powi(12), max_relative = 1e-12);
    }

    #[test]
    fn test_investment_breakdown_is_ordered_and_cumulative() {
        let payments = [OneTimePayment::in_year(2000.0, 3), OneTimePayment::in_year(500.0, 3)];
        let result = calculate_investment_with_one_time_payments(100.0, 0.05, 5, &payments).unwrap();

        assert_eq!(result.breakdown.len(), 6);
        for (i, snapshot) in result.breakdown.iter().enumerate() {
            assert_eq!(snapshot.year, i as u32);
            assert_abs_diff_eq!(snapshot.regular_contributions, 1200.0 * i as f64, epsilon = 1e-9);
        }
        assert_eq!(result.breakdown[2].one_time_contributions, 0.0);
        // Same-year payments are additive
        assert_eq!(result.breakdown[3].one_time_contributions, 2500.0);
        assert_eq!(result.breakdown[5].one_time_contributions, 2500.0);
        assert_eq!(result.future_value, result.breakdown[5].total_value);
    }

    #[test]
    fn test_investment_strictly_increasing_in_years() {
        let mut previous = 0.0;
        for years in 1..=40 {
            let fv = calculate_investment_with_one_time_payments(250.0, 0.04, years, &[])
                .unwrap()
                .future_value;
            assert!(fv > previous, "FV for {} years not above {} years", years, years - 1);
            previous = fv;
        }
    }

    #[test]
    fn test_investment_zero_rate() {
        let payments = [OneTimePayment::in_year(750.0, 4), OneTimePayment::in_year(300.0, 10)];
        let result = calculate_investment_with_one_time_payments(200.0, 0.0, 10, &payments).unwrap();

        assert_abs_diff_eq!(result.future_value, 200.0 * 12.0 * 10.0 + 1050.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.interest_earned(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_investment_payment_beyond_horizon_is_noop() {
        let base = calculate_investment_with_one_time_payments(300.0, 0.06, 10, &[]).unwrap();
        let late = [OneTimePayment::in_year(50_000.0, 11)];
        let with_late = calculate_investment_with_one_time_payments(300.0, 0.06, 10, &late).unwrap();

        assert_eq!(base, with_late);
    }

    #[test]
    fn test_investment_matches_closed_form_annuity() {
        // Both are ordinary annuities (payment after each month's growth), so the
        // only difference is floating-point summation order.
        let simulated = calculate_investment_with_one_time_payments(500.0, 0.07, 20, &[])
            .unwrap()
            .future_value;
        let closed_form = annuity_future_value(500.0, 0.07, 20.0, 12).unwrap();

        assert_relative_eq!(simulated, closed_form, max_relative = 1e-9);
    }

    #[test]
    fn test_investment_rejects_bad_input() {
        assert!(matches!(
            calculate_investment_with_one_time_payments(-1.0, 0.05, 5, &[]),
            Err(ProjectionError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_investment_with_one_time_payments(100.0, f64::NAN, 5, &[]),
            Err(ProjectionError::InvalidRate { .. })
        ));
        assert!(matches!(
            calculate_investment_with_one_time_payments(100.0, 0.05, 5, &[OneTimePayment::in_year(-10.0, 1)]),
            Err(ProjectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_loan_pays_off() {
        let result = calculate_loan_with_one_time_payments(20_000.0, 0.05, 500.0, &[]).unwrap();

        assert!(result.total_months < DEFAULT_MAX_PERIODS);
        assert_eq!(result.total_months, 44);
        assert_eq!(result.breakdown.len(), 44);
        assert_abs_diff_eq!(result.final_balance(), 0.0, epsilon = DEFAULT_BALANCE_EPSILON);

        let summed: f64 = result.breakdown.iter().map(|m| m.interest).sum();
        assert_relative_eq!(result.total_interest, summed, max_relative = 1e-12);
        assert_abs_diff_eq!(result.total_payments, 500.0 * 44.0, epsilon = 1e-9);
    }

    #[test]
    fn test_loan_balance_non_increasing() {
        let payments = [OneTimePayment::in_month(3000.0, 6), OneTimePayment::in_month(1000.0, 30)];
        let result = calculate_loan_with_one_time_payments(50_000.0, 0.065, 900.0, &payments).unwrap();

        let mut previous = 50_000.0;
        for snapshot in &result.breakdown {
            assert!(snapshot.remaining_balance <= previous);
            assert!(snapshot.remaining_balance >= 0.0);
            previous = snapshot.remaining_balance;
        }
        assert_eq!(result.breakdown.last().unwrap().month, result.total_months);
    }

    #[test]
    fn test_loan_one_time_payment_shortens_payoff() {
        let base = calculate_loan_with_one_time_payments(20_000.0, 0.05, 500.0, &[]).unwrap();
        let extra = [OneTimePayment::new(5000.0, MonthOffset(12), "Bonus")];
        let with_extra = calculate_loan_with_one_time_payments(20_000.0, 0.05, 500.0, &extra).unwrap();

        assert!(with_extra.total_months < base.total_months);
        assert!(with_extra.total_interest < base.total_interest);
        assert_eq!(with_extra.breakdown[11].one_time_payment, 5000.0);
    }

    #[test]
    fn test_loan_one_time_payment_clamped_and_counted() {
        // Extra payment larger than the balance pays it off exactly
        let extra = [OneTimePayment::in_month(1_000_000.0, 2)];
        let result = calculate_loan_with_one_time_payments(10_000.0, 0.06, 1000.0, &extra).unwrap();

        assert_eq!(result.total_months, 2);
        let applied = result.breakdown[1].one_time_payment;
        assert!(applied < 10_000.0);
        assert_eq!(result.final_balance(), 0.0);
        assert_abs_diff_eq!(result.total_payments, 2000.0 + applied, epsilon = 1e-9);
    }

    #[test]
    fn test_loan_payment_beyond_payoff_is_noop() {
        let base = calculate_loan_with_one_time_payments(20_000.0, 0.05, 500.0, &[]).unwrap();
        let late = [OneTimePayment::in_month(2500.0, 200)];
        let with_late = calculate_loan_with_one_time_payments(20_000.0, 0.05, 500.0, &late).unwrap();

        assert_eq!(base.total_payments, with_late.total_payments);
        assert_eq!(base.total_months, with_late.total_months);
    }

    #[test]
    fn test_loan_insufficient_payment() {
        // 5% on 200k accrues ~833/month
        let err = calculate_loan_with_one_time_payments(200_000.0, 0.05, 800.0, &[]).unwrap_err();
        assert!(matches!(err, ProjectionError::InsufficientPayment { .. }));
    }

    #[test]
    fn test_loan_cap_reported() {
        // Barely covers interest: takes far longer than the cap allows
        let config = EngineConfig {
            max_periods: 120,
            ..EngineConfig::default()
        };
        let engine = ProjectionEngine::new(config);
        let err = engine.project_loan(100_000.0, 0.06, 510.0, &[]).unwrap_err();

        match err {
            ProjectionError::InsufficientPayment { payment, remaining_balance, .. } => {
                assert_eq!(payment, 510.0);
                assert!(remaining_balance > 90_000.0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_loan_slow_amortization_is_insufficient() {
        // Covers the first month's interest by 1.00 but still owes ~70.9k after 1000 months
        let err = calculate_loan_with_one_time_payments(100_000.0, 0.06, 501.0, &[]).unwrap_err();

        match err {
            ProjectionError::InsufficientPayment { payment, periodic_interest, remaining_balance } => {
                assert_eq!(payment, 501.0);
                assert_abs_diff_eq!(remaining_balance, 70_880.0, epsilon = 50.0);
                assert_relative_eq!(periodic_interest, remaining_balance * 0.005, max_relative = 1e-12);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_investment_horizon_limit() {
        let err = calculate_investment_with_one_time_payments(1.0, 0.05, u32::MAX, &[]).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidInput(_)));

        let engine = ProjectionEngine::new(EngineConfig {
            max_years: 10,
            ..EngineConfig::default()
        });
        assert!(engine.project_investment(100.0, 0.05, 10, &[]).is_ok());
        assert!(matches!(
            engine.project_investment(100.0, 0.05, 11, &[]),
            Err(ProjectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_loan_zero_rate() {
        let result = calculate_loan_with_one_time_payments(1200.0, 0.0, 100.0, &[]).unwrap();
        assert_eq!(result.total_months, 12);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_schedule() {
        let schedule = generate_amortization_schedule(20_000.0, 0.05, 500.0, 12).unwrap();
        let loan = calculate_loan_with_one_time_payments(20_000.0, 0.05, 500.0, &[]).unwrap();

        assert_eq!(schedule.len() as u32, loan.total_months);
        let last = schedule.last().unwrap();
        assert!(last.payment < 500.0);
        assert_abs_diff_eq!(last.remaining_balance, 0.0, epsilon = DEFAULT_BALANCE_EPSILON);

        for period in &schedule {
            assert_relative_eq!(period.payment, period.principal + period.interest);
        }
    }

    #[test]
    fn test_schedule_quarterly() {
        let schedule = generate_amortization_schedule(10_000.0, 0.08, 1000.0, 4).unwrap();
        // First quarter accrues 2% interest
        assert_relative_eq!(schedule[0].interest, 200.0, max_relative = 1e-12);
        assert_relative_eq!(schedule[0].principal, 800.0, max_relative = 1e-12);
    }

    #[test]
    fn test_schedule_insufficient_payment() {
        assert!(matches!(
            generate_amortization_schedule(10_000.0, 0.12, 50.0, 12),
            Err(ProjectionError::InsufficientPayment { .. })
        ));
        assert!(matches!(
            generate_amortization_schedule(10_000.0, 0.12, 500.0, 0),
            Err(ProjectionError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_engine_irr_uses_config() {
        let engine = ProjectionEngine::new(EngineConfig {
            irr: IrrOptions { max_iterations: 1, ..IrrOptions::default() },
            ..EngineConfig::default()
        });
        assert!(matches!(
            engine.irr(&[-1000.0, 200.0, 300.0, 400.0, 500.0]),
            Err(ProjectionError::NoConvergence { iterations: 1, .. })
        ));
        assert!(ProjectionEngine::default().irr(&[-1000.0, 1100.0]).is_ok());
    }
}
