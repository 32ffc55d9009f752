//! What-if scenarios built on top of the projection engine
//!
//! A scenario bundles the inputs of one trajectory with a display name. Running it
//! produces the trajectory plus the derived figures a dashboard shows next to it:
//! contributions vs. growth for investments, payoff time and interest saved for
//! loans, and a yearly chart series for both.

pub mod loader;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::primitives::annuity_future_value;
use crate::projection::{
    scheduled_total, AccumulationResult, AmortizationResult, EngineConfig, MonthOffset,
    OneTimePayment, ProjectionEngine, YearOffset, MONTHS_PER_YEAR,
};

/// Monthly contributions growing over a fixed number of years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentScenario {
    #[serde(default)]
    pub name: Option<String>,
    pub monthly_amount: f64,
    /// Annual return as a decimal
    pub annual_rate: f64,
    pub years: u32,
    #[serde(default)]
    pub one_time_payments: Vec<OneTimePayment<YearOffset>>,
}

/// Loan paid down with a fixed monthly payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanScenario {
    #[serde(default)]
    pub name: Option<String>,
    pub balance: f64,
    /// Annual interest rate as a decimal
    pub annual_rate: f64,
    pub monthly_payment: f64,
    #[serde(default)]
    pub one_time_payments: Vec<OneTimePayment<MonthOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scenario {
    Investment(InvestmentScenario),
    Loan(LoanScenario),
}

/// Point on a year-indexed chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub year: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentOutcome {
    pub name: String,
    pub result: AccumulationResult,
    pub regular_contributions: f64,
    pub one_time_contributions: f64,
    pub total_contributions: f64,
    pub interest_earned: f64,
    /// Future value minus the closed-form value of the regular contributions alone
    pub one_time_impact: f64,
    pub chart: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOutcome {
    pub name: String,
    pub result: AmortizationResult,
    /// Payoff time as whole years plus leftover months
    pub years: u32,
    pub months: u32,
    /// Everything scheduled as a one-time payment, applied or not
    pub extra_payments_total: f64,
    pub extra_payments_applied: f64,
    /// Interest avoided compared with the same loan without extra payments;
    /// absent when that loan cannot amortize within the period cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_saved: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_saved: Option<u32>,
    /// Remaining balance at the end of each year
    pub chart: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioOutcome {
    Investment(InvestmentOutcome),
    Loan(LoanOutcome),
}

/// Render a decimal rate as a percentage with at most two decimals ("7", "6.5")
fn format_percent(rate: f64) -> String {
    let pct = (rate * 10_000.0).round() / 100.0;
    format!("{}", pct)
}

impl InvestmentScenario {
    pub fn default_name(&self) -> String {
        let extras = if self.one_time_payments.is_empty() { "" } else { " + extras" };
        format!(
            "Investment ${}/mo at {}%{}",
            self.monthly_amount,
            format_percent(self.annual_rate),
            extras
        )
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.default_name())
    }
}

impl LoanScenario {
    pub fn default_name(&self) -> String {
        let extras = if self.one_time_payments.is_empty() { "" } else { " + extras" };
        format!(
            "Loan ${} at {}%{}",
            self.balance,
            format_percent(self.annual_rate),
            extras
        )
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.default_name())
    }
}

impl Scenario {
    pub fn display_name(&self) -> String {
        match self {
            Scenario::Investment(s) => s.display_name(),
            Scenario::Loan(s) => s.display_name(),
        }
    }
}

impl ScenarioOutcome {
    pub fn name(&self) -> &str {
        match self {
            ScenarioOutcome::Investment(o) => &o.name,
            ScenarioOutcome::Loan(o) => &o.name,
        }
    }

    /// Last year on the chart; used to align several scenarios on one axis
    pub fn horizon_years(&self) -> u32 {
        let chart = match self {
            ScenarioOutcome::Investment(o) => &o.chart,
            ScenarioOutcome::Loan(o) => &o.chart,
        };
        chart.last().map(|p| p.year).unwrap_or(0)
    }
}

/// Longest chart horizon across a set of outcomes
pub fn comparison_horizon(outcomes: &[ScenarioOutcome]) -> u32 {
    outcomes.iter().map(ScenarioOutcome::horizon_years).max().unwrap_or(0)
}

/// Runs scenarios against a shared engine configuration
///
/// # Example
/// ```
/// use finance_projection::scenario::{InvestmentScenario, Scenario, ScenarioRunner};
///
/// let runner = ScenarioRunner::new();
/// let scenario = Scenario::Investment(InvestmentScenario {
///     name: None,
///     monthly_amount: 500.0,
///     annual_rate: 0.07,
///     years: 20,
///     one_time_payments: Vec::new(),
/// });
/// let outcome = runner.run(&scenario).unwrap();
/// assert_eq!(outcome.name(), "Investment $500/mo at 7%");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with the default engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn run(&self, scenario: &Scenario) -> Result<ScenarioOutcome> {
        match scenario {
            Scenario::Investment(s) => self.run_investment(s).map(ScenarioOutcome::Investment),
            Scenario::Loan(s) => self.run_loan(s).map(ScenarioOutcome::Loan),
        }
    }

    /// Run independent scenarios in parallel; results keep the input order
    pub fn run_batch(&self, scenarios: &[Scenario]) -> Vec<Result<ScenarioOutcome>> {
        scenarios.par_iter().map(|s| self.run(s)).collect()
    }

    pub fn run_investment(&self, scenario: &InvestmentScenario) -> Result<InvestmentOutcome> {
        let result = self.engine.project_investment(
            scenario.monthly_amount,
            scenario.annual_rate,
            scenario.years,
            &scenario.one_time_payments,
        )?;

        let plain_annuity = annuity_future_value(
            scenario.monthly_amount,
            scenario.annual_rate,
            scenario.years as f64,
            MONTHS_PER_YEAR,
        )?;

        let chart = result
            .breakdown
            .iter()
            .map(|s| ChartPoint { year: s.year, value: s.total_value })
            .collect();

        Ok(InvestmentOutcome {
            name: scenario.display_name(),
            regular_contributions: result.regular_contributions(),
            one_time_contributions: result.one_time_contributions(),
            total_contributions: result.total_contributions(),
            interest_earned: result.interest_earned(),
            one_time_impact: result.future_value - plain_annuity,
            chart,
            result,
        })
    }

    pub fn run_loan(&self, scenario: &LoanScenario) -> Result<LoanOutcome> {
        let result = self.engine.project_loan(
            scenario.balance,
            scenario.annual_rate,
            scenario.monthly_payment,
            &scenario.one_time_payments,
        )?;

        let (interest_saved, months_saved) = if scenario.one_time_payments.is_empty() {
            (Some(0.0), Some(0))
        } else {
            match self.engine.project_loan(scenario.balance, scenario.annual_rate, scenario.monthly_payment, &[]) {
                Ok(baseline) => (
                    Some(baseline.total_interest - result.total_interest),
                    Some(baseline.total_months.saturating_sub(result.total_months)),
                ),
                Err(err) => {
                    debug!("no baseline for {}: {}", scenario.display_name(), err);
                    (None, None)
                }
            }
        };

        let chart = result
            .yearly_balances(scenario.balance)
            .into_iter()
            .map(|(year, value)| ChartPoint { year, value })
            .collect();
        let (years, months) = result.years_and_months();

        Ok(LoanOutcome {
            name: scenario.display_name(),
            years,
            months,
            extra_payments_total: scheduled_total(&scenario.one_time_payments),
            extra_payments_applied: result.extra_payments_applied(),
            interest_saved,
            months_saved,
            chart,
            result,
        })
    }
}
