//! Finance Projection CLI
//!
//! Command-line interface for running investment and loan projections

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use finance_projection::primitives::{effective_annual_rate, npv, real_rate, IrrOptions};
use finance_projection::projection::PaymentTiming;
use finance_projection::scenario::loader::{load_one_time_payments, load_scenarios};
use finance_projection::scenario::{comparison_horizon, InvestmentScenario, LoanScenario};
use finance_projection::{
    EngineConfig, MonthOffset, OneTimePayment, ProjectionEngine, ScenarioOutcome, ScenarioRunner,
    YearOffset,
};

#[derive(Parser)]
#[command(
    name = "finance-projection",
    version,
    about = "Project investment growth and loan payoff with one-time payments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow monthly contributions over a number of years
    Invest {
        /// Monthly contribution
        #[arg(long)]
        monthly: f64,
        /// Annual return as a decimal (0.07 for 7%)
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        #[command(flatten)]
        extras: ExtraArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Pay down a loan with a fixed monthly payment
    Loan {
        /// Outstanding balance
        #[arg(long)]
        balance: f64,
        /// Annual interest rate as a decimal
        #[arg(long)]
        rate: f64,
        /// Monthly payment
        #[arg(long)]
        payment: f64,
        /// First day of the loan, used to print the payoff date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        #[command(flatten)]
        extras: ExtraArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fixed-payment amortization schedule
    Schedule {
        #[arg(long)]
        balance: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        payment: f64,
        #[arg(long, default_value_t = 12)]
        per_year: u32,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Internal rate of return of a cash-flow series (period 0 first)
    Irr {
        #[arg(required = true, allow_negative_numbers = true)]
        cash_flows: Vec<f64>,
        #[arg(long, default_value_t = 0.1)]
        guess: f64,
        #[arg(long, default_value_t = 1000)]
        max_iterations: u32,
        #[arg(long, default_value_t = 1e-7)]
        tolerance: f64,
        /// Also print the NPV at this rate
        #[arg(long)]
        npv_rate: Option<f64>,
    },

    /// Effective annual and inflation-adjusted rates
    Rates {
        /// Nominal annual rate as a decimal
        #[arg(long)]
        nominal: f64,
        #[arg(long, default_value_t = 12)]
        compounding: u32,
        #[arg(long)]
        inflation: Option<f64>,
    },

    /// Evaluate every scenario in a CSV file
    Batch {
        /// Scenario file (name,type,principal,monthly_amount,rate,years)
        scenarios: PathBuf,
        /// One-time payments (scenario,amount,timing,description)
        #[arg(long)]
        payments: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ExtraArgs {
    /// One-time payment as AMOUNT@TIMING[:DESCRIPTION]; repeatable
    #[arg(long = "extra", value_parser = parse_extra)]
    extra: Vec<(f64, u32, String)>,
    /// CSV file of one-time payments (amount,timing,description)
    #[arg(long)]
    extras_file: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    /// Write the period breakdown to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_extra(raw: &str) -> std::result::Result<(f64, u32, String), String> {
    let (amount, rest) = raw
        .split_once('@')
        .ok_or_else(|| format!("expected AMOUNT@TIMING[:DESCRIPTION], got '{}'", raw))?;
    let (timing, description) = rest.split_once(':').unwrap_or((rest, ""));

    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad amount '{}': {}", amount, e))?;
    let timing = timing
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad timing '{}': {}", timing, e))?;

    Ok((amount, timing, description.to_string()))
}

impl ExtraArgs {
    fn collect<T: PaymentTiming + From<u32>>(&self) -> Result<Vec<OneTimePayment<T>>> {
        let mut payments: Vec<OneTimePayment<T>> = self
            .extra
            .iter()
            .map(|(amount, timing, description)| {
                OneTimePayment::new(*amount, T::from(*timing), description.clone())
            })
            .collect();

        if let Some(path) = &self.extras_file {
            let loaded = load_one_time_payments(path)
                .with_context(|| format!("reading one-time payments from {}", path.display()))?;
            payments.extend(loaded);
        }

        Ok(payments)
    }
}

fn write_csv<S: Serialize>(path: &Path, rows: &[S]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nBreakdown written to: {}", path.display());
    Ok(())
}

fn print_json<S: Serialize>(value: &S) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let runner = ScenarioRunner::new();

    match cli.command {
        Commands::Invest { monthly, rate, years, extras, output } => {
            let scenario = InvestmentScenario {
                name: None,
                monthly_amount: monthly,
                annual_rate: rate,
                years,
                one_time_payments: extras.collect::<YearOffset>()?,
            };
            let outcome = runner.run_investment(&scenario)?;

            if output.json {
                print_json(&outcome)?;
            } else {
                println!("{}", outcome.name);
                println!("{:>5} {:>16} {:>16} {:>16}", "Year", "Regular", "One-time", "Value");
                println!("{}", "-".repeat(56));
                for row in &outcome.result.breakdown {
                    println!(
                        "{:>5} {:>16.2} {:>16.2} {:>16.2}",
                        row.year, row.regular_contributions, row.one_time_contributions, row.total_value
                    );
                }
                println!("\nSummary:");
                println!("  Future Value: ${:.2}", outcome.result.future_value);
                println!("  Total Contributions: ${:.2}", outcome.total_contributions);
                println!("  Interest Earned: ${:.2}", outcome.interest_earned);
                println!("  One-time Impact: ${:.2}", outcome.one_time_impact);
            }

            if let Some(path) = &output.csv {
                write_csv(path, &outcome.result.breakdown)?;
            }
        }

        Commands::Loan { balance, rate, payment, start_date, extras, output } => {
            let start = start_date
                .as_deref()
                .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .transpose()
                .context("start date must be YYYY-MM-DD")?;

            let scenario = LoanScenario {
                name: None,
                balance,
                annual_rate: rate,
                monthly_payment: payment,
                one_time_payments: extras.collect::<MonthOffset>()?,
            };
            let outcome = runner.run_loan(&scenario)?;

            if output.json {
                print_json(&outcome)?;
            } else {
                println!("{}", outcome.name);
                println!(
                    "{:>5} {:>12} {:>12} {:>12} {:>12} {:>14}",
                    "Month", "Payment", "Principal", "Interest", "Extra", "Balance"
                );
                println!("{}", "-".repeat(72));
                for row in &outcome.result.breakdown {
                    println!(
                        "{:>5} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.month, row.payment, row.principal, row.interest, row.one_time_payment,
                        row.remaining_balance
                    );
                }
                println!("\nSummary:");
                println!("  Payoff Time: {} years {} months", outcome.years, outcome.months);
                println!("  Total Payments: ${:.2}", outcome.result.total_payments);
                println!("  Total Interest: ${:.2}", outcome.result.total_interest);
                println!("  Extra Payments: ${:.2}", outcome.extra_payments_applied);
                if let Some(saved) = outcome.interest_saved {
                    println!("  Interest Saved: ${:.2}", saved);
                }
                if let Some(date) = start.and_then(|d| outcome.result.payoff_date(d)) {
                    println!("  Payoff Date: {}", date);
                }
            }

            if let Some(path) = &output.csv {
                write_csv(path, &outcome.result.breakdown)?;
            }
        }

        Commands::Schedule { balance, rate, payment, per_year, output } => {
            let schedule = runner.engine().amortization_schedule(balance, rate, payment, per_year)?;

            if output.json {
                print_json(&schedule)?;
            } else {
                println!("{:>6} {:>12} {:>12} {:>12} {:>14}", "Period", "Payment", "Principal", "Interest", "Balance");
                println!("{}", "-".repeat(60));
                for row in &schedule {
                    println!(
                        "{:>6} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.period, row.payment, row.principal, row.interest, row.remaining_balance
                    );
                }
                let total_interest: f64 = schedule.iter().map(|r| r.interest).sum();
                println!("\n  Periods: {}", schedule.len());
                println!("  Total Interest: ${:.2}", total_interest);
            }

            if let Some(path) = &output.csv {
                write_csv(path, &schedule)?;
            }
        }

        Commands::Irr { cash_flows, guess, max_iterations, tolerance, npv_rate } => {
            let engine = ProjectionEngine::new(EngineConfig {
                irr: IrrOptions { guess, max_iterations, tolerance },
                ..EngineConfig::default()
            });
            let rate = engine.irr(&cash_flows)?;
            println!("IRR: {:.6} ({:.4}%)", rate, rate * 100.0);

            if let Some(r) = npv_rate {
                println!("NPV @ {:.4}: {:.2}", r, npv(r, &cash_flows)?);
            }
        }

        Commands::Rates { nominal, compounding, inflation } => {
            let ear = effective_annual_rate(nominal, compounding)?;
            println!("Effective annual rate: {:.6} ({:.4}%)", ear, ear * 100.0);

            if let Some(inflation) = inflation {
                let real = real_rate(nominal, inflation)?;
                println!("Real rate: {:.6} ({:.4}%)", real, real * 100.0);
            }
        }

        Commands::Batch { scenarios, payments, json } => {
            let loaded = load_scenarios(&scenarios, payments.as_deref())
                .with_context(|| format!("loading scenarios from {}", scenarios.display()))?;
            if loaded.is_empty() {
                bail!("{} contains no scenarios", scenarios.display());
            }

            let results = runner.run_batch(&loaded);
            let outcomes: Vec<ScenarioOutcome> = results.iter().filter_map(|r| r.as_ref().ok().cloned()).collect();

            if json {
                let rows: Vec<serde_json::Value> = loaded
                    .iter()
                    .zip(&results)
                    .map(|(scenario, result)| match result {
                        Ok(outcome) => serde_json::to_value(outcome).unwrap_or_default(),
                        Err(err) => serde_json::json!({
                            "name": scenario.display_name(),
                            "error": err.to_string(),
                        }),
                    })
                    .collect();
                print_json(&rows)?;
            } else {
                for (scenario, result) in loaded.iter().zip(&results) {
                    match result {
                        Ok(ScenarioOutcome::Investment(o)) => println!(
                            "{:<40} FV ${:>14.2}  interest ${:>12.2}",
                            o.name, o.result.future_value, o.interest_earned
                        ),
                        Ok(ScenarioOutcome::Loan(o)) => println!(
                            "{:<40} {:>3}y {:>2}m  interest ${:>12.2}",
                            o.name, o.years, o.months, o.result.total_interest
                        ),
                        Err(err) => println!("{:<40} ERROR: {}", scenario.display_name(), err),
                    }
                }
                println!("\nChart horizon: {} years", comparison_horizon(&outcomes));
            }
        }
    }

    Ok(())
}
