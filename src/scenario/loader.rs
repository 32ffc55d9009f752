//! Load scenario definitions and their one-time payments from CSV
//!
//! Scenario file columns: `name,type,principal,monthly_amount,rate,years`
//! - `type` is `investment` or `loan`
//! - investments use `monthly_amount`, `rate` and `years`; `principal` is left empty
//! - loans use `principal` (balance), `monthly_amount` (payment) and `rate`
//! - `rate` is an annual decimal (0.07 for 7%)
//!
//! Payment file columns: `scenario,amount,timing,description`, where `timing` is a
//! year for investment scenarios and a month for loan scenarios.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::{debug, info};
use thiserror::Error;

use super::{InvestmentScenario, LoanScenario, Scenario};
use crate::projection::{MonthOffset, OneTimePayment, PaymentTiming, YearOffset};

/// Errors raised while reading scenario files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("one-time payment references unknown scenario '{0}'")]
    UnknownScenario(String),
}

/// Raw scenario row
#[derive(Debug, serde::Deserialize)]
struct ScenarioRow {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    principal: Option<f64>,
    monthly_amount: f64,
    rate: f64,
    years: Option<u32>,
}

/// Raw one-time payment row
#[derive(Debug, serde::Deserialize)]
struct PaymentRow {
    scenario: String,
    amount: f64,
    timing: u32,
    #[serde(default)]
    description: String,
}

impl ScenarioRow {
    fn into_scenario(self, row: usize) -> Result<Scenario, LoadError> {
        let name = if self.name.trim().is_empty() { None } else { Some(self.name) };

        match self.kind.trim().to_ascii_lowercase().as_str() {
            "investment" => {
                let years = self.years.ok_or_else(|| LoadError::InvalidRow {
                    row,
                    message: "investment scenario needs a years value".to_string(),
                })?;
                Ok(Scenario::Investment(InvestmentScenario {
                    name,
                    monthly_amount: self.monthly_amount,
                    annual_rate: self.rate,
                    years,
                    one_time_payments: Vec::new(),
                }))
            }
            "loan" => {
                let balance = self.principal.ok_or_else(|| LoadError::InvalidRow {
                    row,
                    message: "loan scenario needs a principal value".to_string(),
                })?;
                Ok(Scenario::Loan(LoanScenario {
                    name,
                    balance,
                    annual_rate: self.rate,
                    monthly_payment: self.monthly_amount,
                    one_time_payments: Vec::new(),
                }))
            }
            other => Err(LoadError::InvalidRow {
                row,
                message: format!("unknown scenario type '{}'", other),
            }),
        }
    }
}

/// Load scenarios from any reader (file, string buffer, request body)
pub fn load_scenarios_from_reader<R: Read>(reader: R) -> Result<Vec<Scenario>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut scenarios = Vec::new();

    for (index, result) in csv_reader.deserialize().enumerate() {
        let row: ScenarioRow = result?;
        // Header is row 1
        scenarios.push(row.into_scenario(index + 2)?);
    }

    debug!("loaded {} scenarios", scenarios.len());
    Ok(scenarios)
}

/// Attach one-time payments to already loaded scenarios, matched by display name
pub fn attach_payments_from_reader<R: Read>(scenarios: &mut [Scenario], reader: R) -> Result<(), LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let index: HashMap<String, usize> = scenarios
        .iter()
        .enumerate()
        .map(|(i, s)| (s.display_name(), i))
        .collect();

    let mut attached = 0;
    for result in csv_reader.deserialize() {
        let row: PaymentRow = result?;
        let target = index
            .get(&row.scenario)
            .copied()
            .ok_or_else(|| LoadError::UnknownScenario(row.scenario.clone()))?;

        match &mut scenarios[target] {
            Scenario::Investment(s) => s
                .one_time_payments
                .push(OneTimePayment::new(row.amount, YearOffset(row.timing), row.description)),
            Scenario::Loan(s) => s
                .one_time_payments
                .push(OneTimePayment::new(row.amount, MonthOffset(row.timing), row.description)),
        }
        attached += 1;
    }

    debug!("attached {} one-time payments", attached);
    Ok(())
}

/// Load scenarios from a CSV file, optionally with a companion payments file
pub fn load_scenarios<P: AsRef<Path>>(path: P, payments_path: Option<&Path>) -> Result<Vec<Scenario>, LoadError> {
    let mut scenarios = load_scenarios_from_reader(File::open(path.as_ref())?)?;

    if let Some(payments_path) = payments_path {
        attach_payments_from_reader(&mut scenarios, File::open(payments_path)?)?;
    }

    info!("loaded {} scenarios from {}", scenarios.len(), path.as_ref().display());
    Ok(scenarios)
}

/// Load one-time payments for a single trajectory (`amount,timing,description`)
pub fn load_one_time_payments_from_reader<T, R>(reader: R) -> Result<Vec<OneTimePayment<T>>, LoadError>
where
    T: PaymentTiming + From<u32>,
    R: Read,
{
    #[derive(serde::Deserialize)]
    struct Row {
        amount: f64,
        timing: u32,
        #[serde(default)]
        description: String,
    }

    let mut csv_reader = Reader::from_reader(reader);
    let mut payments = Vec::new();
    for result in csv_reader.deserialize() {
        let row: Row = result?;
        payments.push(OneTimePayment::new(row.amount, T::from(row.timing), row.description));
    }
    Ok(payments)
}

/// Load one-time payments for a single trajectory from a CSV file
pub fn load_one_time_payments<T, P>(path: P) -> Result<Vec<OneTimePayment<T>>, LoadError>
where
    T: PaymentTiming + From<u32>,
    P: AsRef<Path>,
{
    load_one_time_payments_from_reader(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIOS: &str = "\
name,type,principal,monthly_amount,rate,years
Retirement,investment,,500,0.07,30
Car,loan,20000,500,0.05,
,loan,150000,1200,0.045,
";

    #[test]
    fn test_load_scenarios() {
        let scenarios = load_scenarios_from_reader(SCENARIOS.as_bytes()).unwrap();
        assert_eq!(scenarios.len(), 3);

        match &scenarios[0] {
            Scenario::Investment(s) => {
                assert_eq!(s.name.as_deref(), Some("Retirement"));
                assert_eq!(s.years, 30);
                assert_eq!(s.annual_rate, 0.07);
            }
            other => panic!("expected investment, got {:?}", other),
        }
        match &scenarios[2] {
            Scenario::Loan(s) => {
                assert!(s.name.is_none());
                assert_eq!(s.balance, 150_000.0);
                assert_eq!(s.monthly_payment, 1200.0);
            }
            other => panic!("expected loan, got {:?}", other),
        }
    }

    #[test]
    fn test_attach_payments() {
        let mut scenarios = load_scenarios_from_reader(SCENARIOS.as_bytes()).unwrap();
        let payments = "\
scenario,amount,timing,description
Retirement,10000,5,Inheritance
Car,2500,12,Tax refund
Car,1000,24,
";
        attach_payments_from_reader(&mut scenarios, payments.as_bytes()).unwrap();

        match &scenarios[1] {
            Scenario::Loan(s) => {
                assert_eq!(s.one_time_payments.len(), 2);
                assert_eq!(s.one_time_payments[0].timing, MonthOffset(12));
                assert_eq!(s.one_time_payments[0].description, "Tax refund");
            }
            other => panic!("expected loan, got {:?}", other),
        }
        match &scenarios[0] {
            Scenario::Investment(s) => assert_eq!(s.one_time_payments[0].timing, YearOffset(5)),
            other => panic!("expected investment, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_scenario_reference() {
        let mut scenarios = load_scenarios_from_reader(SCENARIOS.as_bytes()).unwrap();
        let payments = "scenario,amount,timing,description\nBoat,100,1,\n";
        let err = attach_payments_from_reader(&mut scenarios, payments.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownScenario(name) if name == "Boat"));
    }

    #[test]
    fn test_invalid_rows() {
        let missing_years = "name,type,principal,monthly_amount,rate,years\nX,investment,,100,0.05,\n";
        assert!(matches!(
            load_scenarios_from_reader(missing_years.as_bytes()),
            Err(LoadError::InvalidRow { row: 2, .. })
        ));

        let bad_type = "name,type,principal,monthly_amount,rate,years\nX,mortgage,100,10,0.05,\n";
        assert!(matches!(
            load_scenarios_from_reader(bad_type.as_bytes()),
            Err(LoadError::InvalidRow { .. })
        ));
    }

    #[test]
    fn test_load_one_time_payments() {
        let csv = "amount,timing,description\n500,3,Gift\n250,7,\n";
        let payments: Vec<OneTimePayment<MonthOffset>> =
            load_one_time_payments_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            payments,
            vec![
                OneTimePayment::new(500.0, MonthOffset(3), "Gift"),
                OneTimePayment::in_month(250.0, 7),
            ]
        );
    }
}
