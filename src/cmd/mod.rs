pub mod compare;
pub mod compute;
pub mod report;
pub mod rules;
pub mod schema;

use crate::core::{
    read_csv, read_json, AssessmentYear, Calculator, IncomeStatement, IncomeStatementInput, Regime,
    RuleSet,
};
use anyhow::Context;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Input and rule options shared by the computing commands
#[derive(Args, Debug)]
pub struct InputArgs {
    /// JSON or CSV file of income statements ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Assessment year by its starting year (2026 for AY 2026-27)
    #[arg(short, long, default_value_t = AssessmentYear::CURRENT.0)]
    pub year: i32,

    /// JSON rules file used instead of the built-in rules
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RegimeArg {
    Old,
    New,
}

impl From<RegimeArg> for Regime {
    fn from(arg: RegimeArg) -> Self {
        match arg {
            RegimeArg::Old => Regime::Old,
            RegimeArg::New => Regime::New,
        }
    }
}

impl InputArgs {
    pub fn calculator(&self) -> anyhow::Result<Calculator> {
        let calculator = match &self.rules {
            Some(path) => Calculator::new(read_rules_file(path)?)?,
            None => Calculator::builtin(AssessmentYear(self.year))?,
        };
        Ok(calculator)
    }

    /// Read and validate every statement; the first invalid one fails the run
    pub fn statements(&self) -> anyhow::Result<Vec<IncomeStatement>> {
        let inputs = read_inputs(&self.input)?;
        log::info!("Read {} income statement(s)", inputs.len());
        inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                input.validate().with_context(|| {
                    let name = input.label.as_deref().unwrap_or("unlabelled");
                    format!("statement {} ({}) rejected", i + 1, name)
                })
            })
            .collect()
    }
}

/// Rules from a JSON file when one is given, otherwise the built-in rules for `year`
pub fn load_rules(year: i32, path: Option<&Path>) -> anyhow::Result<RuleSet> {
    match path {
        Some(path) => read_rules_file(path),
        None => Ok(RuleSet::builtin(AssessmentYear(year))?),
    }
}

fn read_rules_file(path: &Path) -> anyhow::Result<RuleSet> {
    let file =
        File::open(path).with_context(|| format!("cannot open rules file {}", path.display()))?;
    let rules = RuleSet::from_json(BufReader::new(file))
        .with_context(|| format!("invalid rules file {}", path.display()))?;
    log::info!("Loaded rules for {} from {}", rules.year, path.display());
    Ok(rules)
}

/// Regime for a statement: the command line wins, then the statement's own
/// choice, then the new regime
pub fn resolve_regime(cli: Option<RegimeArg>, statement: &IncomeStatement) -> Regime {
    cli.map(Regime::from)
        .or(statement.regime)
        .unwrap_or_default()
}

fn read_inputs(path: &Path) -> anyhow::Result<Vec<IncomeStatementInput>> {
    if path.as_os_str() == "-" {
        return read_from_stdin();
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let reader = BufReader::new(file);
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let inputs = if is_csv {
        read_csv(reader)?
    } else {
        read_json(reader)?
    };
    Ok(inputs)
}

fn read_from_stdin() -> anyhow::Result<Vec<IncomeStatementInput>> {
    let mut buffer = String::new();
    io::stdin().lock().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim_start();
    if trimmed.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    let inputs = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        read_json(trimmed.as_bytes())?
    } else {
        read_csv(trimmed.as_bytes())?
    };
    Ok(inputs)
}

/// Rupee amount with Indian digit grouping, e.g. ₹12,34,567.00
pub fn format_inr(amount: Decimal) -> String {
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", amount.abs().round_dp(2));
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}₹{}.{}", sign, group_indian(whole), fraction)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Rate as a percentage without trailing zeros, e.g. 12.5%
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
