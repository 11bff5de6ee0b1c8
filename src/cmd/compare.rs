//! Compare command - old and new regime side by side

use super::{format_inr, format_rate, InputArgs};
use crate::core::{Assessment, Comparison, IncomeStatement, Regime};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CompareCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ComparisonOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    fingerprint: String,
    recommended: Regime,
    savings: Decimal,
    old: &'a Assessment,
    new: &'a Assessment,
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Particulars")]
    particulars: &'static str,
    #[tabled(rename = "Old Regime")]
    old: String,
    #[tabled(rename = "New Regime")]
    new: String,
}

impl CompareCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let calculator = self.input.calculator()?;
        let statements = self.input.statements()?;
        let comparisons: Vec<Comparison> = statements
            .iter()
            .map(|statement| calculator.compare(statement))
            .collect();

        if self.json {
            let output: Vec<_> = statements
                .iter()
                .zip(&comparisons)
                .map(|(statement, comparison)| ComparisonOutput {
                    label: statement.label.as_deref(),
                    fingerprint: statement.fingerprint(),
                    recommended: comparison.recommended(),
                    savings: comparison.savings(),
                    old: &comparison.old,
                    new: &comparison.new,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for (statement, comparison) in statements.iter().zip(&comparisons) {
                print_comparison(statement, comparison);
            }
        }
        Ok(())
    }
}

fn print_comparison(statement: &IncomeStatement, comparison: &Comparison) {
    let (old, new) = (comparison.get(Regime::Old), comparison.get(Regime::New));
    let heading = statement.label.as_deref().unwrap_or("Income statement");

    println!();
    println!("REGIME COMPARISON ({}) - {}", old.year, heading);

    let rows = vec![
        row("Gross total income", old.total_income, new.total_income),
        row("Tax on regular income", old.slab_tax, new.slab_tax),
        row(
            "Capital gains tax",
            old.capital_gains_tax.total(),
            new.capital_gains_tax.total(),
        ),
        row(
            "Rebate u/s 87A",
            old.result.rebate_applied,
            new.result.rebate_applied,
        ),
        row(
            "Marginal relief",
            old.result.marginal_relief_applied,
            new.result.marginal_relief_applied,
        ),
        row("Surcharge", old.result.surcharge, new.result.surcharge),
        row("Cess", old.result.cess, new.result.cess),
        row(
            "Total tax liability",
            old.result.total_liability,
            new.result.total_liability,
        ),
        row("Net payable", old.result.net_payable, new.result.net_payable),
        ComparisonRow {
            particulars: "Effective rate",
            old: effective_rate(old),
            new: effective_rate(new),
        },
    ];
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()));
    println!("{}", table);

    let recommended = comparison.recommended();
    if comparison.savings() > Decimal::ZERO {
        println!(
            "Recommended: {} regime (saves {})",
            recommended,
            format_inr(comparison.savings())
        );
    } else {
        println!("Recommended: {} regime (no difference)", recommended);
    }
}

fn row(particulars: &'static str, old: Decimal, new: Decimal) -> ComparisonRow {
    ComparisonRow {
        particulars,
        old: format_inr(old),
        new: format_inr(new),
    }
}

fn effective_rate(assessment: &Assessment) -> String {
    if assessment.total_income > Decimal::ZERO {
        let rate = (assessment.result.total_liability / assessment.total_income).round_dp(4);
        format_rate(rate)
    } else {
        format_rate(Decimal::ZERO)
    }
}
