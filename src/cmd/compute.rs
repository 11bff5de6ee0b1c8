//! Compute command - full tax computation under one regime per statement

use super::report::{ReportDocument, ReportSink, TextSink};
use super::{resolve_regime, InputArgs, RegimeArg};
use crate::core::Assessment;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ComputeCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Regime to compute under (defaults to each statement's own choice, then new)
    #[arg(short, long, value_enum)]
    regime: Option<RegimeArg>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// One computed statement for JSON output
#[derive(Debug, Serialize)]
struct ComputedStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    fingerprint: String,
    assessment: Assessment,
}

impl ComputeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let calculator = self.input.calculator()?;
        let statements = self.input.statements()?;
        log::info!(
            "Computing {} statement(s) for {}",
            statements.len(),
            calculator.year()
        );

        let computed: Vec<_> = statements
            .iter()
            .map(|statement| {
                let regime = resolve_regime(self.regime, statement);
                (statement, calculator.assess(statement, regime))
            })
            .collect();

        if self.json {
            let output: Vec<ComputedStatement> = computed
                .into_iter()
                .map(|(statement, assessment)| ComputedStatement {
                    label: statement.label.clone(),
                    fingerprint: statement.fingerprint(),
                    assessment,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            let documents: Vec<_> = computed
                .iter()
                .map(|(statement, assessment)| {
                    ReportDocument::build(statement, assessment)
                })
                .collect();
            print!("{}", TextSink.render(&documents)?);
        }
        Ok(())
    }
}
