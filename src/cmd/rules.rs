//! Rules command - print the rule set a computation would use

use super::load_rules;
use crate::core::AssessmentYear;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RulesCommand {
    /// Assessment year by its starting year (2026 for AY 2026-27)
    #[arg(short, long, default_value_t = AssessmentYear::CURRENT.0)]
    year: i32,

    /// Validate and print this rules file instead of the built-in rules
    #[arg(long)]
    rules: Option<PathBuf>,
}

impl RulesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rules = load_rules(self.year, self.rules.as_deref())?;
        println!("{}", serde_json::to_string_pretty(&rules)?);
        Ok(())
    }
}
