//! Fixed-structure tax statement and the sinks that render it

mod csv;
mod html;
mod text;

pub use self::csv::CsvSink;
pub use html::HtmlSink;
pub use text::TextSink;

use super::{format_inr, format_rate, resolve_regime, InputArgs, RegimeArg};
use crate::core::{Assessment, AssessmentYear, IncomeStatement, Regime, Settlement};
use anyhow::Context;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

/// A renderer for tax statements.
///
/// Sinks only see finished figures; they never compute anything.
pub trait ReportSink {
    fn name(&self) -> &'static str;

    fn render(&self, documents: &[ReportDocument]) -> anyhow::Result<String>;
}

/// Renders through a primary sink, degrading to plain text if it fails
pub struct ReportWriter {
    primary: Box<dyn ReportSink>,
    fallback: TextSink,
}

impl ReportWriter {
    pub fn new(primary: Box<dyn ReportSink>) -> Self {
        ReportWriter {
            primary,
            fallback: TextSink,
        }
    }

    /// Rendered output and the name of the sink that produced it
    pub fn render(&self, documents: &[ReportDocument]) -> anyhow::Result<(String, &'static str)> {
        match self.primary.render(documents) {
            Ok(output) => Ok((output, self.primary.name())),
            Err(err) => {
                log::warn!(
                    "{} report failed ({:#}), writing a {} report instead",
                    self.primary.name(),
                    err,
                    self.fallback.name()
                );
                Ok((self.fallback.render(documents)?, self.fallback.name()))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub cells: Vec<String>,
    /// Totals and sub-totals
    pub emphasis: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Section {
    fn new(title: &str, columns: &[&str]) -> Self {
        Section {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Particulars row with an amount placed in column `at` (1-based after the label)
    fn amount(&mut self, label: &str, amount: Decimal, at: usize) {
        let mut cells = vec![label.to_string()];
        for column in 1..self.columns.len() {
            cells.push(if column == at {
                format_inr(amount)
            } else {
                String::new()
            });
        }
        self.rows.push(Row {
            cells,
            emphasis: false,
        });
    }

    fn total(&mut self, label: &str, amount: Decimal, at: usize) {
        self.amount(label, amount, at);
        if let Some(row) = self.rows.last_mut() {
            row.emphasis = true;
        }
    }

    fn cells(&mut self, cells: Vec<String>) {
        self.rows.push(Row {
            cells,
            emphasis: false,
        });
    }
}

/// Income tax computation statement for one taxpayer under one regime
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub subtitle: String,
    pub fingerprint: String,
    pub sections: Vec<Section>,
}

const DETAILS: usize = 1;
const SUBTOTAL: usize = 2;
const TOTAL: usize = 3;

impl ReportDocument {
    pub fn build(statement: &IncomeStatement, assessment: &Assessment) -> Self {
        let mut sections = vec![income_section(statement, assessment)];
        if assessment.allocation.pool > Decimal::ZERO {
            sections.push(exemption_section(assessment));
        }
        sections.push(slab_section(assessment));
        sections.push(tax_section(assessment));
        if let Some(schedule) = &assessment.advance_tax {
            let mut section = Section::new(
                "ADVANCE TAX SCHEDULE",
                &["Due Date", "Cumulative %", "Installment", "Cumulative"],
            );
            for installment in &schedule.installments {
                section.cells(vec![
                    installment
                        .due_date
                        .map_or_else(String::new, |d| d.format("%d %b %Y").to_string()),
                    format_rate(installment.cumulative_rate),
                    format_inr(installment.amount),
                    format_inr(installment.cumulative),
                ]);
            }
            section.total("Total advance tax", schedule.total(), 2);
            sections.push(section);
        }
        if !assessment.warnings.is_empty() {
            let mut section = Section::new("NOTES", &["Note"]);
            for warning in &assessment.warnings {
                section.cells(vec![warning.message()]);
            }
            sections.push(section);
        }

        let regime = format!("{} regime", assessment.regime);
        let subtitle = match &statement.label {
            Some(label) => format!("{} | {} | {}", label, regime, period(assessment.year)),
            None => format!("{} | {}", regime, period(assessment.year)),
        };

        ReportDocument {
            title: format!("INCOME TAX COMPUTATION - A.Y. {}", assessment.year.display()),
            subtitle,
            fingerprint: statement.fingerprint(),
            sections,
        }
    }
}

/// Financial year the income was earned in, with its dates when known
fn period(year: AssessmentYear) -> String {
    match (year.financial_year_start(), year.financial_year_end()) {
        (Some(start), Some(end)) => format!(
            "F.Y. {} ({} to {})",
            year.financial_year(),
            start.format("%d %b %Y"),
            end.format("%d %b %Y")
        ),
        _ => format!("F.Y. {}", year.financial_year()),
    }
}

fn income_section(statement: &IncomeStatement, assessment: &Assessment) -> Section {
    let income = &assessment.income;
    let allocation = &assessment.allocation;
    let mut section = Section::new(
        "STATEMENT OF INCOME",
        &["Particulars", "Details", "Sub-total", "Total"],
    );

    if income.gross_salary > Decimal::ZERO {
        section.amount("Salary income", income.gross_salary, DETAILS);
        section.amount("Less: Standard deduction", income.standard_deduction, DETAILS);
        section.total("Net salary", income.net_salary, SUBTOTAL);
    }

    let house = &income.house_property;
    if house.annual_value > Decimal::ZERO || house.loan_interest > Decimal::ZERO {
        section.amount("Annual value of house property", house.annual_value, DETAILS);
        section.amount("Less: 30% statutory deduction", house.statutory_deduction, DETAILS);
        if house.loan_interest > Decimal::ZERO {
            section.amount("Less: Interest on home loan", house.loan_interest, DETAILS);
        }
        section.total("Net house property", house.net, SUBTOTAL);
    }

    if income.business_income > Decimal::ZERO {
        section.total("Business income", income.business_income, SUBTOTAL);
    }
    if income.other_sources > Decimal::ZERO {
        section.total("Income from other sources", income.other_sources, SUBTOTAL);
    }

    if statement.has_capital_gains() {
        if statement.short_term_gains > Decimal::ZERO {
            section.amount("Short-term capital gains (111A)", statement.short_term_gains, DETAILS);
        }
        if allocation.ltcg_gross > Decimal::ZERO {
            section.amount("Long-term capital gains (112A)", allocation.ltcg_gross, DETAILS);
            if allocation.ltcg_statutory_exemption > Decimal::ZERO {
                section.amount(
                    "Less: Exemption u/s 112A",
                    allocation.ltcg_statutory_exemption,
                    DETAILS,
                );
            }
        }
        section.total(
            "Net capital gains",
            allocation.short_term.gross + allocation.long_term.gross,
            SUBTOTAL,
        );
    }

    section.total("TOTAL INCOME", assessment.total_income, TOTAL);
    section
}

fn exemption_section(assessment: &Assessment) -> Section {
    let allocation = &assessment.allocation;
    let mut section = Section::new(
        "BASIC EXEMPTION ALLOCATION",
        &["Income Type", "Amount", "Exemption Used", "Taxable"],
    );
    let lines = [
        ("Regular income", &allocation.ordinary),
        ("Short-term gains", &allocation.short_term),
        ("Long-term gains (after 112A exemption)", &allocation.long_term),
    ];
    for (label, line) in lines {
        section.cells(vec![
            label.to_string(),
            format_inr(line.gross),
            format_inr(line.exemption_used),
            format_inr(line.taxable),
        ]);
    }
    section.rows.push(Row {
        cells: vec![
            "Total used".to_string(),
            String::new(),
            format_inr(allocation.total_used()),
            String::new(),
        ],
        emphasis: true,
    });
    if allocation.forfeited > Decimal::ZERO {
        section.amount("Unused (forfeited)", allocation.forfeited, 2);
    }
    section
}

fn slab_section(assessment: &Assessment) -> Section {
    let mut section = Section::new("SLAB COMPUTATION", &["Band", "Rate", "Income", "Tax"]);
    for charge in &assessment.slab_charges {
        let band = match charge.to {
            Some(to) => format!("{} - {}", format_inr(charge.from), format_inr(to)),
            None => format!("Above {}", format_inr(charge.from)),
        };
        section.cells(vec![
            band,
            format_rate(charge.rate),
            format_inr(charge.amount),
            format_inr(charge.tax.round_dp(2)),
        ]);
    }
    section.total("Tax on regular income", assessment.slab_tax, 3);
    section
}

fn tax_section(assessment: &Assessment) -> Section {
    let result = &assessment.result;
    let mut section = Section::new("TAX COMPUTATION", &["Particulars", "Amount"]);

    section.amount("Tax on regular income", assessment.slab_tax, 1);
    if assessment.capital_gains_tax.short_term > Decimal::ZERO {
        section.amount("Tax on short-term gains", assessment.capital_gains_tax.short_term, 1);
    }
    if assessment.capital_gains_tax.long_term > Decimal::ZERO {
        section.amount("Tax on long-term gains", assessment.capital_gains_tax.long_term, 1);
    }
    if result.rebate_applied > Decimal::ZERO {
        section.amount("Less: Rebate u/s 87A", result.rebate_applied, 1);
    }
    if result.marginal_relief_applied > Decimal::ZERO {
        section.amount("Less: Marginal relief", result.marginal_relief_applied, 1);
    }
    section.total(
        &format!("Tax ({})", assessment.regime.display().to_uppercase()),
        result.base_tax,
        1,
    );
    if result.surcharge > Decimal::ZERO {
        let label = format!("Add: Surcharge @ {}", format_rate(assessment.surcharge.rate));
        section.amount(&label, result.surcharge, 1);
    }
    section.amount("Add: Health & education cess", result.cess, 1);
    section.total("TOTAL TAX LIABILITY", result.total_liability, 1);
    if result.tax_already_paid > Decimal::ZERO {
        section.amount("Less: Tax already paid", result.tax_already_paid, 1);
    }
    match result.settlement() {
        Settlement::Refund(amount) => section.total("REFUND DUE", amount, 1),
        Settlement::Payable(amount) => section.total("NET PAYABLE", amount, 1),
        Settlement::Nil => section.total("NET PAYABLE", Decimal::ZERO, 1),
    }
    section
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ReportFormat {
    /// Self-contained HTML page
    #[default]
    Html,
    /// Spreadsheet-friendly CSV
    Csv,
    /// Plain text tables
    Text,
}

#[derive(Args, Debug)]
pub struct ReportCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Regime to report on (defaults to each statement's own choice, then new)
    #[arg(short, long, value_enum)]
    regime: Option<RegimeArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Html)]
    format: ReportFormat,

    /// HTML template with __TITLE__, __CSS__ and __BODY__ placeholders
    #[arg(long)]
    template: Option<PathBuf>,

    /// Output file path (default: HTML opens in browser, others print to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let calculator = self.input.calculator()?;
        let statements = self.input.statements()?;
        let documents: Vec<ReportDocument> = statements
            .iter()
            .map(|statement| {
                let regime: Regime = resolve_regime(self.regime, statement);
                ReportDocument::build(statement, &calculator.assess(statement, regime))
            })
            .collect();

        let sink: Box<dyn ReportSink> = match self.format {
            ReportFormat::Html => Box::new(HtmlSink::new(self.load_template()?)),
            ReportFormat::Csv => Box::new(CsvSink),
            ReportFormat::Text => Box::new(TextSink),
        };
        let (output, produced_by) = ReportWriter::new(sink).render(&documents)?;

        if let Some(ref path) = self.output {
            std::fs::write(path, &output)?;
            log::info!("{} report written to {}", produced_by, path.display());
            println!("Report written to: {}", path.display());
        } else if produced_by == "html" {
            let temp_path = std::env::temp_dir().join("regimetax-report.html");
            std::fs::write(&temp_path, &output)?;
            opener::open(&temp_path)?;
            println!("Opened HTML report in browser: {}", temp_path.display());
        } else {
            print!("{}", output);
        }
        Ok(())
    }

    fn load_template(&self) -> anyhow::Result<Option<String>> {
        match &self.template {
            Some(path) => {
                let template = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read template {}", path.display()))?;
                Ok(Some(template))
            }
            None => Ok(None),
        }
    }
}
