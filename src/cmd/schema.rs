//! Schema command - print expected input formats

use crate::core::{IncomeStatementInput, StatementBatch};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or csv-header
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for a batch of income statements
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(StatementBatch);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", IncomeStatementInput::csv_header()),
            SchemaFormat::CsvFields => print_csv_fields(),
        }
        Ok(())
    }
}

fn print_csv_fields() {
    println!("CSV Input Format");
    println!("================");
    println!();
    for column in IncomeStatementInput::csv_columns() {
        let req = if column.required { "required" } else { "optional" };
        println!("{:24} ({:8})  {}", column.name, req, column.description);
    }
    println!();
    println!("Amounts are in rupees; empty cells count as zero.");
    println!("JSON input may be one statement, an array, or {{\"statements\": [...]}}.");
}
