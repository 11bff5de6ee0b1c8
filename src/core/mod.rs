pub mod advance;
pub mod exemption;
pub mod income;
pub mod liability;
pub mod regime;
pub mod relief;
pub mod slab;
pub mod statement;
pub mod surcharge;
pub mod warnings;
pub mod year;

// Flat public surface for the command layer.
pub use liability::{Assessment, Calculator, Comparison, Settlement};
pub use regime::{Regime, RuleSet};
pub use statement::{read_csv, read_json, IncomeStatement, IncomeStatementInput, StatementBatch};
pub use year::AssessmentYear;
