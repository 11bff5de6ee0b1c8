use super::regime::Regime;
use regimetax_derive::CsvColumns;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error("{field} of {value} exceeds the largest supported amount")]
    AmountTooLarge { field: &'static str, value: Decimal },
    #[error("unknown regime '{0}' (expected 'old' or 'new')")]
    UnknownRegime(String),
    #[error("no income statements found in input")]
    Empty,
    #[error("malformed JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
}

/// Column metadata generated by `#[derive(CsvColumns)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvColumn {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Income statement as supplied by a user, a form or a CSV row.
///
/// Every amount is optional; a blank means "not provided" and becomes zero
/// during [`IncomeStatementInput::validate`], never later.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, CsvColumns)]
#[serde(deny_unknown_fields)]
pub struct IncomeStatementInput {
    /// Name of the taxpayer or scenario
    #[serde(default)]
    pub label: Option<String>,
    /// Tax regime, "old" or "new"
    #[serde(default)]
    pub regime: Option<String>,
    /// Gross salary before the standard deduction
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub salary: Option<Decimal>,
    /// Net profit from business or profession
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub business_income: Option<Decimal>,
    /// Annual value of let-out house property
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub house_property_income: Option<Decimal>,
    /// Interest paid on a loan for the house property
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub home_loan_interest: Option<Decimal>,
    /// Interest, dividends and other income
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub other_sources: Option<Decimal>,
    /// Short-term capital gains taxed at a flat rate (111A)
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub short_term_gains: Option<Decimal>,
    /// Long-term capital gains before the statutory exemption (112A)
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub long_term_gains: Option<Decimal>,
    /// TDS and other tax already paid for the year
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub tax_already_paid: Option<Decimal>,
}

/// JSON input root holding several statements
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StatementBatch {
    pub statements: Vec<IncomeStatementInput>,
}

/// Validated, immutable income statement; every amount is non-negative
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncomeStatement {
    pub label: Option<String>,
    pub regime: Option<Regime>,
    pub salary: Decimal,
    pub business_income: Decimal,
    pub house_property_income: Decimal,
    pub home_loan_interest: Decimal,
    pub other_sources: Decimal,
    pub short_term_gains: Decimal,
    pub long_term_gains: Decimal,
    pub tax_already_paid: Decimal,
}

impl IncomeStatementInput {
    pub fn validate(&self) -> Result<IncomeStatement, InputError> {
        let regime = self
            .regime
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
            .map(str::parse::<Regime>)
            .transpose()?;

        Ok(IncomeStatement {
            label: self.label.clone().filter(|l| !l.trim().is_empty()),
            regime,
            salary: amount("salary", self.salary)?,
            business_income: amount("business_income", self.business_income)?,
            house_property_income: amount("house_property_income", self.house_property_income)?,
            home_loan_interest: amount("home_loan_interest", self.home_loan_interest)?,
            other_sources: amount("other_sources", self.other_sources)?,
            short_term_gains: amount("short_term_gains", self.short_term_gains)?,
            long_term_gains: amount("long_term_gains", self.long_term_gains)?,
            tax_already_paid: amount("tax_already_paid", self.tax_already_paid)?,
        })
    }
}

/// Ceiling on any single amount; keeps every sum in the pipeline far from
/// `Decimal` overflow
const MAX_AMOUNT: Decimal = dec!(1000000000000000);

fn amount(field: &'static str, value: Option<Decimal>) -> Result<Decimal, InputError> {
    match value {
        None => Ok(Decimal::ZERO),
        Some(value) if value < Decimal::ZERO => Err(InputError::NegativeAmount { field, value }),
        Some(value) if value > MAX_AMOUNT => Err(InputError::AmountTooLarge { field, value }),
        Some(value) => Ok(value),
    }
}

impl IncomeStatement {
    pub fn has_capital_gains(&self) -> bool {
        self.short_term_gains > Decimal::ZERO || self.long_term_gains > Decimal::ZERO
    }

    /// Hex SHA-256 of the statement's figures, printed on reports so a
    /// statement can be matched to the inputs it was produced from
    pub fn fingerprint(&self) -> String {
        let canonical = [
            ("salary", self.salary),
            ("business_income", self.business_income),
            ("house_property_income", self.house_property_income),
            ("home_loan_interest", self.home_loan_interest),
            ("other_sources", self.other_sources),
            ("short_term_gains", self.short_term_gains),
            ("long_term_gains", self.long_term_gains),
            ("tax_already_paid", self.tax_already_paid),
        ]
        .iter()
        .map(|(name, value)| format!("{}={}", name, value.normalize()))
        .collect::<Vec<_>>()
        .join(";");

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Read statements from JSON: a single object, an array, or `{"statements": [...]}`
pub fn read_json<R: Read>(reader: R) -> Result<Vec<IncomeStatementInput>, InputError> {
    let value: Value = serde_json::from_reader(reader)?;
    let statements = if value.is_array() {
        serde_json::from_value(value)?
    } else if value.get("statements").is_some() {
        serde_json::from_value::<StatementBatch>(value)?.statements
    } else {
        vec![serde_json::from_value(value)?]
    };
    non_empty(statements)
}

/// Read statements from CSV, one per row
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<IncomeStatementInput>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records: Result<Vec<IncomeStatementInput>, _> =
        rdr.deserialize::<IncomeStatementInput>().collect();
    non_empty(records?)
}

fn non_empty(
    statements: Vec<IncomeStatementInput>,
) -> Result<Vec<IncomeStatementInput>, InputError> {
    if statements.is_empty() {
        Err(InputError::Empty)
    } else {
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn blanks_coalesce_to_zero() {
        let input = IncomeStatementInput {
            salary: Some(dec!(800000)),
            ..Default::default()
        };
        let statement = input.validate().unwrap();
        assert_eq!(statement.salary, dec!(800000));
        assert_eq!(statement.business_income, dec!(0));
        assert_eq!(statement.tax_already_paid, dec!(0));
        assert_eq!(statement.regime, None);
    }

    #[test]
    fn negative_amount_rejected() {
        let input = IncomeStatementInput {
            long_term_gains: Some(dec!(-1)),
            ..Default::default()
        };
        match input.validate() {
            Err(InputError::NegativeAmount { field, value }) => {
                assert_eq!(field, "long_term_gains");
                assert_eq!(value, dec!(-1));
            }
            other => panic!("expected NegativeAmount, got {:?}", other),
        }
    }

    #[test]
    fn oversized_amount_rejected() {
        let input = IncomeStatementInput {
            salary: Some(dec!(40000000000000000000000000000)),
            business_income: Some(dec!(40000000000000000000000000000)),
            ..Default::default()
        };
        assert!(matches!(
            input.validate(),
            Err(InputError::AmountTooLarge { field: "salary", .. })
        ));

        let at_ceiling = IncomeStatementInput {
            salary: Some(MAX_AMOUNT),
            business_income: Some(MAX_AMOUNT),
            other_sources: Some(MAX_AMOUNT),
            ..Default::default()
        };
        assert!(at_ceiling.validate().is_ok());
    }

    #[test]
    fn unknown_regime_rejected() {
        let input = IncomeStatementInput {
            regime: Some("flat".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            input.validate(),
            Err(InputError::UnknownRegime(_))
        ));
    }

    #[test]
    fn blank_regime_is_absent() {
        let input = IncomeStatementInput {
            regime: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap().regime, None);
    }

    #[test]
    fn parse_single_json_statement() {
        let json = r#"{
            "label": "alice",
            "regime": "old",
            "salary": 650000,
            "tax_already_paid": "1200.50"
        }"#;
        let inputs = read_json(json.as_bytes()).unwrap();
        assert_eq!(inputs.len(), 1);
        let statement = inputs[0].validate().unwrap();
        assert_eq!(statement.label.as_deref(), Some("alice"));
        assert_eq!(statement.regime, Some(Regime::Old));
        assert_eq!(statement.salary, dec!(650000));
        assert_eq!(statement.tax_already_paid, dec!(1200.50));
    }

    #[test]
    fn parse_json_batch_and_array() {
        let batch = r#"{"statements": [{"salary": 1}, {"business_income": 2}]}"#;
        assert_eq!(read_json(batch.as_bytes()).unwrap().len(), 2);

        let array = r#"[{"salary": 1}, {"salary": 2}, {"salary": 3}]"#;
        assert_eq!(read_json(array.as_bytes()).unwrap().len(), 3);
    }

    #[test]
    fn empty_json_array_rejected() {
        assert!(matches!(read_json("[]".as_bytes()), Err(InputError::Empty)));
    }

    #[test]
    fn misspelt_field_named_in_error() {
        let err = read_json(r#"{"salery": 100}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("salery"), "{}", err);

        let batch = r#"{"statements": [{"salary": 1}, {"tax_paid": 2}]}"#;
        let err = read_json(batch.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("tax_paid"), "{}", err);
    }

    #[test]
    fn parse_csv_with_blank_fields() {
        let csv_data = "label,regime,salary,business_income,short_term_gains,long_term_gains
alice,new,1305000,,,
bob,old, 650000 ,,20000,150000";
        let inputs = read_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(inputs.len(), 2);

        let alice = inputs[0].validate().unwrap();
        assert_eq!(alice.salary, dec!(1305000));
        assert_eq!(alice.business_income, dec!(0));
        assert!(!alice.has_capital_gains());

        let bob = inputs[1].validate().unwrap();
        assert_eq!(bob.regime, Some(Regime::Old));
        assert_eq!(bob.salary, dec!(650000));
        assert_eq!(bob.long_term_gains, dec!(150000));
        assert!(bob.has_capital_gains());
    }

    #[test]
    fn csv_header_only_is_empty() {
        let csv_data = "label,salary\n";
        assert!(matches!(
            read_csv(csv_data.as_bytes()),
            Err(InputError::Empty)
        ));
    }

    #[test]
    fn csv_columns_are_all_optional() {
        let columns = IncomeStatementInput::csv_columns();
        assert_eq!(columns.len(), 10);
        assert!(columns.iter().all(|c| !c.required));
        assert_eq!(columns[2].name, "salary");
        assert_eq!(columns[2].description, "Gross salary before the standard deduction");
        assert!(IncomeStatementInput::csv_header().starts_with("label,regime,salary,"));
    }

    #[test]
    fn fingerprint_ignores_scale_and_label() {
        let a = IncomeStatement {
            label: Some("a".to_string()),
            salary: dec!(600000),
            ..Default::default()
        };
        let b = IncomeStatement {
            label: None,
            salary: dec!(600000.00),
            ..Default::default()
        };
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = IncomeStatement {
            salary: dec!(600001),
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
