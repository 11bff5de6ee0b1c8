use super::slab::{Slab, SlabError, SlabTable};
use super::statement::InputError;
use super::year::AssessmentYear;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no built-in rules for {0}")]
    UnsupportedAssessmentYear(AssessmentYear),
    #[error("{regime} regime slab table: {source}")]
    InvalidSlabTable { regime: Regime, source: SlabError },
    #[error("{regime} regime: pooled exemption {exemption} must equal a zero-rate first band")]
    ExemptionBandMismatch { regime: Regime, exemption: Decimal },
    #[error("{regime} regime: surcharge tiers must be in strictly descending order of threshold")]
    UnorderedSurchargeTiers { regime: Regime },
    #[error("{regime} regime: {name} rate {rate} is outside 0..=1")]
    RateOutOfRange {
        regime: Regime,
        name: &'static str,
        rate: Decimal,
    },
    #[error("advance tax installments must rise strictly and end at 100%")]
    InvalidInstallments,
    #[error("advance tax due date {day}/{month} is not a valid calendar date")]
    InvalidDueDate { month: u32, day: u32 },
    #[error("malformed rules file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One of the two mutually exclusive statutory computation schemes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Old,
    #[default]
    New,
}

impl Regime {
    pub const ALL: [Regime; 2] = [Regime::Old, Regime::New];

    pub fn display(&self) -> &'static str {
        match self {
            Regime::Old => "Old",
            Regime::New => "New",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl FromStr for Regime {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "old" => Ok(Regime::Old),
            "new" => Ok(Regime::New),
            _ => Err(InputError::UnknownRegime(s.to_string())),
        }
    }
}

/// Which income figure the rebate threshold is tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebateBasis {
    /// Ordinary taxable income only
    OrdinaryIncome,
    /// Ordinary income plus both capital gains
    TotalIncome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateRule {
    pub threshold: Decimal,
    pub cap: Decimal,
    pub basis: RebateBasis,
}

/// Relief window `(threshold, window_end]` of total income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginalReliefRule {
    pub threshold: Decimal,
    pub window_end: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsRules {
    pub stcg_rate: Decimal,
    pub ltcg_rate: Decimal,
    /// Statutory exemption applied to long-term gains before anything else
    pub ltcg_exemption: Decimal,
}

/// Surcharge applies at `rate` when total income exceeds `above`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeTier {
    pub above: Decimal,
    pub rate: Decimal,
}

/// Everything one regime needs to compute a liability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeRules {
    pub standard_deduction: Decimal,
    /// Flat statutory deduction on house property income
    pub house_property_deduction_rate: Decimal,
    pub basic_exemption: Decimal,
    /// Whether the basic exemption is a pool consumed by ordinary income,
    /// then short-term gains, then long-term gains
    pub pooled_basic_exemption: bool,
    pub rebate: RebateRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marginal_relief: Option<MarginalReliefRule>,
    pub slabs: SlabTable,
    pub capital_gains: CapitalGainsRules,
    /// Highest threshold first
    pub surcharge_tiers: Vec<SurchargeTier>,
    /// Ceiling on the surcharge rate whenever capital gains are present
    pub capital_gains_surcharge_cap: Decimal,
    pub cess_rate: Decimal,
}

impl RegimeRules {
    fn validate(&self, regime: Regime) -> Result<(), ConfigError> {
        if self.pooled_basic_exemption {
            let first = self.slabs.first();
            if first.rate != Decimal::ZERO || first.width != Some(self.basic_exemption) {
                return Err(ConfigError::ExemptionBandMismatch {
                    regime,
                    exemption: self.basic_exemption,
                });
            }
        }

        let descending = self
            .surcharge_tiers
            .windows(2)
            .all(|pair| pair[0].above > pair[1].above);
        if !descending {
            return Err(ConfigError::UnorderedSurchargeTiers { regime });
        }

        let rates = [
            ("house property deduction", self.house_property_deduction_rate),
            ("short-term gains", self.capital_gains.stcg_rate),
            ("long-term gains", self.capital_gains.ltcg_rate),
            ("surcharge cap", self.capital_gains_surcharge_cap),
            ("cess", self.cess_rate),
        ];
        let tiers = self.surcharge_tiers.iter().map(|t| ("surcharge", t.rate));
        for (name, rate) in rates.into_iter().chain(tiers) {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigError::RateOutOfRange { regime, name, rate });
            }
        }
        Ok(())
    }
}

/// An advance tax due date and the share of liability due by then
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentRule {
    pub month: u32,
    pub day: u32,
    pub cumulative_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTaxRules {
    /// Net payable below this needs no advance tax
    pub threshold: Decimal,
    pub installments: Vec<InstallmentRule>,
}

impl AdvanceTaxRules {
    fn validate(&self) -> Result<(), ConfigError> {
        let rising = self
            .installments
            .windows(2)
            .all(|pair| pair[0].cumulative_rate < pair[1].cumulative_rate);
        let complete = self
            .installments
            .last()
            .is_some_and(|last| last.cumulative_rate == Decimal::ONE);
        if !(rising && complete) {
            return Err(ConfigError::InvalidInstallments);
        }
        // 2001 is not a leap year, so 29 February is rejected too
        for rule in &self.installments {
            if NaiveDate::from_ymd_opt(2001, rule.month, rule.day).is_none() {
                return Err(ConfigError::InvalidDueDate {
                    month: rule.month,
                    day: rule.day,
                });
            }
        }
        Ok(())
    }
}

/// Complete, validated rules for one assessment year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub year: AssessmentYear,
    pub old: RegimeRules,
    pub new: RegimeRules,
    pub advance_tax: AdvanceTaxRules,
}

impl RuleSet {
    /// Rules shipped with the calculator
    pub fn builtin(year: AssessmentYear) -> Result<RuleSet, ConfigError> {
        let rules = match year.0 {
            2026 => ay_2026_27()?,
            _ => return Err(ConfigError::UnsupportedAssessmentYear(year)),
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from JSON, e.g. a file produced by `regimetax rules`
    pub fn from_json<R: Read>(reader: R) -> Result<RuleSet, ConfigError> {
        let rules: RuleSet = serde_json::from_reader(reader)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.old.validate(Regime::Old)?;
        self.new.validate(Regime::New)?;
        self.advance_tax.validate()
    }

    pub fn regime(&self, regime: Regime) -> &RegimeRules {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }
}

fn table(regime: Regime, slabs: Vec<Slab>) -> Result<SlabTable, ConfigError> {
    SlabTable::new(slabs).map_err(|source| ConfigError::InvalidSlabTable { regime, source })
}

fn tier(above: Decimal, rate: Decimal) -> SurchargeTier {
    SurchargeTier { above, rate }
}

fn due(month: u32, day: u32, cumulative_rate: Decimal) -> InstallmentRule {
    InstallmentRule {
        month,
        day,
        cumulative_rate,
    }
}

fn ay_2026_27() -> Result<RuleSet, ConfigError> {
    let capital_gains = CapitalGainsRules {
        stcg_rate: dec!(0.20),
        ltcg_rate: dec!(0.125),
        ltcg_exemption: dec!(125000),
    };

    let old = RegimeRules {
        standard_deduction: dec!(50000),
        house_property_deduction_rate: dec!(0.30),
        basic_exemption: dec!(250000),
        pooled_basic_exemption: false,
        rebate: RebateRule {
            threshold: dec!(500000),
            cap: dec!(12500),
            basis: RebateBasis::OrdinaryIncome,
        },
        marginal_relief: None,
        slabs: table(
            Regime::Old,
            vec![
                Slab::bounded(dec!(250000), dec!(0)),
                Slab::bounded(dec!(250000), dec!(0.05)),
                Slab::bounded(dec!(500000), dec!(0.20)),
                Slab::unbounded(dec!(0.30)),
            ],
        )?,
        capital_gains,
        surcharge_tiers: vec![
            tier(dec!(50000000), dec!(0.37)),
            tier(dec!(20000000), dec!(0.25)),
            tier(dec!(10000000), dec!(0.15)),
            tier(dec!(5000000), dec!(0.10)),
        ],
        capital_gains_surcharge_cap: dec!(0.15),
        cess_rate: dec!(0.04),
    };

    let new = RegimeRules {
        standard_deduction: dec!(75000),
        house_property_deduction_rate: dec!(0.30),
        basic_exemption: dec!(400000),
        pooled_basic_exemption: true,
        rebate: RebateRule {
            threshold: dec!(1200000),
            cap: dec!(60000),
            basis: RebateBasis::TotalIncome,
        },
        marginal_relief: Some(MarginalReliefRule {
            threshold: dec!(1200000),
            window_end: dec!(1260000),
        }),
        slabs: table(
            Regime::New,
            vec![
                Slab::bounded(dec!(400000), dec!(0)),
                Slab::bounded(dec!(400000), dec!(0.05)),
                Slab::bounded(dec!(400000), dec!(0.10)),
                Slab::bounded(dec!(400000), dec!(0.15)),
                Slab::bounded(dec!(400000), dec!(0.20)),
                Slab::bounded(dec!(400000), dec!(0.25)),
                Slab::unbounded(dec!(0.30)),
            ],
        )?,
        capital_gains,
        surcharge_tiers: vec![
            tier(dec!(50000000), dec!(0.25)),
            tier(dec!(20000000), dec!(0.25)),
            tier(dec!(10000000), dec!(0.15)),
            tier(dec!(5000000), dec!(0.10)),
        ],
        capital_gains_surcharge_cap: dec!(0.15),
        cess_rate: dec!(0.04),
    };

    let advance_tax = AdvanceTaxRules {
        threshold: dec!(10000),
        installments: vec![
            due(6, 15, dec!(0.15)),
            due(9, 15, dec!(0.45)),
            due(12, 15, dec!(0.75)),
            due(3, 15, dec!(1.00)),
        ],
    };

    Ok(RuleSet {
        year: AssessmentYear(2026),
        old,
        new,
        advance_tax,
    })
}
