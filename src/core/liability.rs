use super::advance::{self, AdvanceTaxSchedule};
use super::exemption::{self, ExemptionAllocation};
use super::income::{self, OrdinaryIncome};
use super::regime::{ConfigError, Regime, RuleSet};
use super::relief;
use super::slab::BandCharge;
use super::statement::IncomeStatement;
use super::surcharge::{self, Surcharge};
use super::warnings::Warning;
use super::year::AssessmentYear;
use rust_decimal::Decimal;
use serde::Serialize;

/// Flat-rate tax on capital gains, outside the slab system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapitalGainsTax {
    pub short_term: Decimal,
    pub long_term: Decimal,
}

impl CapitalGainsTax {
    pub fn total(&self) -> Decimal {
        self.short_term + self.long_term
    }
}

/// Final figures, each rounded to two decimal places
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxResult {
    /// Tax before surcharge, after rebate and marginal relief
    pub base_tax: Decimal,
    pub surcharge: Decimal,
    pub cess: Decimal,
    pub rebate_applied: Decimal,
    pub marginal_relief_applied: Decimal,
    pub total_liability: Decimal,
    pub tax_already_paid: Decimal,
    /// Negative when a refund is due
    pub net_payable: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Settlement {
    Payable(Decimal),
    Refund(Decimal),
    Nil,
}

impl TaxResult {
    pub fn settlement(&self) -> Settlement {
        if self.net_payable > Decimal::ZERO {
            Settlement::Payable(self.net_payable)
        } else if self.net_payable < Decimal::ZERO {
            Settlement::Refund(-self.net_payable)
        } else {
            Settlement::Nil
        }
    }
}

/// Everything computed for one statement under one regime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub year: AssessmentYear,
    pub regime: Regime,
    pub income: OrdinaryIncome,
    pub allocation: ExemptionAllocation,
    /// Ordinary income plus both capital gains, before any tax
    pub total_income: Decimal,
    pub slab_charges: Vec<BandCharge>,
    pub slab_tax: Decimal,
    pub capital_gains_tax: CapitalGainsTax,
    pub surcharge: Surcharge,
    pub result: TaxResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advance_tax: Option<AdvanceTaxSchedule>,
    pub warnings: Vec<Warning>,
}

/// Old and new regime assessments of the same statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub old: Assessment,
    pub new: Assessment,
}

impl Comparison {
    /// Regime with the lower total liability; a tie goes to the new regime
    pub fn recommended(&self) -> Regime {
        if self.old.result.total_liability < self.new.result.total_liability {
            Regime::Old
        } else {
            Regime::New
        }
    }

    pub fn savings(&self) -> Decimal {
        (self.old.result.total_liability - self.new.result.total_liability).abs()
    }

    pub fn get(&self, regime: Regime) -> &Assessment {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }
}

/// Liability engine bound to a validated rule set.
///
/// Holds no state besides the rules; every call is a pure function of its
/// arguments, so one calculator can be shared across threads.
#[derive(Debug, Clone)]
pub struct Calculator {
    rules: RuleSet,
}

impl Calculator {
    pub fn new(rules: RuleSet) -> Result<Self, ConfigError> {
        rules.validate()?;
        Ok(Calculator { rules })
    }

    pub fn builtin(year: AssessmentYear) -> Result<Self, ConfigError> {
        Calculator::new(RuleSet::builtin(year)?)
    }

    pub fn year(&self) -> AssessmentYear {
        self.rules.year
    }

    pub fn assess(&self, statement: &IncomeStatement, regime: Regime) -> Assessment {
        let rules = self.rules.regime(regime);
        let mut warnings = Vec::new();
        if regime == Regime::Old {
            warnings.push(Warning::ItemizedDeductionsNotModeled);
        }

        let income = income::aggregate(statement, rules, &mut warnings);
        let allocation = exemption::allocate(income.total, statement, rules, &mut warnings);
        let total_income = income.total + statement.short_term_gains + statement.long_term_gains;

        // slab walk resumes where the basic exemption left off
        let resume_at = allocation.ordinary.exemption_used;
        let slab_charges = rules.slabs.walk(resume_at, allocation.ordinary.taxable);
        let slab_tax = rules.slabs.tax_from(resume_at, allocation.ordinary.taxable);

        let capital_gains_tax = CapitalGainsTax {
            short_term: allocation.short_term.taxable * rules.capital_gains.stcg_rate,
            long_term: allocation.long_term.taxable * rules.capital_gains.ltcg_rate,
        };

        let rebate = relief::rebate(&rules.rebate, income.total, total_income, slab_tax);
        let tax_before_relief = (slab_tax - rebate) + capital_gains_tax.total();
        let marginal_relief = relief::marginal_relief(
            rules.marginal_relief.as_ref(),
            total_income,
            tax_before_relief,
            rebate,
        );
        let base_tax = tax_before_relief - marginal_relief;
        log::debug!(
            "{} regime: slab {} cg {} rebate {} relief {} => base {}",
            regime,
            slab_tax,
            capital_gains_tax.total(),
            rebate,
            marginal_relief,
            base_tax
        );

        let surcharge = surcharge::surcharge(
            rules,
            total_income,
            statement.has_capital_gains(),
            base_tax,
            &mut warnings,
        );
        let cess = surcharge::cess(rules, base_tax, surcharge.amount);

        let base_tax = money(base_tax);
        let surcharge_amount = money(surcharge.amount);
        let cess = money(cess);
        let total_liability = base_tax + surcharge_amount + cess;
        let net_payable = total_liability - statement.tax_already_paid;

        let result = TaxResult {
            base_tax,
            surcharge: surcharge_amount,
            cess,
            rebate_applied: money(rebate),
            marginal_relief_applied: money(marginal_relief),
            total_liability,
            tax_already_paid: statement.tax_already_paid,
            net_payable,
        };
        let advance_tax = advance::schedule(&self.rules.advance_tax, self.rules.year, net_payable);

        Assessment {
            year: self.rules.year,
            regime,
            income,
            allocation,
            total_income,
            slab_charges,
            slab_tax: money(slab_tax),
            capital_gains_tax: CapitalGainsTax {
                short_term: money(capital_gains_tax.short_term),
                long_term: money(capital_gains_tax.long_term),
            },
            surcharge,
            result,
            advance_tax,
            warnings,
        }
    }

    /// Assess under both regimes; the two computations run concurrently
    pub fn compare(&self, statement: &IncomeStatement) -> Comparison {
        std::thread::scope(|scope| {
            let old = scope.spawn(|| self.assess(statement, Regime::Old));
            let new = self.assess(statement, Regime::New);
            let old = old
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            Comparison { old, new }
        })
    }
}

fn money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
