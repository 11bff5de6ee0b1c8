use super::regime::RegimeRules;
use super::statement::IncomeStatement;
use super::warnings::Warning;
use rust_decimal::Decimal;
use serde::Serialize;

/// How much of the basic exemption one kind of income absorbed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExemptionLine {
    pub gross: Decimal,
    pub exemption_used: Decimal,
    pub taxable: Decimal,
}

/// Audit trail of exemption consumption for one computation.
///
/// The pooled basic exemption is consumed by ordinary income first, then
/// short-term gains, then long-term gains left over after their statutory
/// exemption. Whatever remains is forfeited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExemptionAllocation {
    /// Basic exemption available for pooling (zero when the regime has no pool)
    pub pool: Decimal,
    pub ltcg_gross: Decimal,
    pub ltcg_statutory_exemption: Decimal,
    pub ordinary: ExemptionLine,
    pub short_term: ExemptionLine,
    /// `gross` here is after the statutory exemption
    pub long_term: ExemptionLine,
    pub forfeited: Decimal,
}

impl ExemptionAllocation {
    pub fn total_used(&self) -> Decimal {
        self.ordinary.exemption_used
            + self.short_term.exemption_used
            + self.long_term.exemption_used
    }
}

struct Pool {
    remaining: Decimal,
}

impl Pool {
    fn consume(&mut self, gross: Decimal) -> ExemptionLine {
        let used = self.remaining.min(gross);
        self.remaining -= used;
        ExemptionLine {
            gross,
            exemption_used: used,
            taxable: gross - used,
        }
    }
}

pub fn allocate(
    ordinary_income: Decimal,
    statement: &IncomeStatement,
    rules: &RegimeRules,
    warnings: &mut Vec<Warning>,
) -> ExemptionAllocation {
    let ltcg_gross = statement.long_term_gains;
    let ltcg_statutory_exemption = ltcg_gross.min(rules.capital_gains.ltcg_exemption);
    let ltcg_after_exemption = ltcg_gross - ltcg_statutory_exemption;

    let pool = if rules.pooled_basic_exemption {
        rules.basic_exemption
    } else {
        Decimal::ZERO
    };
    let mut left = Pool { remaining: pool };
    let ordinary = left.consume(ordinary_income);
    let short_term = left.consume(statement.short_term_gains);
    let long_term = left.consume(ltcg_after_exemption);
    let forfeited = left.remaining;

    if forfeited > Decimal::ZERO {
        warnings.push(Warning::BasicExemptionForfeited { unused: forfeited });
    }

    let allocation = ExemptionAllocation {
        pool,
        ltcg_gross,
        ltcg_statutory_exemption,
        ordinary,
        short_term,
        long_term,
        forfeited,
    };
    log::debug!(
        "exemption: ordinary {} stcg {} ltcg {} of {} (forfeited {})",
        allocation.ordinary.exemption_used,
        allocation.short_term.exemption_used,
        allocation.long_term.exemption_used,
        pool,
        forfeited
    );
    allocation
}
