use super::regime::RegimeRules;
use super::warnings::Warning;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Surcharge {
    /// Rate of the income tier before any cap
    pub tier_rate: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Rate of the highest tier whose threshold `total_income` exceeds
pub fn tier_rate(rules: &RegimeRules, total_income: Decimal) -> Decimal {
    rules
        .surcharge_tiers
        .iter()
        .find(|tier| total_income > tier.above)
        .map_or(Decimal::ZERO, |tier| tier.rate)
}

/// Surcharge on the tax left after rebate and marginal relief.
///
/// One rate applies to the whole base. When any capital gains are present
/// that rate is capped at the regime's capital gains ceiling.
pub fn surcharge(
    rules: &RegimeRules,
    total_income: Decimal,
    has_capital_gains: bool,
    base_tax: Decimal,
    warnings: &mut Vec<Warning>,
) -> Surcharge {
    let tier_rate = tier_rate(rules, total_income);
    let rate = if has_capital_gains && tier_rate > rules.capital_gains_surcharge_cap {
        warnings.push(Warning::SurchargeRateCapped {
            tier_rate,
            applied_rate: rules.capital_gains_surcharge_cap,
        });
        rules.capital_gains_surcharge_cap
    } else {
        tier_rate
    };
    let amount = base_tax * rate;
    log::debug!(
        "surcharge: income {} tier {} applied {} on {} => {}",
        total_income,
        tier_rate,
        rate,
        base_tax,
        amount
    );
    Surcharge {
        tier_rate,
        rate,
        amount,
    }
}

pub fn cess(rules: &RegimeRules, base_tax: Decimal, surcharge: Decimal) -> Decimal {
    (base_tax + surcharge) * rules.cess_rate
}
