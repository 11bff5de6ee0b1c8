use super::regime::{MarginalReliefRule, RebateBasis, RebateRule};
use rust_decimal::Decimal;

/// Rebate against the ordinary-income slab tax.
///
/// Never touches capital gains tax and never exceeds the slab tax it is
/// set against.
pub fn rebate(
    rule: &RebateRule,
    ordinary_income: Decimal,
    total_income: Decimal,
    slab_tax: Decimal,
) -> Decimal {
    let basis = match rule.basis {
        RebateBasis::OrdinaryIncome => ordinary_income,
        RebateBasis::TotalIncome => total_income,
    };
    if basis <= rule.threshold {
        rule.cap.min(slab_tax).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Relief just above the rebate threshold.
///
/// Inside the window `(threshold, window_end]` the tax before surcharge may
/// not exceed the income earned past the threshold; the relief is whatever
/// it would otherwise exceed by. Outside the window, or when a rebate was
/// already given, there is no relief.
pub fn marginal_relief(
    rule: Option<&MarginalReliefRule>,
    total_income: Decimal,
    tax_before_relief: Decimal,
    rebate_applied: Decimal,
) -> Decimal {
    let Some(rule) = rule else {
        return Decimal::ZERO;
    };
    if rebate_applied > Decimal::ZERO
        || total_income <= rule.threshold
        || total_income > rule.window_end
    {
        return Decimal::ZERO;
    }
    let excess = total_income - rule.threshold;
    (tax_before_relief - excess).max(Decimal::ZERO)
}
