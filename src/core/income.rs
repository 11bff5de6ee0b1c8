use super::regime::RegimeRules;
use super::statement::IncomeStatement;
use super::warnings::Warning;
use rust_decimal::Decimal;
use serde::Serialize;

/// House property income after the statutory deduction and loan interest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HouseProperty {
    pub annual_value: Decimal,
    pub statutory_deduction: Decimal,
    pub loan_interest: Decimal,
    /// May be negative; only `taxable` enters the total
    pub net: Decimal,
    pub taxable: Decimal,
}

/// Income other than capital gains, reduced head by head
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrdinaryIncome {
    pub gross_salary: Decimal,
    pub standard_deduction: Decimal,
    pub net_salary: Decimal,
    pub house_property: HouseProperty,
    pub business_income: Decimal,
    pub other_sources: Decimal,
    pub total: Decimal,
}

/// Reduce each income head and sum them.
///
/// Every head is floored at zero before summation, so a loss under one
/// head never offsets income under another.
pub fn aggregate(
    statement: &IncomeStatement,
    rules: &RegimeRules,
    warnings: &mut Vec<Warning>,
) -> OrdinaryIncome {
    let net_salary = (statement.salary - rules.standard_deduction).max(Decimal::ZERO);

    let annual_value = statement.house_property_income;
    let statutory_deduction = annual_value * rules.house_property_deduction_rate;
    let net = annual_value - statutory_deduction - statement.home_loan_interest;
    if net < Decimal::ZERO {
        warnings.push(Warning::HousePropertyLossNotSetOff { loss: -net });
    }
    let house_property = HouseProperty {
        annual_value,
        statutory_deduction,
        loan_interest: statement.home_loan_interest,
        net,
        taxable: net.max(Decimal::ZERO),
    };

    let business_income = statement.business_income.max(Decimal::ZERO);
    let other_sources = statement.other_sources.max(Decimal::ZERO);
    let total = net_salary + house_property.taxable + business_income + other_sources;

    log::debug!(
        "ordinary income: salary {} house {} business {} other {} => {}",
        net_salary,
        house_property.taxable,
        business_income,
        other_sources,
        total
    );

    OrdinaryIncome {
        gross_salary: statement.salary,
        standard_deduction: rules.standard_deduction,
        net_salary,
        house_property,
        business_income,
        other_sources,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::regime::{Regime, RuleSet};
    use crate::core::year::AssessmentYear;
    use rust_decimal_macros::dec;

    fn rules(regime: Regime) -> RegimeRules {
        RuleSet::builtin(AssessmentYear(2026))
            .unwrap()
            .regime(regime)
            .clone()
    }

    #[test]
    fn salary_reduced_by_regime_standard_deduction() {
        let statement = IncomeStatement {
            salary: dec!(1000000),
            ..Default::default()
        };
        let mut warnings = Vec::new();
        assert_eq!(
            aggregate(&statement, &rules(Regime::Old), &mut warnings).total,
            dec!(950000)
        );
        assert_eq!(
            aggregate(&statement, &rules(Regime::New), &mut warnings).total,
            dec!(925000)
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn salary_below_standard_deduction_floors_at_zero() {
        let statement = IncomeStatement {
            salary: dec!(30000),
            other_sources: dec!(10000),
            ..Default::default()
        };
        let income = aggregate(&statement, &rules(Regime::New), &mut Vec::new());
        assert_eq!(income.net_salary, dec!(0));
        assert_eq!(income.total, dec!(10000));
    }

    #[test]
    fn house_property_deduction_then_interest() {
        let statement = IncomeStatement {
            house_property_income: dec!(300000),
            home_loan_interest: dec!(50000),
            ..Default::default()
        };
        let income = aggregate(&statement, &rules(Regime::Old), &mut Vec::new());
        assert_eq!(income.house_property.statutory_deduction, dec!(90000));
        assert_eq!(income.house_property.net, dec!(160000));
        assert_eq!(income.total, dec!(160000));
    }

    #[test]
    fn house_property_loss_does_not_offset_salary() {
        let statement = IncomeStatement {
            salary: dec!(850000),
            house_property_income: dec!(100000),
            home_loan_interest: dec!(200000),
            ..Default::default()
        };
        let mut warnings = Vec::new();
        let income = aggregate(&statement, &rules(Regime::Old), &mut warnings);
        assert_eq!(income.house_property.net, dec!(-130000));
        assert_eq!(income.house_property.taxable, dec!(0));
        assert_eq!(income.total, dec!(800000));
        assert_eq!(
            warnings,
            vec![Warning::HousePropertyLossNotSetOff { loss: dec!(130000) }]
        );
    }

    #[test]
    fn loan_interest_never_increases_income() {
        let rules = rules(Regime::New);
        let mut previous = None;
        for interest in (0..=10).map(|i| Decimal::from(i * 25000)) {
            let statement = IncomeStatement {
                house_property_income: dec!(250000),
                home_loan_interest: interest,
                business_income: dec!(100000),
                ..Default::default()
            };
            let total = aggregate(&statement, &rules, &mut Vec::new()).total;
            if let Some(previous) = previous {
                assert!(total <= previous);
            }
            previous = Some(total);
        }
    }
}
