use super::regime::AdvanceTaxRules;
use super::year::AssessmentYear;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installment {
    pub due_date: Option<NaiveDate>,
    pub cumulative_rate: Decimal,
    /// Amount payable on this due date
    pub amount: Decimal,
    /// Total payable by this due date
    pub cumulative: Decimal,
}

/// Quarterly advance tax schedule of a net liability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceTaxSchedule {
    pub installments: Vec<Installment>,
}

impl AdvanceTaxSchedule {
    pub fn total(&self) -> Decimal {
        self.installments.iter().map(|i| i.amount).sum()
    }
}

/// Split `net_payable` into installments, or `None` below the threshold.
///
/// Each cumulative figure is rounded to whole units on its own and each
/// installment is the difference between consecutive cumulative figures, so
/// the installments always add up to the rounded liability.
pub fn schedule(
    rules: &AdvanceTaxRules,
    year: AssessmentYear,
    net_payable: Decimal,
) -> Option<AdvanceTaxSchedule> {
    if net_payable < rules.threshold {
        return None;
    }
    let mut paid = Decimal::ZERO;
    let installments = rules
        .installments
        .iter()
        .map(|rule| {
            let cumulative = (net_payable * rule.cumulative_rate).round();
            let amount = cumulative - paid;
            paid = cumulative;
            Installment {
                due_date: year.due_date(rule.month, rule.day),
                cumulative_rate: rule.cumulative_rate,
                amount,
                cumulative,
            }
        })
        .collect();
    Some(AdvanceTaxSchedule { installments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::regime::RuleSet;
    use rust_decimal_macros::dec;

    fn rules() -> AdvanceTaxRules {
        RuleSet::builtin(AssessmentYear(2026)).unwrap().advance_tax
    }

    #[test]
    fn below_threshold_has_no_schedule() {
        assert_eq!(
            schedule(&rules(), AssessmentYear(2026), dec!(9999.99)),
            None
        );
        assert_eq!(schedule(&rules(), AssessmentYear(2026), dec!(-5000)), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let s = schedule(&rules(), AssessmentYear(2026), dec!(10000)).unwrap();
        let amounts: Vec<_> = s.installments.iter().map(|i| i.amount).collect();
        assert_eq!(
            amounts,
            vec![dec!(1500), dec!(3000), dec!(3000), dec!(2500)]
        );
    }

    #[test]
    fn quarterly_installments() {
        let s = schedule(&rules(), AssessmentYear(2026), dec!(31200)).unwrap();
        let amounts: Vec<_> = s.installments.iter().map(|i| i.amount).collect();
        assert_eq!(
            amounts,
            vec![dec!(4680), dec!(9360), dec!(9360), dec!(7800)]
        );
        let cumulative: Vec<_> = s.installments.iter().map(|i| i.cumulative).collect();
        assert_eq!(
            cumulative,
            vec![dec!(4680), dec!(14040), dec!(23400), dec!(31200)]
        );
    }

    #[test]
    fn rounding_reconciles_to_total() {
        let s = schedule(&rules(), AssessmentYear(2026), dec!(12345.67)).unwrap();
        let amounts: Vec<_> = s.installments.iter().map(|i| i.amount).collect();
        assert_eq!(
            amounts,
            vec![dec!(1852), dec!(3704), dec!(3703), dec!(3087)]
        );
        assert_eq!(s.total(), dec!(12346));
    }

    #[test]
    fn installments_always_sum_to_rounded_liability() {
        for cents in [1_000_000i64, 1_234_567, 3_333_333, 9_999_999, 123_456_789] {
            let net = Decimal::new(cents, 2);
            let s = schedule(&rules(), AssessmentYear(2026), net).unwrap();
            assert_eq!(s.total(), net.round());
            assert!(s.installments.iter().all(|i| i.amount >= Decimal::ZERO));
        }
    }

    #[test]
    fn due_dates_fall_in_financial_year() {
        let s = schedule(&rules(), AssessmentYear(2026), dec!(50000)).unwrap();
        let dates: Vec<_> = s.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 15),
                NaiveDate::from_ymd_opt(2025, 9, 15),
                NaiveDate::from_ymd_opt(2025, 12, 15),
                NaiveDate::from_ymd_opt(2026, 3, 15),
            ]
        );
    }
}
