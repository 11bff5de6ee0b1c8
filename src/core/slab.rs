use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlabError {
    #[error("slab table has no bands")]
    Empty,
    #[error("band {index} has non-positive width {width}")]
    NonPositiveWidth { index: usize, width: Decimal },
    #[error("band {index} is unbounded but is not the last band")]
    UnboundedInnerBand { index: usize },
    #[error("the last band must be unbounded")]
    BoundedFinalBand,
    #[error("band {index} rate {rate} is outside 0..=1")]
    RateOutOfRange { index: usize, rate: Decimal },
    #[error("band {index} rate {rate} is lower than the preceding rate {previous}")]
    DecreasingRate {
        index: usize,
        rate: Decimal,
        previous: Decimal,
    },
}

/// A single income band taxed at one marginal rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slab {
    /// Width of the band; absent for the final, unbounded band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Decimal>,
    pub rate: Decimal,
}

impl Slab {
    pub const fn bounded(width: Decimal, rate: Decimal) -> Self {
        Slab {
            width: Some(width),
            rate,
        }
    }

    pub const fn unbounded(rate: Decimal) -> Self {
        Slab { width: None, rate }
    }
}

/// Ordered bands partitioning `[0, ∞)`.
///
/// Construction validates the table, so every `SlabTable` in circulation has
/// bounded inner bands, an unbounded final band and non-decreasing rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Slab>", into = "Vec<Slab>")]
pub struct SlabTable {
    slabs: Vec<Slab>,
}

/// The portion of an amount that fell into one band
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandCharge {
    pub from: Decimal,
    /// Upper edge of the band, `None` for the unbounded band
    pub to: Option<Decimal>,
    pub rate: Decimal,
    pub amount: Decimal,
    pub tax: Decimal,
}

impl SlabTable {
    pub fn new(slabs: Vec<Slab>) -> Result<Self, SlabError> {
        if slabs.is_empty() {
            return Err(SlabError::Empty);
        }
        let last = slabs.len() - 1;
        let mut previous = Decimal::ZERO;
        for (index, slab) in slabs.iter().enumerate() {
            match slab.width {
                Some(width) if width <= Decimal::ZERO => {
                    return Err(SlabError::NonPositiveWidth { index, width })
                }
                Some(_) if index == last => return Err(SlabError::BoundedFinalBand),
                None if index != last => return Err(SlabError::UnboundedInnerBand { index }),
                _ => {}
            }
            if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE {
                return Err(SlabError::RateOutOfRange {
                    index,
                    rate: slab.rate,
                });
            }
            if slab.rate < previous {
                return Err(SlabError::DecreasingRate {
                    index,
                    rate: slab.rate,
                    previous,
                });
            }
            previous = slab.rate;
        }
        Ok(SlabTable { slabs })
    }

    pub fn first(&self) -> &Slab {
        &self.slabs[0]
    }

    /// Charge `amount` of income placed on the income axis starting at `offset`.
    ///
    /// Income below `offset` is treated as already accounted for: bands lying
    /// wholly beneath it are skipped and a band straddling it only charges the
    /// part above. An offset of zero is the plain banded computation.
    pub fn walk(&self, offset: Decimal, amount: Decimal) -> Vec<BandCharge> {
        let mut charges = Vec::new();
        if amount <= Decimal::ZERO {
            return charges;
        }
        let start = offset.max(Decimal::ZERO);
        let end = start + amount;
        let mut lower = Decimal::ZERO;

        for slab in &self.slabs {
            let upper = slab.width.map(|w| lower + w);
            let from = start.max(lower);
            let to = upper.map_or(end, |u| end.min(u));
            if to > from {
                let portion = to - from;
                charges.push(BandCharge {
                    from: lower,
                    to: upper,
                    rate: slab.rate,
                    amount: portion,
                    tax: portion * slab.rate,
                });
            }
            match upper {
                Some(u) if u < end => lower = u,
                _ => break,
            }
        }
        charges
    }

    /// Tax on `amount` placed at `offset`; see [`SlabTable::walk`]
    pub fn tax_from(&self, offset: Decimal, amount: Decimal) -> Decimal {
        self.walk(offset, amount).iter().map(|c| c.tax).sum()
    }
}

impl TryFrom<Vec<Slab>> for SlabTable {
    type Error = SlabError;

    fn try_from(slabs: Vec<Slab>) -> Result<Self, Self::Error> {
        SlabTable::new(slabs)
    }
}

impl From<SlabTable> for Vec<Slab> {
    fn from(table: SlabTable) -> Self {
        table.slabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn old_table() -> SlabTable {
        SlabTable::new(vec![
            Slab::bounded(dec!(250000), dec!(0)),
            Slab::bounded(dec!(250000), dec!(0.05)),
            Slab::bounded(dec!(500000), dec!(0.20)),
            Slab::unbounded(dec!(0.30)),
        ])
        .unwrap()
    }

    fn new_table() -> SlabTable {
        let mut slabs: Vec<Slab> = [0, 5, 10, 15, 20, 25]
            .iter()
            .map(|pct| Slab::bounded(dec!(400000), Decimal::new(*pct, 2)))
            .collect();
        slabs.push(Slab::unbounded(dec!(0.30)));
        SlabTable::new(slabs).unwrap()
    }

    #[test]
    fn banded_tax_matches_closed_form() {
        let table = old_table();
        assert_eq!(table.tax_from(Decimal::ZERO, dec!(250000)), dec!(0));
        assert_eq!(table.tax_from(Decimal::ZERO, dec!(400000)), dec!(7500));
        assert_eq!(table.tax_from(Decimal::ZERO, dec!(500000)), dec!(12500));
        assert_eq!(table.tax_from(Decimal::ZERO, dec!(600000)), dec!(32500));
        assert_eq!(table.tax_from(Decimal::ZERO, dec!(1000000)), dec!(112500));
        assert_eq!(table.tax_from(Decimal::ZERO, dec!(1500000)), dec!(262500));
    }

    #[test]
    fn zero_amount_has_no_charges() {
        assert!(old_table().walk(Decimal::ZERO, Decimal::ZERO).is_empty());
        assert_eq!(new_table().tax_from(dec!(400000), Decimal::ZERO), dec!(0));
    }

    #[test]
    fn resume_after_full_first_band_skips_zero_band() {
        let table = new_table();
        // 1,230,000 of income with the first 400,000 already shielded
        let charges = table.walk(dec!(400000), dec!(830000));
        assert_eq!(charges.len(), 3);
        assert_eq!(charges[0].rate, dec!(0.05));
        assert_eq!(charges[0].from, dec!(400000));
        assert_eq!(charges[2].amount, dec!(30000));
        assert_eq!(table.tax_from(dec!(400000), dec!(830000)), dec!(64500));
    }

    #[test]
    fn partial_offset_consumes_remainder_tax_free() {
        let table = new_table();
        // 150,000 of the zero band is still open before the 5% band starts
        let charges = table.walk(dec!(250000), dec!(200000));
        assert_eq!(charges[0].rate, dec!(0));
        assert_eq!(charges[0].amount, dec!(150000));
        assert_eq!(charges[1].amount, dec!(50000));
        assert_eq!(table.tax_from(dec!(250000), dec!(200000)), dec!(2500));
    }

    #[test]
    fn reapplying_zero_band_would_understate_tax() {
        let table = new_table();
        let resumed = table.tax_from(dec!(400000), dec!(830000));
        let restarted = table.tax_from(Decimal::ZERO, dec!(830000));
        assert!(resumed > restarted);
    }

    #[test]
    fn top_band_is_unbounded() {
        let table = new_table();
        let charges = table.walk(Decimal::ZERO, dec!(3000000));
        let last = charges.last().unwrap();
        assert_eq!(last.to, None);
        assert_eq!(last.amount, dec!(600000));
        assert_eq!(table.tax_from(Decimal::ZERO, dec!(3000000)), dec!(480000));
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(SlabTable::new(vec![]), Err(SlabError::Empty));
    }

    #[test]
    fn rejects_bounded_final_band() {
        let result = SlabTable::new(vec![Slab::bounded(dec!(100), dec!(0))]);
        assert_eq!(result, Err(SlabError::BoundedFinalBand));
    }

    #[test]
    fn rejects_gap_from_unbounded_inner_band() {
        let result = SlabTable::new(vec![
            Slab::unbounded(dec!(0)),
            Slab::unbounded(dec!(0.1)),
        ]);
        assert_eq!(result, Err(SlabError::UnboundedInnerBand { index: 0 }));
    }

    #[test]
    fn rejects_zero_width() {
        let result = SlabTable::new(vec![
            Slab::bounded(dec!(0), dec!(0)),
            Slab::unbounded(dec!(0.1)),
        ]);
        assert!(matches!(
            result,
            Err(SlabError::NonPositiveWidth { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_decreasing_rates() {
        let result = SlabTable::new(vec![
            Slab::bounded(dec!(100), dec!(0.2)),
            Slab::unbounded(dec!(0.1)),
        ]);
        assert!(matches!(
            result,
            Err(SlabError::DecreasingRate { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_rate_above_one() {
        let result = SlabTable::new(vec![Slab::unbounded(dec!(1.5))]);
        assert!(matches!(result, Err(SlabError::RateOutOfRange { .. })));
    }

    #[test]
    fn deserialize_validates() {
        let ok: SlabTable =
            serde_json::from_str(r#"[{"width": "100", "rate": "0"}, {"rate": "0.1"}]"#).unwrap();
        assert_eq!(Vec::<Slab>::from(ok).len(), 2);

        let decreasing = r#"[{"width": "100", "rate": "0.2"}, {"rate": "0.1"}]"#;
        let bad = serde_json::from_str::<SlabTable>(decreasing);
        assert!(bad.is_err());
    }
}
