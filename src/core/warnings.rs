use rust_decimal::Decimal;
use serde::Serialize;

/// Notes raised while assessing a statement. None of them stop the
/// computation; they explain figures a reader might not expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// House property netted to a loss, which is not set off against other heads.
    HousePropertyLossNotSetOff { loss: Decimal },
    /// Capital gains were present so the surcharge rate was capped.
    SurchargeRateCapped {
        tier_rate: Decimal,
        applied_rate: Decimal,
    },
    /// Part of the pooled basic exemption had nothing left to shield.
    BasicExemptionForfeited { unused: Decimal },
    /// Chapter VI-A deductions (80C, 80D, HRA, ...) are not part of the computation.
    ItemizedDeductionsNotModeled,
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::HousePropertyLossNotSetOff { loss } => format!(
                "House property loss of {:.2} is not set off against other income",
                loss
            ),
            Warning::SurchargeRateCapped {
                tier_rate,
                applied_rate,
            } => format!(
                "Surcharge capped at {:.0}% (tier rate {:.0}%) as capital gains are present",
                applied_rate * Decimal::ONE_HUNDRED,
                tier_rate * Decimal::ONE_HUNDRED
            ),
            Warning::BasicExemptionForfeited { unused } => format!(
                "{:.2} of the basic exemption was unused and is not carried over",
                unused
            ),
            Warning::ItemizedDeductionsNotModeled => {
                "Deductions such as 80C, 80D and HRA are not included in this computation"
                    .to_string()
            }
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}
