use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Indian assessment year.
///
/// Identified by the calendar year it starts in, so `AssessmentYear(2026)`
/// is "AY 2026-27". Income assessed in that year is earned during the
/// preceding financial year (1 April 2025 to 31 March 2026).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct AssessmentYear(pub i32);

impl AssessmentYear {
    pub const CURRENT: AssessmentYear = AssessmentYear(2026);

    /// Display as "2026-27"
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1) % 100)
    }

    /// The financial year the income was earned in, e.g. "2025-26"
    pub fn financial_year(&self) -> String {
        AssessmentYear(self.0 - 1).display()
    }

    pub fn financial_year_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0 - 1, 4, 1)
    }

    pub fn financial_year_end(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 3, 31)
    }

    /// Calendar date of a day/month inside the financial year.
    ///
    /// April to December fall in the first calendar year of the financial
    /// year, January to March in the second.
    pub fn due_date(&self, month: u32, day: u32) -> Option<NaiveDate> {
        let year = if month >= 4 { self.0 - 1 } else { self.0 };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl std::fmt::Display for AssessmentYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AY {}", self.display())
    }
}

impl Default for AssessmentYear {
    fn default() -> Self {
        AssessmentYear::CURRENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(AssessmentYear(2026).display(), "2026-27");
        assert_eq!(AssessmentYear(2026).financial_year(), "2025-26");
        assert_eq!(AssessmentYear(2099).display(), "2099-00");
        assert_eq!(AssessmentYear(2026).to_string(), "AY 2026-27");
    }

    #[test]
    fn financial_year_bounds() {
        let ay = AssessmentYear(2026);
        assert_eq!(
            ay.financial_year_start(),
            NaiveDate::from_ymd_opt(2025, 4, 1)
        );
        assert_eq!(
            ay.financial_year_end(),
            NaiveDate::from_ymd_opt(2026, 3, 31)
        );
    }

    #[test]
    fn due_dates_straddle_calendar_years() {
        let ay = AssessmentYear(2026);
        assert_eq!(ay.due_date(6, 15), NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(ay.due_date(12, 15), NaiveDate::from_ymd_opt(2025, 12, 15));
        assert_eq!(ay.due_date(3, 15), NaiveDate::from_ymd_opt(2026, 3, 15));
    }

    #[test]
    fn invalid_due_date() {
        assert_eq!(AssessmentYear(2026).due_date(2, 30), None);
    }
}
