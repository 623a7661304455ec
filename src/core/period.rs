use std::borrow::Cow;
use std::str::FromStr;

use super::config::Defaults;
use super::error::TaxmanError;
use super::types::{ComparisonResult, TaxResponse};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Period {
    #[default]
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Yearly,
        Period::Monthly,
        Period::Weekly,
        Period::Daily,
        Period::Hourly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Period::Yearly => "yearly",
            Period::Monthly => "monthly",
            Period::Weekly => "weekly",
            Period::Daily => "daily",
            Period::Hourly => "hourly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Yearly => "Yearly",
            Period::Monthly => "Monthly",
            Period::Weekly => "Weekly",
            Period::Daily => "Daily",
            Period::Hourly => "Hourly",
        }
    }

    pub fn divisor(self) -> f64 {
        match self {
            Period::Yearly => 1.0,
            Period::Monthly => 12.0,
            Period::Weekly => 52.0,
            Period::Daily => 365.0,
            // 52 weeks of 40 hours
            Period::Hourly => 2080.0,
        }
    }
}

impl FromStr for Period {
    type Err = TaxmanError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.name() == name)
            .ok_or_else(|| TaxmanError::InvalidPeriod(name.to_string()))
    }
}

pub fn resolve_period(flag: Option<&str>, defaults: &Defaults) -> Result<Period, TaxmanError> {
    match flag {
        Some(name) if !name.is_empty() => name.parse(),
        _ if !defaults.period.is_empty() => defaults.period.parse(),
        _ => Ok(Period::Yearly),
    }
}

pub fn period_divisor(name: &str) -> f64 {
    name.parse::<Period>().map_or(1.0, Period::divisor)
}

/// Rescales every monetary figure of `response` (and of its previous-year chain) to `period`.
/// Bracket rates are left alone. Yearly hands back the same instance.
pub fn normalize<'a>(response: &'a TaxResponse, period: &str) -> Cow<'a, TaxResponse> {
    if period == Period::Yearly.name() {
        return Cow::Borrowed(response);
    }
    Cow::Owned(scaled(response, period_divisor(period)))
}

fn scaled(response: &TaxResponse, divisor: f64) -> TaxResponse {
    TaxResponse {
        tax_year: response.tax_year,
        taxable_pay: response.taxable_pay / divisor,
        gross_pay: response.gross_pay / divisor,
        additional_gross: response.additional_gross / divisor,
        tax_free_allowance: response.tax_free_allowance / divisor,
        tax_paid: response.tax_paid / divisor,
        tax_due: response
            .tax_due
            .iter()
            .map(|(key, bracket)| {
                let mut bracket = *bracket;
                bracket.amount /= divisor;
                (key.clone(), bracket)
            })
            .collect(),
        national_insurance: response.national_insurance / divisor,
        net_pay: response.net_pay / divisor,
        student_loan_repayment: response.student_loan_repayment / divisor,
        pension_hmrc: response.pension_hmrc / divisor,
        pension_you: response.pension_you / divisor,
        pension_claimback: response.pension_claimback / divisor,
        employers_ni: response.employers_ni / divisor,
        tax_free_married: response.tax_free_married / divisor,
        tax_region: response.tax_region.clone(),
        tax_code: response.tax_code.clone(),
        tax_free_marriage_allowance: response.tax_free_marriage_allowance / divisor,
        gross_sacrifice: response.gross_sacrifice / divisor,
        childcare_pre2011: response.childcare_pre2011.clone(),
        debug: response.debug.clone(),
        childcare_amount: response.childcare_amount / divisor,
        previous: response
            .previous
            .as_deref()
            .map(|previous| Box::new(scaled(previous, divisor))),
    }
}

pub fn normalize_results(results: Vec<ComparisonResult>, period: Period) -> Vec<ComparisonResult> {
    if period == Period::Yearly {
        return results;
    }
    results
        .into_iter()
        .map(|result| ComparisonResult {
            response: scaled(&result.response, period.divisor()),
            ..result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaxBracket;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-2;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_response() -> TaxResponse {
        TaxResponse {
            tax_year: 2024,
            taxable_pay: 87_430.0,
            gross_pay: 100_000.0,
            additional_gross: 1_200.0,
            tax_free_allowance: 12_570.0,
            tax_paid: 27_432.0,
            tax_due: [
                ("0".to_string(), TaxBracket { rate: 0.2, amount: 7_540.0 }),
                ("1".to_string(), TaxBracket { rate: 0.4, amount: 19_892.0 }),
            ]
            .into_iter()
            .collect(),
            national_insurance: 4_010.0,
            net_pay: 68_558.0,
            student_loan_repayment: 2_400.0,
            pension_hmrc: 3_000.0,
            pension_you: 5_000.0,
            pension_claimback: 1_000.0,
            employers_ni: 13_800.0,
            tax_free_married: 1_260.0,
            tax_region: "uk".to_string(),
            tax_code: "1257L".to_string(),
            tax_free_marriage_allowance: 1_260.0,
            gross_sacrifice: 600.0,
            childcare_amount: 240.0,
            ..TaxResponse::default()
        }
    }

    #[test]
    fn period_names_round_trip() {
        for period in Period::ALL {
            assert_eq!(period.name().parse::<Period>().expect("known"), period);
        }
        let err = "fortnightly".parse::<Period>().expect_err("unknown");
        assert_eq!(
            err.to_string(),
            "invalid period: fortnightly (must be one of: yearly, monthly, weekly, daily, hourly)"
        );
    }

    #[test]
    fn divisors_match_periods() {
        assert_approx(period_divisor("yearly"), 1.0);
        assert_approx(period_divisor("monthly"), 12.0);
        assert_approx(period_divisor("weekly"), 52.0);
        assert_approx(period_divisor("daily"), 365.0);
        assert_approx(period_divisor("hourly"), 2080.0);
        assert_approx(period_divisor("fortnightly"), 1.0);
    }

    #[test]
    fn resolve_period_prefers_flag_then_config() {
        let defaults = Defaults {
            period: "weekly".to_string(),
            ..Defaults::default()
        };
        assert_eq!(resolve_period(Some("monthly"), &defaults).expect("ok"), Period::Monthly);
        assert_eq!(resolve_period(None, &defaults).expect("ok"), Period::Weekly);
        assert_eq!(resolve_period(Some(""), &defaults).expect("ok"), Period::Weekly);

        let empty = Defaults {
            period: String::new(),
            ..Defaults::default()
        };
        assert_eq!(resolve_period(None, &empty).expect("ok"), Period::Yearly);
        assert!(resolve_period(Some("annually"), &empty).is_err());
    }

    #[test]
    fn yearly_returns_same_instance() {
        let response = sample_response();
        match normalize(&response, "yearly") {
            Cow::Borrowed(same) => assert!(std::ptr::eq(same, &response)),
            Cow::Owned(_) => panic!("yearly normalisation must not copy"),
        }
    }

    #[test]
    fn monthly_divides_every_monetary_field() {
        let response = sample_response();
        let monthly = normalize(&response, "monthly");

        assert_eq!(monthly.tax_year, 2024);
        assert_approx(monthly.gross_pay, 100_000.0 / 12.0);
        assert_approx(monthly.taxable_pay, 87_430.0 / 12.0);
        assert_approx(monthly.additional_gross, 100.0);
        assert_approx(monthly.tax_free_allowance, 12_570.0 / 12.0);
        assert_approx(monthly.tax_paid, 27_432.0 / 12.0);
        assert_approx(monthly.national_insurance, 4_010.0 / 12.0);
        assert_approx(monthly.net_pay, 68_558.0 / 12.0);
        assert_approx(monthly.student_loan_repayment, 200.0);
        assert_approx(monthly.pension_hmrc, 250.0);
        assert_approx(monthly.pension_you, 5_000.0 / 12.0);
        assert_approx(monthly.pension_claimback, 1_000.0 / 12.0);
        assert_approx(monthly.employers_ni, 1_150.0);
        assert_approx(monthly.tax_free_married, 105.0);
        assert_approx(monthly.tax_free_marriage_allowance, 105.0);
        assert_approx(monthly.gross_sacrifice, 50.0);
        assert_approx(monthly.childcare_amount, 20.0);
        assert_eq!(monthly.tax_region, "uk");
        assert_eq!(monthly.tax_code, "1257L");
    }

    #[test]
    fn hourly_and_weekly_use_their_divisors() {
        let response = sample_response();
        assert_approx(normalize(&response, "weekly").net_pay, 68_558.0 / 52.0);
        assert_approx(normalize(&response, "daily").net_pay, 68_558.0 / 365.0);
        assert_approx(normalize(&response, "hourly").gross_pay, 100_000.0 / 2080.0);
    }

    #[test]
    fn bracket_rates_are_preserved_and_input_untouched() {
        let response = sample_response();
        let weekly = normalize(&response, "weekly");

        let basic = weekly.tax_due["0"];
        let higher = weekly.tax_due["1"];
        assert_approx(basic.rate, 0.2);
        assert_approx(higher.rate, 0.4);
        assert_approx(basic.amount, 7_540.0 / 52.0);
        assert_approx(higher.amount, 19_892.0 / 52.0);

        assert_approx(response.tax_due["0"].amount, 7_540.0);
        assert_approx(response.gross_pay, 100_000.0);
    }

    #[test]
    fn previous_year_chain_is_normalised_recursively() {
        let mut response = sample_response();
        let mut previous = sample_response();
        previous.tax_year = 2023;
        previous.gross_pay = 96_000.0;
        let mut oldest = sample_response();
        oldest.tax_year = 2022;
        oldest.gross_pay = 90_000.0;
        previous.previous = Some(Box::new(oldest));
        response.previous = Some(Box::new(previous));

        let monthly = normalize(&response, "monthly");
        let previous = monthly.previous.as_deref().expect("previous kept");
        assert_eq!(previous.tax_year, 2023);
        assert_approx(previous.gross_pay, 8_000.0);
        assert_approx(previous.tax_due["1"].rate, 0.4);
        let oldest = previous.previous.as_deref().expect("oldest kept");
        assert_approx(oldest.gross_pay, 7_500.0);
        assert!(oldest.previous.is_none());
    }

    #[test]
    fn unknown_period_scales_by_one() {
        let response = sample_response();
        let normalized = normalize(&response, "fortnightly");
        assert!(matches!(normalized, Cow::Owned(_)));
        assert_eq!(*normalized, response);
    }

    #[test]
    fn normalize_results_keeps_order_and_labels() {
        let results = vec![
            ComparisonResult {
                label: "A".to_string(),
                request: Default::default(),
                response: sample_response(),
            },
            ComparisonResult {
                label: "B".to_string(),
                request: Default::default(),
                response: TaxResponse {
                    net_pay: 1_200.0,
                    ..sample_response()
                },
            },
        ];

        let unchanged = normalize_results(results.clone(), Period::Yearly);
        assert_eq!(unchanged, results);

        let monthly = normalize_results(results, Period::Monthly);
        assert_eq!(monthly[0].label, "A");
        assert_eq!(monthly[1].label, "B");
        assert_approx(monthly[1].response.net_pay, 100.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_normalisation_scales_money_not_rates(
            net_pay in 0.0f64..1_000_000.0,
            gross_pay in 0.0f64..1_000_000.0,
            previous_gross in 0.0f64..1_000_000.0,
            rate in 0.0f64..1.0,
            amount in 0.0f64..500_000.0,
            period_index in 1usize..5,
        ) {
            let period = Period::ALL[period_index];
            let response = TaxResponse {
                net_pay,
                gross_pay,
                tax_due: [("2".to_string(), TaxBracket { rate, amount })].into_iter().collect(),
                previous: Some(Box::new(TaxResponse {
                    gross_pay: previous_gross,
                    ..TaxResponse::default()
                })),
                ..TaxResponse::default()
            };

            let normalized = normalize(&response, period.name());
            let divisor = period.divisor();
            prop_assert!((normalized.net_pay - net_pay / divisor).abs() <= EPS);
            prop_assert!((normalized.gross_pay - gross_pay / divisor).abs() <= EPS);
            prop_assert!((normalized.tax_due["2"].rate - rate).abs() <= f64::EPSILON);
            prop_assert!((normalized.tax_due["2"].amount - amount / divisor).abs() <= EPS);
            let previous = normalized.previous.as_deref().expect("previous kept");
            prop_assert!((previous.gross_pay - previous_gross / divisor).abs() <= EPS);
        }
    }
}
