use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::config::Defaults;
use super::error::TaxmanError;
use super::types::{PRESENT, TaxRequest};

pub const FLAG_YEAR: &str = "year";
pub const FLAG_REGION: &str = "region";
pub const FLAG_AGE: &str = "age";
pub const FLAG_PENSION: &str = "pension";
pub const FLAG_INCOME: &str = "income";
pub const FLAG_STUDENT_LOAN: &str = "student-loan";
pub const FLAG_EXTRA: &str = "extra";
pub const FLAG_TAX_CODE: &str = "tax-code";
pub const FLAG_MARRIED: &str = "married";
pub const FLAG_BLIND: &str = "blind";
pub const FLAG_NO_NI: &str = "no-ni";
pub const FLAG_PARTNER_INCOME: &str = "partner-income";

pub const SCENARIO_FLAGS: [&str; 12] = [
    FLAG_YEAR,
    FLAG_REGION,
    FLAG_AGE,
    FLAG_PENSION,
    FLAG_INCOME,
    FLAG_STUDENT_LOAN,
    FLAG_EXTRA,
    FLAG_TAX_CODE,
    FLAG_MARRIED,
    FLAG_BLIND,
    FLAG_NO_NI,
    FLAG_PARTNER_INCOME,
];

pub const SWITCH_ON: &str = "true";

const DEFAULT_REGION: &str = "uk";
const DEFAULT_AGE: &str = "0";

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFlags {
    values: BTreeMap<String, String>,
}

impl ScenarioFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_switched_on(&self, name: &str) -> bool {
        self.get(name) == Some(SWITCH_ON)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ScenarioFlags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut flags = ScenarioFlags::new();
        for (name, value) in iter {
            flags.set(name, value);
        }
        flags
    }
}

/// Tax year to use when neither a flag nor the config names one. The new tax year counts from
/// any instant strictly after 00:00:00 UTC on 5 April.
pub fn default_tax_year(now: DateTime<Utc>) -> String {
    let year = now.year();
    let boundary = NaiveDate::from_ymd_opt(year, 4, 5)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc());

    match boundary {
        Some(boundary) if now > boundary => year.to_string(),
        _ => (year - 1).to_string(),
    }
}

pub fn normalize_region(region: String) -> String {
    if region == "england" {
        DEFAULT_REGION.to_string()
    } else {
        region
    }
}

pub fn resolve_request(
    flags: &ScenarioFlags,
    defaults: &Defaults,
    clock: &impl Clock,
) -> Result<TaxRequest, TaxmanError> {
    let year = match flags.get(FLAG_YEAR) {
        Some(year) => year.to_string(),
        None if !defaults.year.is_empty() => defaults.year.clone(),
        None => default_tax_year(clock.now()),
    };

    let mut request = TaxRequest {
        year,
        tax_region: layered(flags.get(FLAG_REGION), &defaults.region, DEFAULT_REGION),
        age: layered(flags.get(FLAG_AGE), &defaults.age, DEFAULT_AGE),
        pension: layered(flags.get(FLAG_PENSION), &defaults.pension, ""),
        plan: layered(flags.get(FLAG_STUDENT_LOAN), &defaults.student_loan, ""),
        tax_code: layered(flags.get(FLAG_TAX_CODE), &defaults.tax_code, ""),
        ..TaxRequest::default()
    };

    request.extra = match flags.get(FLAG_EXTRA) {
        Some(raw) => parse_amount(FLAG_EXTRA, raw)?,
        None => defaults.extra,
    };

    request.gross_wage = match flags.get(FLAG_INCOME) {
        Some(raw) => parse_amount(FLAG_INCOME, raw)?,
        None => return Err(TaxmanError::validation(None, "income is required")),
    };

    request.married = presence(flags.is_switched_on(FLAG_MARRIED) || defaults.married);
    request.blind = presence(flags.is_switched_on(FLAG_BLIND) || defaults.blind);
    request.ex_ni = presence(flags.is_switched_on(FLAG_NO_NI) || defaults.no_ni);

    request.partner_gross_wage = match flags.get(FLAG_PARTNER_INCOME) {
        Some(raw) => parse_amount(FLAG_PARTNER_INCOME, raw)?,
        None => defaults.partner_income,
    };

    request.tax_region = normalize_region(request.tax_region);
    Ok(request)
}

fn layered(flag: Option<&str>, config: &str, fallback: &str) -> String {
    match flag {
        Some(value) => value.to_string(),
        None if !config.is_empty() => config.to_string(),
        None => fallback.to_string(),
    }
}

fn presence(set: bool) -> String {
    if set { PRESENT.to_string() } else { String::new() }
}

fn parse_amount(name: &str, raw: &str) -> Result<i64, TaxmanError> {
    raw.parse::<i64>()
        .map_err(|_| TaxmanError::validation(None, format!("{name} must be a valid number: {raw}")))
}
