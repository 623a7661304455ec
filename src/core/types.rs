use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const PRESENT: &str = "y";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxRequest {
    pub year: String,
    #[serde(rename = "taxregion")]
    pub tax_region: String,
    pub age: String,
    pub pension: String,
    #[serde(rename = "grosswage")]
    pub gross_wage: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plan: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub extra: i64,
    #[serde(rename = "taxcode", skip_serializing_if = "String::is_empty")]
    pub tax_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub married: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub blind: String,
    #[serde(rename = "exNI", skip_serializing_if = "String::is_empty")]
    pub ex_ni: String,
    #[serde(rename = "partnerGrossWage", skip_serializing_if = "is_zero")]
    pub partner_gross_wage: i64,
}

impl TaxRequest {
    pub fn is_married(&self) -> bool {
        self.married == PRESENT
    }

    pub fn is_blind(&self) -> bool {
        self.blind == PRESENT
    }

    pub fn is_ni_exempt(&self) -> bool {
        self.ex_ni == PRESENT
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub rate: f64,
    pub amount: f64,
}

/// Result of one calculation. `previous` holds the prior tax year's figures when the service
/// returns them; the chain ends at the first `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxResponse {
    pub tax_year: i32,
    pub taxable_pay: f64,
    pub gross_pay: f64,
    pub additional_gross: f64,
    pub tax_free_allowance: f64,
    pub tax_paid: f64,
    pub tax_due: HashMap<String, TaxBracket>,
    pub national_insurance: f64,
    pub net_pay: f64,
    pub student_loan_repayment: f64,
    pub pension_hmrc: f64,
    pub pension_you: f64,
    pub pension_claimback: f64,
    pub employers_ni: f64,
    pub tax_free_married: f64,
    pub tax_region: String,
    pub tax_code: String,
    pub tax_free_marriage_allowance: f64,
    pub gross_sacrifice: f64,
    pub childcare_pre2011: serde_json::Value,
    pub debug: serde_json::Value,
    pub childcare_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Box<TaxResponse>>,
}

impl TaxResponse {
    pub fn bracket_amount(&self, key: &str) -> f64 {
        self.tax_due.get(key).map_or(0.0, |bracket| bracket.amount)
    }

    pub fn total_cost(&self) -> f64 {
        self.gross_pay + self.employers_ni + self.pension_hmrc
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonOption {
    pub label: String,
    pub request: TaxRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub label: String,
    pub request: TaxRequest,
    pub response: TaxResponse,
}
