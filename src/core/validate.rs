use super::error::TaxmanError;
use super::types::TaxRequest;

pub const STUDENT_LOAN_PLANS: [&str; 5] = ["plan1", "plan2", "plan4", "postgraduate", "scottish"];

/// Checks a resolved request, stopping at the first violation. `label` only scopes the
/// error message and is `None` for a single check.
pub fn validate_request(request: &TaxRequest, label: Option<&str>) -> Result<(), TaxmanError> {
    let fail = |message: String| -> Result<(), TaxmanError> {
        Err(TaxmanError::validation(label, message))
    };

    if request.year.len() != 4 {
        return fail(format!(
            "year must be a 4-digit number, got: {}",
            request.year
        ));
    }
    if request.year.parse::<i32>().is_err() {
        return fail(format!("year must be a valid number: {}", request.year));
    }

    if request.gross_wage <= 0 {
        return fail("income must be greater than 0".to_string());
    }

    if request.partner_gross_wage > 0 && !request.is_married() {
        return fail(format!(
            "--partner-income requires --married flag\nHint: Use --married --partner-income {}",
            request.partner_gross_wage
        ));
    }

    if request.partner_gross_wage < 0 {
        return fail("--partner-income cannot be negative".to_string());
    }

    if !request.plan.is_empty() && !STUDENT_LOAN_PLANS.contains(&request.plan.as_str()) {
        return fail(format!(
            "invalid student loan plan: {} (must be one of: {})",
            request.plan,
            STUDENT_LOAN_PLANS.join(", ")
        ));
    }

    Ok(())
}
