use std::future::Future;

use super::error::{CalculationError, TaxmanError};
use super::types::{ComparisonOption, ComparisonResult, TaxRequest, TaxResponse};

pub trait TaxCalculator {
    fn calculate(
        &self,
        request: &TaxRequest,
    ) -> impl Future<Output = Result<TaxResponse, CalculationError>> + Send;
}

/// Submits each option in order, one at a time. The first failure stops the run and names the
/// option that caused it; later options are never sent.
pub async fn invoke_all<C: TaxCalculator>(
    calculator: &C,
    options: Vec<ComparisonOption>,
) -> Result<Vec<ComparisonResult>, TaxmanError> {
    let mut results = Vec::with_capacity(options.len());
    for option in options {
        tracing::info!(option = %option.label, income = option.request.gross_wage, "calculating");
        let response = calculator
            .calculate(&option.request)
            .await
            .map_err(|source| TaxmanError::Calculation {
                label: Some(option.label.clone()),
                source,
            })?;
        results.push(ComparisonResult {
            label: option.label,
            request: option.request,
            response,
        });
    }
    Ok(results)
}

pub async fn invoke_one<C: TaxCalculator>(
    calculator: &C,
    request: &TaxRequest,
) -> Result<TaxResponse, TaxmanError> {
    tracing::info!(income = request.gross_wage, "calculating");
    calculator
        .calculate(request)
        .await
        .map_err(|source| TaxmanError::Calculation {
            label: None,
            source,
        })
}
