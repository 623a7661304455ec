use super::config::Defaults;
use super::error::TaxmanError;
use super::grammar::{GlobalFlags, parse_comparison_args};
use super::resolve::{Clock, ScenarioFlags, resolve_request};
use super::types::{ComparisonOption, TaxRequest};
use super::validate::validate_request;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub globals: GlobalFlags,
    pub options: Vec<ComparisonOption>,
}

pub fn parse_comparison(
    args: &[String],
    command: &str,
    defaults: &Defaults,
    clock: &impl Clock,
) -> Result<(GlobalFlags, Vec<ComparisonOption>), TaxmanError> {
    let (globals, scenarios) = parse_comparison_args(args, command)?;
    let options = scenarios
        .into_iter()
        .map(|scenario| {
            let request = resolve_request(&scenario.flags, defaults, clock)
                .map_err(|err| err.with_label(&scenario.label))?;
            Ok(ComparisonOption {
                label: scenario.label,
                request,
            })
        })
        .collect::<Result<Vec<_>, TaxmanError>>()?;
    Ok((globals, options))
}

pub fn ensure_option_count(count: usize) -> Result<(), TaxmanError> {
    if count < MIN_OPTIONS {
        return Err(TaxmanError::grammar(format!(
            "at least {MIN_OPTIONS} options required for comparison (use --option to define each scenario)"
        )));
    }
    if count > MAX_OPTIONS {
        return Err(TaxmanError::grammar(format!(
            "maximum {MAX_OPTIONS} options supported for comparison (found {count})"
        )));
    }
    Ok(())
}

/// Full front half of `compare`: parse, resolve, bound the option count, then validate every
/// option before any of them may be sent.
pub fn prepare_comparison(
    args: &[String],
    command: &str,
    defaults: &Defaults,
    clock: &impl Clock,
) -> Result<Comparison, TaxmanError> {
    let (globals, options) = parse_comparison(args, command, defaults, clock)?;
    ensure_option_count(options.len())?;
    for option in &options {
        validate_request(&option.request, Some(&option.label))?;
    }
    Ok(Comparison { globals, options })
}

pub fn prepare_check(
    flags: &ScenarioFlags,
    defaults: &Defaults,
    clock: &impl Clock,
) -> Result<TaxRequest, TaxmanError> {
    let request = resolve_request(flags, defaults, clock)?;
    validate_request(&request, None)?;
    Ok(request)
}
