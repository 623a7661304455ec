pub mod client;
pub mod display;

use clap::{Args, Parser, Subcommand};

use crate::core::resolve::{
    FLAG_AGE, FLAG_BLIND, FLAG_EXTRA, FLAG_INCOME, FLAG_MARRIED, FLAG_NO_NI, FLAG_PARTNER_INCOME,
    FLAG_PENSION, FLAG_REGION, FLAG_STUDENT_LOAN, FLAG_TAX_CODE, FLAG_YEAR, SWITCH_ON,
};
use crate::core::{
    Clock, Config, ScenarioFlags, SystemClock, TaxCalculator, TaxmanError, invoke_all, invoke_one,
    normalize, normalize_results, prepare_check, prepare_comparison, resolve_period,
};
use client::HttpTaxClient;

pub const COMPARE_COMMAND: &str = "compare";

pub const COMPARE_HELP: &str = r#"Compare tax calculations across different job offers, salary levels, or pension contributions.

Each --option group represents one scenario and supports all flags from the 'check' command.
Minimum 2 options required, maximum 4 options supported.

Usage:
  listentotaxman compare --option LABEL --income AMOUNT [flags] --option LABEL --income AMOUNT [flags]...

Global Flags (apply to all options):
  --period PERIOD   Display period (yearly, monthly, weekly, daily, hourly)
  --json            Output as JSON comparison object
  --verbose         Show detailed breakdown including tax brackets

Per-Option Flags (use after each --option):
  --income INT         Gross annual salary (required)
  --year YEAR          Tax year (defaults to current tax year)
  --region REGION      Tax region (default: "uk", alias: "england")
  --age AGE            Age (default: "0")
  --pension VALUE      Pension contribution (e.g., "3%" or "3000")
  --student-loan PLAN  Student loan plan (plan1, plan2, plan4, postgraduate, scottish)
  --extra INT          Extra income/deductions
  --tax-code CODE      Tax code (e.g., "1257L")
  --married            Married status (enables marriage allowance)
  --blind              Blind person's allowance
  --no-ni              Exempt from National Insurance
  --partner-income INT Partner's gross wage (requires --married)

Examples:
  # Compare two job offers
  listentotaxman compare \
    --option "Current Job" --income 100000 --pension 3% \
    --option "New Offer" --income 120000 --pension 5%

  # Compare monthly take-home across salary levels
  listentotaxman compare --period monthly \
    --option "Low" --income 80000 \
    --option "Mid" --income 100000 \
    --option "High" --income 120000

  # Compare marriage allowance impact
  listentotaxman compare \
    --option "Single" --income 100000 \
    --option "Married" --income 100000 --married --partner-income 25000"#;

#[derive(Parser, Debug)]
#[command(
    name = "listentotaxman",
    about = "Calculate UK tax and national insurance using the listentotaxman.com API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check tax calculation for a given salary
    Check(CheckArgs),
    /// Compare tax calculations across multiple scenarios
    #[command(disable_help_flag = true)]
    Compare {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        args: Vec<String>,
    },
    /// Print the version number
    Version,
}

#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    #[arg(long, help = "Gross annual salary (required)")]
    pub income: Option<String>,
    #[arg(long, help = "Tax year (defaults to current tax year)")]
    pub year: Option<String>,
    #[arg(long, help = "Tax region (default: uk)")]
    pub region: Option<String>,
    #[arg(long, help = "Age (default: 0)")]
    pub age: Option<String>,
    #[arg(long, help = "Pension contribution (e.g., 3% or 3000)")]
    pub pension: Option<String>,
    #[arg(long, help = "Student loan plan (plan1, plan2, plan4, postgraduate, scottish)")]
    pub student_loan: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Extra income/deductions")]
    pub extra: Option<String>,
    #[arg(long, help = "Tax code (e.g., 1257L, K12)")]
    pub tax_code: Option<String>,
    #[arg(long, help = "Married status (enables marriage allowance)")]
    pub married: bool,
    #[arg(long, help = "Blind person's allowance")]
    pub blind: bool,
    #[arg(long, help = "Exempt from National Insurance")]
    pub no_ni: bool,
    #[arg(long, allow_hyphen_values = true, help = "Partner's gross wage (requires --married)")]
    pub partner_income: Option<String>,
    #[arg(long, help = "Display period (yearly, monthly, weekly, daily, hourly)")]
    pub period: Option<String>,
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
    #[arg(long, help = "Show detailed breakdown")]
    pub verbose: bool,
}

impl CheckArgs {
    pub fn scenario_flags(&self) -> ScenarioFlags {
        let values = [
            (FLAG_INCOME, &self.income),
            (FLAG_YEAR, &self.year),
            (FLAG_REGION, &self.region),
            (FLAG_AGE, &self.age),
            (FLAG_PENSION, &self.pension),
            (FLAG_STUDENT_LOAN, &self.student_loan),
            (FLAG_EXTRA, &self.extra),
            (FLAG_TAX_CODE, &self.tax_code),
            (FLAG_PARTNER_INCOME, &self.partner_income),
        ];
        let switches = [
            (FLAG_MARRIED, self.married),
            (FLAG_BLIND, self.blind),
            (FLAG_NO_NI, self.no_ni),
        ];

        let mut flags: ScenarioFlags = values
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
            .collect();
        for (name, on) in switches {
            if on {
                flags.set(name, SWITCH_ON);
            }
        }
        flags
    }
}

pub fn version_text() -> String {
    let mut text = format!("listentotaxman version {}", env!("CARGO_PKG_VERSION"));
    if let Some(commit) = option_env!("GIT_COMMIT") {
        text.push_str(&format!("\n  commit: {commit}"));
    }
    if let Some(built) = option_env!("BUILD_DATE") {
        text.push_str(&format!("\n  built: {built}"));
    }
    text
}

pub async fn run_check<C: TaxCalculator>(
    args: &CheckArgs,
    config: &Config,
    calculator: &C,
    clock: &impl Clock,
) -> Result<String, TaxmanError> {
    let request = prepare_check(&args.scenario_flags(), &config.defaults, clock)?;
    let period = resolve_period(args.period.as_deref(), &config.defaults)?;

    let response = invoke_one(calculator, &request).await?;
    let response = normalize(&response, period.name());

    if args.json {
        return Ok(display::render_check_json(&response)?);
    }
    if args.verbose {
        return Ok(display::render_detailed(&response, &request, period));
    }
    Ok(display::render_summary(&response, &request, period))
}

pub async fn run_compare<C: TaxCalculator>(
    argv: &[String],
    config: &Config,
    calculator: &C,
    clock: &impl Clock,
) -> Result<String, TaxmanError> {
    if wants_help(argv) {
        return Ok(COMPARE_HELP.to_string());
    }

    let comparison = prepare_comparison(argv, COMPARE_COMMAND, &config.defaults, clock)?;
    let period = resolve_period(comparison.globals.period.as_deref(), &config.defaults)?;
    tracing::debug!(
        options = comparison.options.len(),
        period = period.name(),
        "comparison prepared"
    );

    let results = invoke_all(calculator, comparison.options).await?;
    let results = normalize_results(results, period);

    if comparison.globals.json {
        return Ok(display::render_comparison_json(&results, period)?);
    }
    Ok(display::render_comparison_table(
        &results,
        comparison.globals.verbose,
    ))
}

fn wants_help(argv: &[String]) -> bool {
    argv.iter()
        .skip_while(|arg| arg.as_str() != COMPARE_COMMAND)
        .any(|arg| arg == "--help" || arg == "-h")
}

pub async fn run(cli: Cli, argv: &[String]) -> Result<String, TaxmanError> {
    match cli.command {
        Command::Version => Ok(version_text()),
        Command::Check(args) => {
            let config = Config::load()?;
            run_check(&args, &config, &HttpTaxClient::new(), &SystemClock).await
        }
        Command::Compare { .. } => {
            let config = Config::load()?;
            run_compare(argv, &config, &HttpTaxClient::new(), &SystemClock).await
        }
    }
}
