pub mod compare;
pub mod config;
pub mod error;
pub mod grammar;
pub mod invoke;
pub mod period;
pub mod resolve;
mod types;
pub mod validate;

pub use compare::{Comparison, ensure_option_count, parse_comparison, prepare_check, prepare_comparison};
pub use config::{Config, Defaults};
pub use error::{CalculationError, FailureKind, TaxmanError};
pub use grammar::GlobalFlags;
pub use invoke::{TaxCalculator, invoke_all, invoke_one};
pub use period::{Period, normalize, normalize_results, resolve_period};
pub use resolve::{Clock, ScenarioFlags, SystemClock};
pub use types::{ComparisonOption, ComparisonResult, PRESENT, TaxBracket, TaxRequest, TaxResponse};
