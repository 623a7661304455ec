use thiserror::Error;

use super::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Encode,
    Transport,
    Status(u16),
    Decode,
}

/// Failure reported by a tax calculator. `message` is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CalculationError {
    pub kind: FailureKind,
    pub message: String,
}

impl CalculationError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TaxmanError {
    #[error("{0}")]
    Grammar(String),
    #[error("{}", scoped(.label, .message))]
    Validation {
        label: Option<String>,
        message: String,
    },
    #[error("invalid period: {0} (must be one of: yearly, monthly, weekly, daily, hourly)")]
    InvalidPeriod(String),
    #[error("{}", calculation_failure(.label, .source))]
    Calculation {
        label: Option<String>,
        #[source]
        source: CalculationError,
    },
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to marshal JSON: {0}")]
    Output(#[from] serde_json::Error),
}

impl TaxmanError {
    pub fn grammar(message: impl Into<String>) -> Self {
        TaxmanError::Grammar(message.into())
    }

    pub fn validation(label: Option<&str>, message: impl Into<String>) -> Self {
        TaxmanError::Validation {
            label: label.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn with_label(self, label: &str) -> Self {
        match self {
            TaxmanError::Validation {
                label: None,
                message,
            } => TaxmanError::Validation {
                label: Some(label.to_string()),
                message,
            },
            other => other,
        }
    }
}

fn scoped(label: &Option<String>, message: &str) -> String {
    match label {
        Some(label) => format!("option '{label}': {message}"),
        None => message.to_string(),
    }
}

fn calculation_failure(label: &Option<String>, source: &CalculationError) -> String {
    match label {
        Some(label) => format!("failed to calculate tax for option '{label}': {source}"),
        None => format!("failed to calculate tax: {source}"),
    }
}
