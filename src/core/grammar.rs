//! Tokenizer for the `compare` command line.
//!
//! The remainder after the command token is one prefix of global flags followed by chunks, each
//! opened by `--option LABEL`. Inside a chunk, `--name value` pairs are told apart from bare
//! switches by lookahead only: a token starting with `--` is never taken as a value, so
//! `--tax-code --foo` records `tax-code` as a switch rather than the string `--foo`.

use super::error::TaxmanError;
use super::resolve::{SCENARIO_FLAGS, SWITCH_ON, ScenarioFlags};

pub const OPTION_MARKER: &str = "--option";
pub const PERIOD_FLAG: &str = "--period";
pub const JSON_FLAG: &str = "--json";
pub const VERBOSE_FLAG: &str = "--verbose";

const FLAG_PREFIX: &str = "--";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalFlags {
    pub period: Option<String>,
    pub json: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScenario {
    pub label: String,
    pub flags: ScenarioFlags,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Token<'a> {
    Marker,
    Period,
    Switch,
    Flag(&'a str),
    Value(&'a str),
}

impl<'a> Token<'a> {
    fn classify(raw: &'a str) -> Self {
        match raw {
            OPTION_MARKER => Token::Marker,
            PERIOD_FLAG => Token::Period,
            JSON_FLAG | VERBOSE_FLAG => Token::Switch,
            _ => match raw.strip_prefix(FLAG_PREFIX) {
                Some(name) => Token::Flag(name),
                None => Token::Value(raw),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ChunkState<'a> {
    Ready,
    AwaitingValue(&'a str),
    SkippingPeriodValue,
}

pub fn parse_comparison_args(
    args: &[String],
    command: &str,
) -> Result<(GlobalFlags, Vec<RawScenario>), TaxmanError> {
    let command_index = args
        .iter()
        .position(|arg| arg == command)
        .ok_or_else(|| TaxmanError::grammar(format!("{command} command not found in args")))?;
    let rest = &args[command_index + 1..];

    let globals = scan_global_flags(rest);

    let markers: Vec<usize> = rest
        .iter()
        .enumerate()
        .filter(|(_, arg)| arg.as_str() == OPTION_MARKER)
        .map(|(index, _)| index)
        .collect();
    let Some(&first_marker) = markers.first() else {
        return Err(TaxmanError::grammar(
            "no options specified (use --option to define each scenario)",
        ));
    };

    log_stray_prefix_tokens(&rest[..first_marker]);

    let mut scenarios = Vec::with_capacity(markers.len());
    for (position, &start) in markers.iter().enumerate() {
        let end = markers.get(position + 1).copied().unwrap_or(rest.len());
        scenarios.push(parse_option_chunk(&rest[start..end])?);
    }

    Ok((globals, scenarios))
}

fn scan_global_flags(tokens: &[String]) -> GlobalFlags {
    let mut globals = GlobalFlags::default();
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        match token.as_str() {
            PERIOD_FLAG => {
                if let Some(value) = iter.next() {
                    globals.period = Some(value.clone());
                }
            }
            JSON_FLAG => globals.json = true,
            VERBOSE_FLAG => globals.verbose = true,
            _ => {}
        }
    }
    globals
}

fn log_stray_prefix_tokens(prefix: &[String]) {
    let mut iter = prefix.iter();
    while let Some(token) = iter.next() {
        match Token::classify(token) {
            Token::Period => {
                iter.next();
            }
            Token::Switch => {}
            _ => tracing::debug!(token = %token, "ignoring token before first --option"),
        }
    }
}

pub fn parse_option_chunk(chunk: &[String]) -> Result<RawScenario, TaxmanError> {
    let [_marker, label, body @ ..] = chunk else {
        return Err(TaxmanError::grammar("--option requires a label"));
    };

    let mut flags = ScenarioFlags::new();
    let mut state = ChunkState::Ready;
    for raw in body {
        let token = Token::classify(raw);
        state = match (state, token) {
            (ChunkState::SkippingPeriodValue, _) => ChunkState::Ready,
            (ChunkState::AwaitingValue(name), Token::Value(value)) => {
                flags.set(name, value);
                ChunkState::Ready
            }
            (ChunkState::AwaitingValue(name), next) => {
                flags.set(name, SWITCH_ON);
                start_token(next)
            }
            (ChunkState::Ready, next) => start_token(next),
        };
    }
    if let ChunkState::AwaitingValue(name) = state {
        flags.set(name, SWITCH_ON);
    }

    for name in flags.names() {
        if !SCENARIO_FLAGS.contains(&name) {
            tracing::warn!(option = %label, flag = %name, "ignoring unknown flag");
        }
    }

    Ok(RawScenario {
        label: label.clone(),
        flags,
    })
}

fn start_token(token: Token<'_>) -> ChunkState<'_> {
    match token {
        Token::Period => ChunkState::SkippingPeriodValue,
        Token::Flag(name) => ChunkState::AwaitingValue(name),
        Token::Marker | Token::Switch | Token::Value(_) => ChunkState::Ready,
    }
}
