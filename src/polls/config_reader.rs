use crate::polls::*;

use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

/// One poll, as written in the poll definitions file.
///
/// All the attributes are optional at this level so that a missing one can
/// be reported with the poll it belongs to.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(rename = "type")]
    pub poll_type: Option<String>,
    pub name: Option<String>,
    pub percent: Option<JSValue>,
    #[serde(rename = "allVotes")]
    pub all_votes: Option<JSValue>,
    #[serde(rename = "maxValue", skip_serializing_if = "Option::is_none")]
    pub max_value: Option<JSValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PollsConfig {
    pub polls: Vec<PollConfig>,
}

const TRUE_TOKEN: &str = "True";
const FALSE_TOKEN: &str = "False";

pub fn read_polls(path: &str) -> BPollsResult<Vec<PollDefinition>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    Ok(parse_polls(&contents, path)?)
}

pub fn parse_polls(contents: &str, path: &str) -> PollsResult<Vec<PollDefinition>> {
    let config: PollsConfig = serde_json::from_str(contents).context(ParsingJsonSnafu { path })?;
    config
        .polls
        .iter()
        .enumerate()
        .map(|(idx, pc)| validate_poll(idx + 1, pc))
        .collect()
}

pub fn write_polls(path: &str, polls: &[PollDefinition]) -> BPollsResult<()> {
    let config = PollsConfig {
        polls: polls.iter().map(to_poll_config).collect(),
    };
    let js = serde_json::to_string_pretty(&config).context(WritingJsonSnafu {})?;
    fs::write(path, js).context(WritingFileSnafu { path })?;
    Ok(())
}

/// The persisted form of a definition: numbers as decimal text and flags as
/// `True`/`False`.
pub fn to_poll_config(definition: &PollDefinition) -> PollConfig {
    let mut pc = PollConfig {
        poll_type: Some(definition.tag().to_string()),
        name: Some(definition.name().to_string()),
        percent: Some(JSValue::String(definition.threshold().to_string())),
        all_votes: Some(JSValue::String(
            flag_token(definition.count_abstentions()).to_string(),
        )),
        ..PollConfig::default()
    };
    match definition {
        PollDefinition::Median(p) => {
            pc.max_value = Some(JSValue::String(p.max_value.to_string()));
        }
        PollDefinition::Schulze(p) => {
            pc.options = Some(p.options.clone());
        }
    }
    pc
}

fn flag_token(b: bool) -> &'static str {
    if b {
        TRUE_TOKEN
    } else {
        FALSE_TOKEN
    }
}

fn validate_poll(index: usize, pc: &PollConfig) -> PollsResult<PollDefinition> {
    let name = match &pc.name {
        Some(n) => n.clone(),
        None => return invalid(index, "", "missing attribute 'name'"),
    };
    let threshold = match read_js_threshold(&pc.percent) {
        Ok(t) => t,
        Err(msg) => return invalid(index, &name, msg),
    };
    let count_abstentions = match read_js_flag(&pc.all_votes) {
        Ok(b) => b,
        Err(msg) => return invalid(index, &name, msg),
    };

    let res = match pc.poll_type.as_deref() {
        Some(t) if t == PollDefinition::MEDIAN_TAG => {
            let max_value = match read_js_amount(&pc.max_value) {
                Ok(x) => x,
                Err(msg) => return invalid(index, &name, msg),
            };
            PollDefinition::Median(MedianPoll {
                name,
                threshold,
                count_abstentions,
                max_value,
            })
        }
        Some(t) if t == PollDefinition::SCHULZE_TAG => {
            let options = match &pc.options {
                Some(opts) if !opts.is_empty() => opts.clone(),
                Some(_) => return invalid(index, &name, "a schulze poll needs at least one option"),
                None => return invalid(index, &name, "missing attribute 'options'"),
            };
            PollDefinition::Schulze(SchulzePoll {
                name,
                threshold,
                count_abstentions,
                options,
            })
        }
        Some(t) => return invalid(index, &name, format!("unknown poll type {:?}", t)),
        None => return invalid(index, &name, "missing attribute 'type'"),
    };
    debug!("validate_poll: #{}: {:?}", index, res);
    Ok(res)
}

fn invalid<T>(index: usize, name: &str, message: impl Into<String>) -> PollsResult<T> {
    DefinitionParseSnafu {
        index,
        name,
        message: message.into(),
    }
    .fail()
}

// Numbers may be written as JSON numbers or as decimal text.
fn read_js_threshold(x: &Option<JSValue>) -> Result<Threshold, String> {
    let s = match x {
        Some(JSValue::Number(n)) => n.to_string(),
        Some(JSValue::String(s)) => s.clone(),
        Some(other) => return Err(format!("'percent' must be a number, found {}", other)),
        None => return Err("missing attribute 'percent'".to_string()),
    };
    s.parse::<Threshold>()
        .map_err(|e| format!("invalid attribute 'percent': {}", e))
}

fn read_js_flag(x: &Option<JSValue>) -> Result<bool, String> {
    match x {
        Some(JSValue::String(s)) if s == TRUE_TOKEN => Ok(true),
        Some(JSValue::String(s)) if s == FALSE_TOKEN => Ok(false),
        Some(JSValue::Bool(b)) => Ok(*b),
        Some(other) => Err(format!(
            "'allVotes' must be {} or {}, found {}",
            TRUE_TOKEN, FALSE_TOKEN, other
        )),
        None => Err("missing attribute 'allVotes'".to_string()),
    }
}

fn read_js_amount(x: &Option<JSValue>) -> Result<f64, String> {
    let value = match x {
        Some(JSValue::Number(n)) => n.as_f64(),
        Some(JSValue::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
        None => return Err("missing attribute 'maxValue'".to_string()),
    };
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!(
            "'maxValue' must be a non-negative number, found {}",
            x.as_ref().map(|v| v.to_string()).unwrap_or_default()
        )),
    }
}
