// The JSON summary of the results, and its comparison with a reference.

use std::fs;

use log::{info, warn};
use serde_json::{json, Value as JSValue};
use snafu::prelude::*;
use text_diff::print_diff;
use weighted_voting::*;

use crate::polls::config_reader::to_poll_config;
use crate::polls::*;

// Counts are written as strings, as in the reference summaries.
fn count_js(x: u64) -> JSValue {
    json!(x.to_string())
}

fn matrix_js(m: &[Vec<u64>]) -> JSValue {
    JSValue::Array(
        m.iter()
            .map(|row| JSValue::Array(row.iter().map(|x| count_js(*x)).collect()))
            .collect(),
    )
}

fn median_js(res: &MedianResult) -> JSValue {
    let votes: Vec<JSValue> = res
        .counted
        .iter()
        .map(|b| {
            json!({
                "voter": b.voter,
                "weight": count_js(b.weight),
                "value": b.value.map(|v| v.to_string()),
            })
        })
        .collect();
    json!({
        "totalWeight": count_js(res.total_weight),
        "requiredWeight": count_js(res.required_weight),
        "acceptedValue": res.accepted_value.map(|v| v.to_string()),
        "votes": votes,
    })
}

// Options without a name are shown by their index.
fn schulze_js(options: &[String], res: &SchulzeResult) -> JSValue {
    let option_name = |idx: &usize| options.get(*idx).cloned().unwrap_or_else(|| idx.to_string());
    let ranking: Vec<Vec<String>> = res
        .ranked_groups
        .iter()
        .map(|group| group.iter().map(option_name).collect())
        .collect();
    let votes: Vec<JSValue> = res
        .counted
        .iter()
        .map(|b| {
            json!({
                "voter": b.voter,
                "weight": count_js(b.weight),
                "ranking": b.ranking().map(|r| {
                    r.iter().map(|x| x.to_string()).collect::<Vec<String>>().join(" ")
                }),
            })
        })
        .collect();
    json!({
        "totalWeight": count_js(res.total_weight),
        "requiredWeight": count_js(res.required_weight),
        "defeats": matrix_js(&res.defeats),
        "strongestPaths": matrix_js(&res.strongest_paths),
        "ranking": ranking,
        "votes": votes,
    })
}

/// The summary of all the polls: for each one, its definition and its
/// results.
pub fn build_summary_js(results: &[(PollDefinition, EvaluationResult)]) -> JSValue {
    let polls: Vec<JSValue> = results
        .iter()
        .map(|(definition, result)| {
            let result_js = match (definition, result) {
                (PollDefinition::Schulze(poll), EvaluationResult::Schulze(res)) => {
                    schulze_js(&poll.options, res)
                }
                (_, EvaluationResult::Schulze(res)) => schulze_js(&[], res),
                (_, EvaluationResult::Median(res)) => median_js(res),
            };
            json!({
                "config": to_poll_config(definition),
                "results": result_js,
            })
        })
        .collect();
    json!({ "polls": polls })
}

/// Writes the summary to a file, or to the standard output if no file is
/// given (or the file is `stdout`).
pub fn write_summary(pretty: &str, out: Option<&str>) -> BPollsResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", pretty);
        }
        Some(path) => {
            fs::write(path, pretty).context(WritingFileSnafu { path })?;
            info!("Wrote the summary to {}", path);
        }
    }
    Ok(())
}

/// Compares the summary with a reference summary. The reference is
/// normalized through the JSON pretty printer first.
pub fn check_reference(pretty: &str, reference_path: &str) -> BPollsResult<()> {
    let contents = fs::read_to_string(reference_path).context(OpeningFileSnafu {
        path: reference_path,
    })?;
    let reference: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu {
        path: reference_path,
    })?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(WritingJsonSnafu {})?;
    if pretty_reference != pretty {
        warn!("Found differences with the reference summary {}", reference_path);
        print_diff(pretty_reference.as_str(), pretty, "\n");
        return Err(Box::new(PollsError::ReferenceMismatch {}));
    }
    Ok(())
}
