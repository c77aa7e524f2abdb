// Reading the list of voters and their weights.

use std::collections::HashSet;

use log::debug;
use snafu::prelude::*;
use snafu::IntoError;
use weighted_voting::Voter;

use crate::polls::*;

/// Reads a file with one `name;weight` record per line. Blank lines and
/// lines starting with `#` are skipped.
pub fn read_voters(path: &str, delimiter: u8) -> BPollsResult<Vec<Voter>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut res: Vec<Voter> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (idx, record_r) in rdr.into_records().enumerate() {
        let record = record_r.map_err(|e| {
            let lineno = e.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
            CsvLineParseSnafu { path, lineno }.into_error(e)
        })?;
        let lineno = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
        debug!("read_voters: {}: {:?}", lineno, record);

        let (name, literal) = match (record.len(), record.get(0), record.get(1)) {
            (2, Some(name), Some(literal)) if !name.is_empty() => (name, literal),
            _ => {
                return Err(Box::new(PollsError::VoterSyntax {
                    path: path.to_string(),
                    lineno,
                    delimiter: delimiter as char,
                    content: record
                        .iter()
                        .collect::<Vec<&str>>()
                        .join(&(delimiter as char).to_string()),
                }))
            }
        };
        let weight = literal.parse::<u64>().ok().context(VoterWeightSnafu {
            path,
            lineno,
            voter: name,
            literal,
        })?;
        if !seen.insert(name.to_string()) {
            return Err(Box::new(PollsError::DuplicateVoter {
                path: path.to_string(),
                lineno,
                voter: name.to_string(),
            }));
        }
        res.push(Voter::new(name, weight));
    }
    Ok(res)
}
