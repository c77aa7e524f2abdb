// Primitives for reading and writing the ballot table.
//
// The first row holds an empty cell followed by the names of the polls. Each
// following row holds the name of a voter and one cell per poll.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use snafu::prelude::*;
use snafu::IntoError;
use weighted_voting::*;

use crate::polls::*;

/// Writes an empty ballot table: the header and one blank row per voter.
pub fn write_template(
    path: &str,
    polls: &[PollDefinition],
    voters: &[Voter],
    delimiter: u8,
) -> BPollsResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .context(CsvWriteSnafu { path })?;
    let header = std::iter::once("").chain(polls.iter().map(|p| p.name()));
    wtr.write_record(header).context(CsvWriteSnafu { path })?;
    for voter in voters.iter() {
        let row = std::iter::once(voter.name.as_str()).chain(polls.iter().map(|_| ""));
        wtr.write_record(row).context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(WritingFileSnafu { path })?;
    Ok(())
}

/// Reads the ballot table and returns one builder per poll, holding the
/// ballots of every voter.
///
/// Voters of the list that have no row in the table abstain in all the polls.
pub fn read_ballot_table(
    path: &str,
    polls: &[PollDefinition],
    voters: &[Voter],
    delimiter: u8,
) -> BPollsResult<Vec<Builder>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header = match records.next() {
        Some(header_r) => header_r.context(CsvLineParseSnafu { path, lineno: 1u64 })?,
        None => return Err(Box::new(PollsError::EmptyTable { path: path.to_string() })),
    };
    check_header(path, &header, polls)?;

    let voters_by_name: HashMap<&str, &Voter> =
        voters.iter().map(|v| (v.name.as_str(), v)).collect();
    let mut builders: Vec<Builder> = polls.iter().map(Builder::new).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for (idx, record_r) in records.enumerate() {
        let record = record_r.map_err(|e| {
            let lineno = e.position().map(|p| p.line()).unwrap_or(idx as u64 + 2);
            CsvLineParseSnafu { path, lineno }.into_error(e)
        })?;
        let lineno = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 2);
        debug!("read_ballot_table: {}: {:?}", lineno, record);

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        ensure!(
            record.len() == polls.len() + 1,
            CsvLineWrongLengthSnafu {
                path,
                lineno,
                found: record.len(),
                expected: polls.len() + 1,
            }
        );
        let name = record.get(0).unwrap_or_default().trim();
        let voter = *voters_by_name.get(name).context(UnknownVoterSnafu {
            path,
            lineno,
            voter: name,
        })?;
        ensure!(
            seen.insert(voter.name.as_str()),
            DuplicateVoterSnafu {
                path,
                lineno,
                voter: name,
            }
        );

        for (idx, (builder, cell)) in builders.iter_mut().zip(record.iter().skip(1)).enumerate() {
            builder.add_cell(voter, cell).context(BallotParseSnafu {
                path,
                lineno,
                column: idx + 2,
            })?;
        }
    }

    for voter in voters.iter().filter(|v| !seen.contains(v.name.as_str())) {
        warn!(
            "Voter {:?} (weight {}) has no row in {}, counted as abstaining",
            voter.name, voter.weight, path
        );
        for builder in builders.iter_mut() {
            builder.add_abstention(voter).context(BallotParseSnafu {
                path,
                lineno: 0u64,
                column: 0usize,
            })?;
        }
    }
    Ok(builders)
}

fn check_header(path: &str, header: &csv::StringRecord, polls: &[PollDefinition]) -> PollsResult<()> {
    let num_columns = header.len().max(polls.len() + 1);
    for col in 1..num_columns {
        let expected = polls.get(col - 1).map(|p| p.name()).unwrap_or_default();
        let found = header.get(col).unwrap_or_default().trim();
        ensure!(
            expected == found,
            HeaderMismatchSnafu {
                path,
                column: col + 1,
                expected,
                found,
            }
        );
    }
    Ok(())
}
