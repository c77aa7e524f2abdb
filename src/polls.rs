use log::{debug, info};

use snafu::{prelude::*, Snafu};
use weighted_voting::*;

use crate::args::Args;

pub mod config_reader;
pub mod io_csv;
pub mod io_voters;
pub mod summary;

use crate::polls::config_reader::*;
use crate::polls::io_csv::*;
use crate::polls::io_voters::*;
use crate::polls::summary::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PollsError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error producing JSON output"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Poll #{index} ({name:?}): {message}"))]
    DefinitionParse {
        index: usize,
        name: String,
        message: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading {path} around line {lineno}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("{path}:{lineno}: expected 'name{delimiter}weight', found {content:?}"))]
    VoterSyntax {
        path: String,
        lineno: u64,
        delimiter: char,
        content: String,
    },
    #[snafu(display("{path}:{lineno}: weight {literal:?} of voter {voter:?} is not a number"))]
    VoterWeight {
        path: String,
        lineno: u64,
        voter: String,
        literal: String,
    },
    #[snafu(display("{path}:{lineno}: voter {voter:?} appears more than once"))]
    DuplicateVoter {
        path: String,
        lineno: u64,
        voter: String,
    },
    #[snafu(display("{path}: the ballot table has no header row"))]
    EmptyTable { path: String },
    #[snafu(display("{path}: column {column} should be poll {expected:?}, found {found:?}"))]
    HeaderMismatch {
        path: String,
        column: usize,
        expected: String,
        found: String,
    },
    #[snafu(display("{path}:{lineno}: unknown voter {voter:?}"))]
    UnknownVoter {
        path: String,
        lineno: u64,
        voter: String,
    },
    #[snafu(display("{path}:{lineno}: {found} cells, expected {expected} (voter name and one cell per poll)"))]
    CsvLineWrongLength {
        path: String,
        lineno: u64,
        found: usize,
        expected: usize,
    },
    #[snafu(display("{path}:{lineno}, column {column}: {source}"))]
    BallotParse {
        source: BallotError,
        path: String,
        lineno: u64,
        column: usize,
    },
    #[snafu(display("Difference detected between the calculated summary and the reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PollsResult<T> = Result<T, PollsError>;
pub type BPollsResult<T> = Result<T, Box<PollsError>>;

/// Runs the program: either writes an empty ballot table, or reads and
/// evaluates the ballots of all the polls.
pub fn run_polls(args: &Args) -> BPollsResult<()> {
    let delimiter = delimiter_byte(args.delimiter)?;

    let polls = read_polls(&args.polls)?;
    info!("Read {} polls from {}", polls.len(), args.polls);
    for p in polls.iter() {
        debug!("poll: {:?}", p);
    }
    if let Some(save_path) = &args.save_polls {
        write_polls(save_path, &polls)?;
        info!("Wrote the poll definitions to {}", save_path);
    }

    let voters: Vec<Voter> = match &args.voters {
        Some(path) => read_voters(path, delimiter)?,
        None => Vec::new(),
    };
    info!(
        "Read {} voters, total weight {}",
        voters.len(),
        voters.iter().fold(0u64, |acc, v| acc.saturating_add(v.weight))
    );

    match (&args.template, &args.ballots) {
        (Some(template_path), _) => {
            require_voters(&voters)?;
            write_template(template_path, &polls, &voters, delimiter)?;
            info!("Wrote an empty ballot table to {}", template_path);
            Ok(())
        }
        (None, Some(ballots_path)) => {
            require_voters(&voters)?;
            let builders = read_ballot_table(ballots_path, &polls, &voters, delimiter)?;
            let results: Vec<(PollDefinition, EvaluationResult)> = builders
                .iter()
                .map(|b| (b.definition().clone(), b.evaluate()))
                .collect();

            let summary = build_summary_js(&results);
            let pretty = serde_json::to_string_pretty(&summary).context(WritingJsonSnafu {})?;
            write_summary(&pretty, args.out.as_deref())?;

            if let Some(reference_path) = &args.reference {
                check_reference(&pretty, reference_path)?;
                info!("The summary matches the reference {}", reference_path);
            }
            Ok(())
        }
        (None, None) if args.save_polls.is_some() => Ok(()),
        (None, None) => Ok(nothing_to_do()?),
    }
}

fn require_voters(voters: &[Voter]) -> PollsResult<()> {
    if voters.is_empty() {
        whatever!("A list of voters (--voters) is required to write or read a ballot table");
    }
    Ok(())
}

fn nothing_to_do() -> PollsResult<()> {
    whatever!("Nothing to do: pass a ballot table (--ballots) or a template to create (--template)")
}

fn delimiter_byte(c: char) -> PollsResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        whatever!("The delimiter must be an ASCII character, found {:?}", c)
    }
}
