use crate::config::*;

use log::debug;

/// Reads the cell of a median poll: an empty cell is an abstention,
/// anything else must be a finite decimal amount.
pub fn parse_median_cell(
    poll: &MedianPoll,
    voter: &Voter,
    cell: &str,
) -> Result<MedianBallot, BallotError> {
    let s = cell.trim();
    if s.is_empty() {
        return Ok(MedianBallot::new(&voter.name, voter.weight, None));
    }
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(MedianBallot::new(&voter.name, voter.weight, Some(x))),
        _ => Err(BallotError::InvalidAmount {
            poll: poll.name.clone(),
            voter: voter.name.clone(),
            literal: cell.to_string(),
        }),
    }
}

/// Reads the cell of a Schulze poll: an empty cell is an abstention,
/// anything else must be one integer rank per option, separated by
/// whitespace.
pub fn parse_schulze_cell(
    poll: &SchulzePoll,
    voter: &Voter,
    cell: &str,
) -> Result<SchulzeBallot, BallotError> {
    let s = cell.trim();
    if s.is_empty() {
        return Ok(SchulzeBallot::abstained(&voter.name, voter.weight));
    }
    let mut ranking: Vec<i64> = Vec::new();
    for token in s.split_whitespace() {
        let rank = token.parse::<i64>().map_err(|_| BallotError::InvalidRank {
            poll: poll.name.clone(),
            voter: voter.name.clone(),
            literal: cell.to_string(),
        })?;
        ranking.push(rank);
    }
    if ranking.len() != poll.options.len() {
        return Err(BallotError::WrongRankingLength {
            poll: poll.name.clone(),
            voter: voter.name.clone(),
            literal: cell.to_string(),
            expected: poll.options.len(),
            found: ranking.len(),
        });
    }
    SchulzeBallot::new(&voter.name, voter.weight, ranking, poll)
}

/// Reads the cell of any poll, according to its kind.
pub fn parse_cell(
    definition: &PollDefinition,
    voter: &Voter,
    cell: &str,
) -> Result<Ballot, BallotError> {
    match definition {
        PollDefinition::Median(p) => parse_median_cell(p, voter, cell).map(Ballot::Median),
        PollDefinition::Schulze(p) => parse_schulze_cell(p, voter, cell).map(Ballot::Schulze),
    }
}

/// A builder collecting the ballots of one poll.
///
/// The ballots are checked against the poll when they are added, so that
/// the evaluation itself cannot fail.
///
/// ```
/// use weighted_voting::*;
///
/// let poll = SchulzePoll {
///     name: "Chair".to_string(),
///     threshold: Threshold::HALF,
///     count_abstentions: true,
///     options: vec!["Anna".to_string(), "Bob".to_string(), "No".to_string()],
/// };
/// let mut builder = Builder::new(&PollDefinition::Schulze(poll));
/// builder.add_cell(&Voter::new("Physics", 3), "0 1 2")?;
/// builder.add_cell(&Voter::new("Biology", 1), "")?;
/// assert!(builder.add_cell(&Voter::new("History", 2), "0 1").is_err());
///
/// if let EvaluationResult::Schulze(res) = builder.evaluate() {
///     assert_eq!(res.total_weight, 4);
///     assert_eq!(res.winners(), &[0]);
/// }
/// # Ok::<(), BallotError>(())
/// ```
#[derive(Debug)]
pub struct Builder {
    pub(crate) _definition: PollDefinition,
    pub(crate) _ballots: Ballots,
}

impl Builder {
    pub fn new(definition: &PollDefinition) -> Builder {
        let ballots = match definition {
            PollDefinition::Median(_) => Ballots::Median(Vec::new()),
            PollDefinition::Schulze(_) => Ballots::Schulze(Vec::new()),
        };
        Builder {
            _definition: definition.clone(),
            _ballots: ballots,
        }
    }

    pub fn definition(&self) -> &PollDefinition {
        &self._definition
    }

    pub fn ballots(&self) -> &Ballots {
        &self._ballots
    }

    /// Adds the ballot of a voter, read from the raw content of a cell.
    pub fn add_cell(&mut self, voter: &Voter, cell: &str) -> Result<(), BallotError> {
        let ballot = parse_cell(&self._definition, voter, cell)?;
        debug!(
            "Builder::add_cell: poll {:?}: {:?}",
            self._definition.name(),
            ballot
        );
        self.add_ballot(ballot)
    }

    /// Adds the abstention of a voter.
    pub fn add_abstention(&mut self, voter: &Voter) -> Result<(), BallotError> {
        self.add_cell(voter, "")
    }

    /// Adds an already constructed ballot. It must match the kind of poll
    /// (and, for a Schulze poll, its number of options).
    pub fn add_ballot(&mut self, ballot: Ballot) -> Result<(), BallotError> {
        match (&self._definition, &mut self._ballots, ballot) {
            (PollDefinition::Median(_), Ballots::Median(v), Ballot::Median(b)) => {
                v.push(b);
                Ok(())
            }
            (PollDefinition::Schulze(p), Ballots::Schulze(v), Ballot::Schulze(b)) => {
                if let Some(ranking) = b.ranking() {
                    if ranking.len() != p.options.len() {
                        return Err(BallotError::WrongRankingLength {
                            poll: p.name.clone(),
                            voter: b.voter.clone(),
                            literal: ranking
                                .iter()
                                .map(|r| r.to_string())
                                .collect::<Vec<String>>()
                                .join(" "),
                            expected: p.options.len(),
                            found: ranking.len(),
                        });
                    }
                }
                v.push(b);
                Ok(())
            }
            (def, _, b) => Err(BallotError::MismatchedBallot {
                poll: def.name().to_string(),
                voter: b.voter().to_string(),
            }),
        }
    }

    pub fn evaluate(&self) -> EvaluationResult {
        match (&self._definition, &self._ballots) {
            (PollDefinition::Median(p), Ballots::Median(bs)) => {
                EvaluationResult::Median(crate::median::evaluate(p, bs))
            }
            (PollDefinition::Schulze(p), Ballots::Schulze(bs)) => {
                EvaluationResult::Schulze(crate::schulze::evaluate(p, bs))
            }
            // The ballots are created from the definition in `new`.
            _ => unreachable!("Builder: ballots do not match the poll definition"),
        }
    }
}
