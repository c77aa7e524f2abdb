/*!
Tabulation of the polls of an assembly of weighted voters.

Two procedures are supported:
- the **median procedure**: every voter proposes an amount and the accepted
  amount is the highest one supported by more than the required weight,
- the **Schulze method**: every voter ranks a fixed list of options and the
  group obtains a ranking of the options, possibly with ties.

Evaluations are pure: the same definition and ballots always give the same
result, and nothing is kept between calls.

```
use weighted_voting::*;

let poll = MedianPoll {
    name: "Sound system".to_string(),
    threshold: Threshold::HALF,
    count_abstentions: true,
    max_value: 1000.0,
};
let mut builder = Builder::new(&PollDefinition::Median(poll));
builder.add_cell(&Voter::new("Physics", 4), "200")?;
builder.add_cell(&Voter::new("Biology", 3), "1000")?;
builder.add_cell(&Voter::new("History", 2), "700")?;
builder.add_cell(&Voter::new("Film club", 2), "500")?;

match builder.evaluate() {
    EvaluationResult::Median(res) => {
        assert_eq!(res.required_weight, 5);
        assert_eq!(res.accepted_value, Some(500.0));
    }
    _ => unreachable!(),
}
# Ok::<(), BallotError>(())
```
*/
mod config;

pub mod builder;
pub mod manual;
pub mod median;
pub mod schulze;

use log::{debug, info};

pub use crate::builder::*;
pub use crate::config::*;

/// Evaluates one poll with all of its ballots.
///
/// Fails if the ballots are of the wrong kind for the poll, or if a Schulze
/// ranking does not have one entry per option. Use a [`Builder`] to rule
/// out both cases at construction.
pub fn evaluate(
    definition: &PollDefinition,
    ballots: &Ballots,
) -> Result<EvaluationResult, VotingErrors> {
    info!(
        "evaluate: poll {:?} ({}), {} ballots",
        definition.name(),
        definition.tag(),
        ballots.len()
    );
    match (definition, ballots) {
        (PollDefinition::Median(poll), Ballots::Median(bs)) => {
            Ok(EvaluationResult::Median(median::evaluate(poll, bs)))
        }
        (PollDefinition::Schulze(poll), Ballots::Schulze(bs)) => {
            check_rankings(poll, bs)?;
            Ok(EvaluationResult::Schulze(schulze::evaluate(poll, bs)))
        }
        _ => Err(VotingErrors::MismatchedBallots {
            poll: definition.name().to_string(),
        }),
    }
}

fn check_rankings(poll: &SchulzePoll, ballots: &[SchulzeBallot]) -> Result<(), VotingErrors> {
    let expected = poll.options.len();
    for b in ballots.iter() {
        if let Some(ranking) = b.ranking() {
            if ranking.len() != expected {
                return Err(VotingErrors::WrongRankingLength {
                    poll: poll.name.clone(),
                    voter: b.voter.clone(),
                    expected,
                    found: ranking.len(),
                });
            }
        }
    }
    Ok(())
}

/// Applies the abstention policy shared by both procedures.
///
/// Ballots with a value are kept as they are. An abstained ballot is replaced
/// by `default_ballot` if abstentions are counted, and dropped otherwise.
/// Returns the counted ballots (in input order) and their total weight,
/// saturated at `u64::MAX`.
pub(crate) fn admit_ballots<B: WeightedBallot>(
    ballots: &[B],
    count_abstentions: bool,
    default_ballot: impl Fn(&B) -> B,
) -> (Vec<B>, u64) {
    let mut counted: Vec<B> = Vec::with_capacity(ballots.len());
    let mut total_weight: u64 = 0;
    for b in ballots.iter() {
        if !b.is_abstained() {
            total_weight = total_weight.saturating_add(b.weight());
            counted.push(b.clone());
        } else if count_abstentions {
            total_weight = total_weight.saturating_add(b.weight());
            counted.push(default_ballot(b));
        }
    }
    debug!(
        "admit_ballots: {} of {} ballots counted, total weight {}",
        counted.len(),
        ballots.len(),
        total_weight
    );
    (counted, total_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn median_poll(count_abstentions: bool) -> MedianPoll {
        MedianPoll {
            name: "Budget".to_string(),
            threshold: Threshold::HALF,
            count_abstentions,
            max_value: 1000.0,
        }
    }

    #[test]
    fn abstentions_are_dropped_unless_counted() {
        let ballots = vec![
            MedianBallot::new("A", 3, Some(100.0)),
            MedianBallot::new("B", 5, None),
            MedianBallot::new("C", 2, Some(50.0)),
        ];
        let default = |b: &MedianBallot| MedianBallot::new(&b.voter, b.weight, Some(0.0));

        let (counted, total) = admit_ballots(&ballots, false, default);
        assert_eq!(total, 5);
        assert_eq!(
            counted.iter().map(|b| b.voter.as_str()).collect::<Vec<_>>(),
            vec!["A", "C"]
        );

        let (counted, total) = admit_ballots(&ballots, true, default);
        assert_eq!(total, 10);
        assert_eq!(counted[1], MedianBallot::new("B", 5, Some(0.0)));
    }

    #[test]
    fn evaluate_dispatches_on_the_poll_kind() {
        let def = PollDefinition::Median(median_poll(true));
        let res = evaluate(
            &def,
            &Ballots::Median(vec![MedianBallot::new("A", 1, Some(10.0))]),
        )
        .unwrap();
        assert_eq!(res.total_weight(), 1);
        assert_eq!(res.required_weight(), 0);
        assert!(matches!(res, EvaluationResult::Median(_)));
    }

    #[test]
    fn evaluate_rejects_rankings_of_another_poll() {
        let three = SchulzePoll {
            name: "Chair".to_string(),
            threshold: Threshold::HALF,
            count_abstentions: false,
            options: vec!["A".to_string(), "B".to_string(), "No".to_string()],
        };
        let two = SchulzePoll {
            options: vec!["A".to_string(), "No".to_string()],
            ..three.clone()
        };
        let ballots = Ballots::Schulze(vec![
            SchulzeBallot::abstained("W", 1),
            SchulzeBallot::new("X", 2, vec![0, 1], &two).unwrap(),
        ]);
        assert_eq!(
            evaluate(&PollDefinition::Schulze(three), &ballots),
            Err(VotingErrors::WrongRankingLength {
                poll: "Chair".to_string(),
                voter: "X".to_string(),
                expected: 3,
                found: 2,
            })
        );
        assert!(evaluate(&PollDefinition::Schulze(two), &ballots).is_ok());
    }

    #[test]
    fn total_weight_saturates() {
        let ballots = vec![
            MedianBallot::new("A", u64::MAX, Some(100.0)),
            MedianBallot::new("B", 1, Some(50.0)),
            MedianBallot::new("C", 7, None),
        ];
        let default = |b: &MedianBallot| MedianBallot::new(&b.voter, b.weight, Some(0.0));
        let (counted, total) = admit_ballots(&ballots, true, default);
        assert_eq!(counted.len(), 3);
        assert_eq!(total, u64::MAX);
    }

    #[test]
    fn evaluate_rejects_mismatched_ballots() {
        let def = PollDefinition::Median(median_poll(true));
        let res = evaluate(&def, &Ballots::Schulze(vec![]));
        assert_eq!(
            res,
            Err(VotingErrors::MismatchedBallots {
                poll: "Budget".to_string()
            })
        );
    }
}
