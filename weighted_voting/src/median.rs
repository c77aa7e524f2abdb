//! The median procedure.
//!
//! Every voter proposes an amount. Starting from the highest proposal, the
//! weights are accumulated downwards, and the accepted amount is the first
//! one at which the accumulated weight strictly exceeds the required weight.
//! In other words, it is the highest amount that more than the required
//! weight would accept (as their own proposal is this amount or higher).

use log::{debug, info};

use crate::admit_ballots;
use crate::config::*;

/// Evaluates a median poll.
///
/// Abstained ballots count as a proposal of 0 if the poll counts
/// abstentions, and are ignored otherwise.
pub fn evaluate(poll: &MedianPoll, ballots: &[MedianBallot]) -> MedianResult {
    let (counted, total_weight) = admit_ballots(ballots, poll.count_abstentions, |b| {
        MedianBallot::new(&b.voter, b.weight, Some(0.0))
    });
    let required_weight = poll.threshold.required_weight(total_weight);
    debug!(
        "median::evaluate: poll {:?}: total weight {}, required weight {}",
        poll.name, total_weight, required_weight
    );

    let accepted_value = weighted_median(&counted, required_weight);
    info!(
        "median::evaluate: poll {:?}: accepted value {:?}",
        poll.name, accepted_value
    );

    MedianResult {
        counted,
        total_weight,
        required_weight,
        accepted_value,
    }
}

/// The highest value whose cumulative weight (this value and all the higher
/// ones) is strictly greater than `required_weight`.
fn weighted_median(counted: &[MedianBallot], required_weight: u64) -> Option<f64> {
    let mut proposals: Vec<(f64, u64)> = counted
        .iter()
        .filter_map(|b| b.value.map(|v| (v, b.weight)))
        .collect();
    // Stable sort, highest value first.
    proposals.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    let mut weight_so_far: u64 = 0;
    for (value, weight) in proposals {
        weight_so_far = weight_so_far.saturating_add(weight);
        if weight_so_far > required_weight {
            debug!(
                "weighted_median: value {} reached weight {} > {}",
                value, weight_so_far, required_weight
            );
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(threshold: &str, count_abstentions: bool) -> MedianPoll {
        MedianPoll {
            name: "Median Test".to_string(),
            threshold: threshold.parse().unwrap(),
            count_abstentions,
            max_value: 1000.0,
        }
    }

    #[test]
    fn made_up_budget() {
        let ballots = vec![
            MedianBallot::new("Physics", 4, Some(200.0)),
            MedianBallot::new("Biology", 3, Some(1000.0)),
            MedianBallot::new("History", 2, Some(700.0)),
            MedianBallot::new("Film club", 2, Some(500.0)),
        ];
        let res = evaluate(&poll("0.5", true), &ballots);
        assert_eq!(res.total_weight, 11);
        assert_eq!(res.required_weight, 5);
        assert_eq!(res.accepted_value, Some(500.0));
        assert!(res.is_accepted());
    }

    #[test]
    fn zero_proposal_counts() {
        let ballots = vec![
            MedianBallot::new("X", 1, Some(0.0)),
            MedianBallot::new("Y", 2, Some(150.0)),
            MedianBallot::new("Z", 3, Some(200.0)),
        ];
        let res = evaluate(&poll("0.5", true), &ballots);
        assert_eq!(res.required_weight, 3);
        assert_eq!(res.accepted_value, Some(150.0));
    }

    #[test]
    fn no_ballots_no_outcome() {
        let res = evaluate(&poll("0.5", true), &[]);
        assert_eq!(res.total_weight, 0);
        assert_eq!(res.required_weight, 0);
        assert_eq!(res.accepted_value, None);
        assert!(!res.is_accepted());
    }

    #[test]
    fn only_abstentions_dropped() {
        let ballots = vec![
            MedianBallot::new("X", 4, None),
            MedianBallot::new("Y", 2, None),
        ];
        let res = evaluate(&poll("0.5", false), &ballots);
        assert!(res.counted.is_empty());
        assert_eq!(res.total_weight, 0);
        assert_eq!(res.accepted_value, None);
    }

    #[test]
    fn counted_abstentions_pull_the_median_down() {
        let ballots = vec![
            MedianBallot::new("X", 2, Some(300.0)),
            MedianBallot::new("Y", 3, None),
        ];
        // Abstention ignored: 300 is the only proposal.
        let res = evaluate(&poll("0.5", false), &ballots);
        assert_eq!(res.total_weight, 2);
        assert_eq!(res.required_weight, 1);
        assert_eq!(res.accepted_value, Some(300.0));

        // Abstention counted as 0: 300 only has 2 of 5.
        let res = evaluate(&poll("0.5", true), &ballots);
        assert_eq!(res.total_weight, 5);
        assert_eq!(res.required_weight, 2);
        assert_eq!(res.accepted_value, Some(0.0));
        assert_eq!(res.counted[1], MedianBallot::new("Y", 3, Some(0.0)));
    }

    #[test]
    fn unanimous_threshold_needs_everyone() {
        let ballots = vec![
            MedianBallot::new("X", 1, Some(10.0)),
            MedianBallot::new("Y", 1, Some(20.0)),
        ];
        // Required weight is the full weight, which can never be exceeded.
        let res = evaluate(&poll("1", true), &ballots);
        assert_eq!(res.required_weight, 2);
        assert_eq!(res.accepted_value, None);

        let res = evaluate(&poll("0", true), &ballots);
        assert_eq!(res.required_weight, 0);
        assert_eq!(res.accepted_value, Some(20.0));
    }

    #[test]
    fn equal_values_are_accepted() {
        let ballots = vec![
            MedianBallot::new("X", 1, Some(42.5)),
            MedianBallot::new("Y", 5, Some(42.5)),
            MedianBallot::new("Z", 2, Some(42.5)),
        ];
        let res = evaluate(&poll("3/4", true), &ballots);
        assert_eq!(res.required_weight, 6);
        assert_eq!(res.accepted_value, Some(42.5));
    }

    #[test]
    fn zero_weight_voters_do_not_tip_the_balance() {
        let ballots = vec![
            MedianBallot::new("Ghost", 0, Some(900.0)),
            MedianBallot::new("X", 1, Some(100.0)),
        ];
        let res = evaluate(&poll("0.5", true), &ballots);
        assert_eq!(res.total_weight, 1);
        assert_eq!(res.required_weight, 0);
        assert_eq!(res.accepted_value, Some(100.0));
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let ballots = vec![
            MedianBallot::new("A", u64::MAX, Some(100.0)),
            MedianBallot::new("B", 1, Some(50.0)),
        ];
        let res = evaluate(&poll("0.5", false), &ballots);
        assert_eq!(res.total_weight, u64::MAX);
        assert_eq!(res.required_weight, u64::MAX / 2);
        assert_eq!(res.accepted_value, Some(100.0));

        let res = evaluate(&poll("1", false), &ballots);
        assert_eq!(res.required_weight, u64::MAX);
        assert_eq!(res.accepted_value, None);
    }
}
