//! The Schulze method.
//!
//! Implementation following
//! <https://de.wikipedia.org/wiki/Schulze-Methode#Implementierung>:
//! - `d[i][j]`: the weight of the voters strictly preferring option i to j,
//! - `p[i][j]`: the strength of the strongest path from i to j, where a link
//!   only exists between two options if one strictly beats the other,
//! - options are then grouped by the number of options they beat in `p`.
//!
//! All the computations are done on integers and iterate by index, so the
//! result only depends on the ballots and the order of the options.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::admit_ballots;
use crate::config::*;

/// The ranking assumed for a voter who abstained, when abstentions are counted.
///
/// Every option is ranked 1 except the reject option (the last one, see
/// [`SchulzePoll::reject_option`]) which is ranked 0: an abstention counts
/// as a vote against all the substantive options.
pub fn abstention_ranking(num_options: usize) -> Vec<i64> {
    (0..num_options)
        .map(|i| if i + 1 == num_options { 0 } else { 1 })
        .collect()
}

/// Builds the matrix of pairwise defeats.
///
/// Tied ranks count for neither option. Abstained ballots are skipped.
///
/// # Panics
///
/// If a ranking does not have exactly `num_options` entries. Ballots built
/// with [`SchulzeBallot::new`] for the same poll always do.
pub fn defeat_matrix(num_options: usize, ballots: &[SchulzeBallot]) -> Vec<Vec<u64>> {
    let mut d = vec![vec![0u64; num_options]; num_options];
    for ballot in ballots.iter() {
        let ranking = match ballot.ranking() {
            Some(r) => r,
            None => continue,
        };
        assert_eq!(
            ranking.len(),
            num_options,
            "ranking of voter {:?} does not match the number of options",
            ballot.voter
        );
        let w = ballot.weight;
        for i in 0..num_options {
            for j in (i + 1)..num_options {
                if ranking[i] < ranking[j] {
                    d[i][j] = d[i][j].saturating_add(w);
                } else if ranking[j] < ranking[i] {
                    d[j][i] = d[j][i].saturating_add(w);
                }
            }
        }
    }
    d
}

/// Computes the strongest paths from the defeat matrix.
///
/// Only a strict pairwise majority creates a direct link. The links are
/// then widened through every intermediate option `k` (Floyd–Warshall on
/// the (max, min) semiring). The intermediate option must stay the
/// outermost loop.
pub fn strongest_paths(defeats: &[Vec<u64>]) -> Vec<Vec<u64>> {
    let n = defeats.len();
    let mut p = vec![vec![0u64; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && defeats[i][j] > defeats[j][i] {
                p[i][j] = defeats[i][j];
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            if i == k {
                continue;
            }
            for j in 0..n {
                if j == i || j == k {
                    continue;
                }
                let through_k = std::cmp::min(p[i][k], p[k][j]);
                if through_k > p[i][j] {
                    p[i][j] = through_k;
                }
            }
        }
    }
    p
}

/// Groups the options by the number of options they strictly beat in the
/// strongest paths, the most wins first.
///
/// Options with the same number of wins are tied and stay in option order.
pub fn rank_groups(paths: &[Vec<u64>]) -> Vec<Vec<usize>> {
    let n = paths.len();
    let mut by_wins: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
        let wins = (0..n).filter(|&j| j != i && paths[i][j] > paths[j][i]).count();
        debug!("rank_groups: option {} beats {} options", i, wins);
        by_wins.entry(wins).or_default().push(i);
    }
    by_wins.into_values().rev().collect()
}

/// Evaluates a Schulze poll.
///
/// Abstained ballots are replaced by [`abstention_ranking`] if the poll
/// counts abstentions, and ignored otherwise.
pub fn evaluate(poll: &SchulzePoll, ballots: &[SchulzeBallot]) -> SchulzeResult {
    let num_options = poll.options.len();
    let (counted, total_weight) = admit_ballots(ballots, poll.count_abstentions, |b| {
        SchulzeBallot::unchecked(&b.voter, b.weight, Some(abstention_ranking(num_options)))
    });
    let required_weight = poll.threshold.required_weight(total_weight);
    debug!(
        "schulze::evaluate: poll {:?}: {} options, total weight {}, required weight {}",
        poll.name, num_options, total_weight, required_weight
    );

    let defeats = defeat_matrix(num_options, &counted);
    debug!("schulze::evaluate: defeats: {:?}", defeats);
    let paths = strongest_paths(&defeats);
    debug!("schulze::evaluate: strongest paths: {:?}", paths);
    let ranked_groups = rank_groups(&paths);

    for (idx, group) in ranked_groups.iter().enumerate() {
        let names: Vec<&str> = group.iter().map(|&i| poll.options[i].as_str()).collect();
        info!(
            "schulze::evaluate: poll {:?}: rank {}: {}",
            poll.name,
            idx + 1,
            names.join(", ")
        );
    }

    SchulzeResult {
        counted,
        total_weight,
        required_weight,
        defeats,
        strongest_paths: paths,
        ranked_groups,
    }
}
