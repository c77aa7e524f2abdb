use proptest::prelude::*;

use weighted_voting::schulze::{defeat_matrix, rank_groups, strongest_paths};
use weighted_voting::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn schulze_poll(num_options: usize, count_abstentions: bool) -> SchulzePoll {
    SchulzePoll {
        name: "Property".to_string(),
        threshold: Threshold::HALF,
        count_abstentions,
        options: (0..num_options).map(|i| format!("Option {}", i)).collect(),
    }
}

// (weight, ranking or abstention) for a fixed number of options.
fn schulze_inputs() -> impl Strategy<Value = (usize, Vec<(u64, Option<Vec<i64>>)>)> {
    (1usize..7).prop_flat_map(|n| {
        let ballot = (
            0u64..20,
            prop::option::of(prop::collection::vec(0i64..4, n)),
        );
        (Just(n), prop::collection::vec(ballot, 0..12))
    })
}

fn build_schulze(
    poll: &SchulzePoll,
    inputs: &[(u64, Option<Vec<i64>>)],
) -> Vec<SchulzeBallot> {
    inputs
        .iter()
        .enumerate()
        .map(|(idx, (w, r))| {
            let voter = format!("voter {}", idx);
            match r {
                Some(r) => SchulzeBallot::new(&voter, *w, r.clone(), poll).unwrap(),
                None => SchulzeBallot::abstained(&voter, *w),
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn counted_weight_excludes_dropped_abstentions(
        (n, inputs) in schulze_inputs(),
        count_abstentions in any::<bool>(),
    ) {
        init_logger();
        let poll = schulze_poll(n, count_abstentions);
        let ballots = build_schulze(&poll, &inputs);
        let res = schulze::evaluate(&poll, &ballots);

        let expected: u64 = inputs
            .iter()
            .filter(|(_, r)| count_abstentions || r.is_some())
            .map(|(w, _)| *w)
            .sum();
        prop_assert_eq!(res.total_weight, expected);
        prop_assert_eq!(res.counted.iter().map(|b| b.weight).sum::<u64>(), expected);
        prop_assert_eq!(res.required_weight, expected / 2);
    }

    #[test]
    fn defeats_have_an_empty_diagonal_and_bounded_entries(
        (n, inputs) in schulze_inputs(),
    ) {
        let poll = schulze_poll(n, true);
        let ballots = build_schulze(&poll, &inputs);
        let res = schulze::evaluate(&poll, &ballots);
        for i in 0..n {
            prop_assert_eq!(res.defeats[i][i], 0);
            for j in 0..n {
                prop_assert!(res.defeats[i][j] + res.defeats[j][i] <= res.total_weight);
            }
        }
    }

    #[test]
    fn strongest_paths_are_closed(
        (n, inputs) in schulze_inputs(),
    ) {
        let poll = schulze_poll(n, true);
        let ballots = build_schulze(&poll, &inputs);
        let d = defeat_matrix(n, &ballots);
        let p = strongest_paths(&d);
        for i in 0..n {
            prop_assert_eq!(p[i][i], 0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                if d[i][j] <= d[j][i] {
                    // No direct link, any strength comes from a longer path.
                    prop_assert!(p[i][j] == 0 || (0..n).any(|k| k != i && k != j && p[i][j] <= p[i][k].min(p[k][j])));
                }
                for k in 0..n {
                    if k != i && k != j {
                        prop_assert!(p[i][j] >= p[i][k].min(p[k][j]));
                    }
                }
            }
        }
    }

    #[test]
    fn ranked_groups_partition_the_options(
        (n, inputs) in schulze_inputs(),
    ) {
        init_logger();
        let poll = schulze_poll(n, false);
        let ballots = build_schulze(&poll, &inputs);
        let res = schulze::evaluate(&poll, &ballots);

        let mut seen: Vec<usize> = res.ranked_groups.iter().flatten().cloned().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..n).collect::<Vec<usize>>());

        let wins = |i: usize| {
            (0..n)
                .filter(|&j| j != i && res.strongest_paths[i][j] > res.strongest_paths[j][i])
                .count()
        };
        for group in res.ranked_groups.iter() {
            prop_assert!(!group.is_empty());
            prop_assert!(group.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(group.iter().all(|&i| wins(i) == wins(group[0])));
        }
        for pair in res.ranked_groups.windows(2) {
            prop_assert!(wins(pair[0][0]) > wins(pair[1][0]));
        }
    }

    #[test]
    fn median_of_identical_values(
        value in 0.0f64..1e9,
        weights in prop::collection::vec(1u64..50, 1..10),
        num in 0u64..=100,
    ) {
        let poll = MedianPoll {
            name: "Property".to_string(),
            threshold: Threshold::new(num, 100).unwrap(),
            count_abstentions: false,
            max_value: 1e9,
        };
        let ballots: Vec<MedianBallot> = weights
            .iter()
            .enumerate()
            .map(|(idx, w)| MedianBallot::new(&format!("voter {}", idx), *w, Some(value)))
            .collect();
        let res = median::evaluate(&poll, &ballots);
        let total: u64 = weights.iter().sum();
        prop_assert_eq!(res.total_weight, total);
        prop_assert_eq!(res.required_weight, total * num / 100);
        if res.total_weight > res.required_weight {
            prop_assert_eq!(res.accepted_value, Some(value));
        } else {
            prop_assert_eq!(res.accepted_value, None);
        }
    }

    #[test]
    fn median_is_one_of_the_proposals(
        proposals in prop::collection::vec((1u64..50, 0u32..10_000), 1..15),
    ) {
        let poll = MedianPoll {
            name: "Property".to_string(),
            threshold: Threshold::HALF,
            count_abstentions: true,
            max_value: 10_000.0,
        };
        let ballots: Vec<MedianBallot> = proposals
            .iter()
            .enumerate()
            .map(|(idx, (w, v))| MedianBallot::new(&format!("voter {}", idx), *w, Some(*v as f64)))
            .collect();
        let res = median::evaluate(&poll, &ballots);
        let accepted = res.accepted_value.unwrap();
        prop_assert!(proposals.iter().any(|(_, v)| *v as f64 == accepted));

        // More than half of the weight supports the accepted amount or more.
        let support: u64 = proposals
            .iter()
            .filter(|(_, v)| *v as f64 >= accepted)
            .map(|(w, _)| *w)
            .sum();
        prop_assert!(support > res.required_weight);
    }
}

#[test]
fn ranking_from_matrices_alone() {
    init_logger();
    let d = vec![
        vec![0, 5, 5, 3],
        vec![4, 0, 7, 5],
        vec![4, 2, 0, 5],
        vec![6, 4, 4, 0],
    ];
    let p = strongest_paths(&d);
    assert_eq!(
        p,
        vec![
            vec![0, 5, 5, 5],
            vec![5, 0, 7, 5],
            vec![5, 5, 0, 5],
            vec![6, 5, 5, 0],
        ]
    );
    assert_eq!(rank_groups(&p), vec![vec![1, 3], vec![0, 2]]);
}

#[test]
fn evaluation_does_not_touch_inputs() {
    init_logger();
    let poll = schulze_poll(3, true);
    let ballots = vec![
        SchulzeBallot::new("X", 2, vec![0, 1, 2], &poll).unwrap(),
        SchulzeBallot::abstained("Y", 1),
    ];
    let before = ballots.clone();
    let first = schulze::evaluate(&poll, &ballots);
    let second = schulze::evaluate(&poll, &ballots);
    assert_eq!(ballots, before);
    assert_eq!(first, second);
}
