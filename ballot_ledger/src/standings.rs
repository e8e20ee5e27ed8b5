//! Ordering the items of a tally, for callers that want a winner.
//!
//! The tally itself never breaks ties. This module sorts the items by
//! decreasing score and resolves equal scores with a [`TieBreakMode`].

use log::debug;
use std::collections::HashMap;

use crate::entities::Election;
use crate::tally::ElectionResults;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Equal scores keep the order of the election's votable items.
    UseCandidateOrder,
    /// Equal scores are ordered by a SHA-256 digest of the seed and the item ID.
    /// The order is reproducible for a given seed but hard to guess in advance.
    Random(u32),
}

/// One line of the standings.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Standing {
    /// 1 for the first place. Tied items still get distinct places, in
    /// tie-break order.
    pub place: u32,
    pub item_id: String,
    pub score: u64,
    /// True when another item has the same score.
    pub tied: bool,
}

fn random_key(seed: u32, item_id: &str) -> String {
    sha256::digest(format!("{:08}{}", seed, item_id).as_str())
}

/// Orders the items of `results` from the highest score to the lowest.
///
/// Items that appear in the scores but not in the election (only possible with
/// records written outside of the validator) are placed after the election
/// items when tie-breaking by candidate order.
pub fn standings(
    results: &ElectionResults,
    election: &Election,
    tiebreak: TieBreakMode,
) -> Vec<Standing> {
    let candidate_order: HashMap<&str, usize> = election
        .votable_items
        .iter()
        .enumerate()
        .rev()
        .map(|(idx, item)| (item.as_str(), idx))
        .collect();

    let mut sorted: Vec<(&String, u64)> = results.scores.iter().map(|(k, v)| (k, *v)).collect();
    match tiebreak {
        TieBreakMode::UseCandidateOrder => sorted.sort_by_key(|(item, score)| {
            (
                std::cmp::Reverse(*score),
                candidate_order
                    .get(item.as_str())
                    .cloned()
                    .unwrap_or(usize::MAX),
            )
        }),
        TieBreakMode::Random(seed) => sorted.sort_by_cached_key(|(item, score)| {
            (std::cmp::Reverse(*score), random_key(seed, item))
        }),
    }
    debug!("standings: {:?} with {:?}", sorted, tiebreak);

    let mut score_counts: HashMap<u64, usize> = HashMap::new();
    for (_, score) in sorted.iter() {
        *score_counts.entry(*score).or_insert(0) += 1;
    }

    sorted
        .iter()
        .enumerate()
        .map(|(idx, (item, score))| Standing {
            place: (idx + 1) as u32,
            item_id: (*item).clone(),
            score: *score,
            tied: score_counts.get(score).cloned().unwrap_or(0) > 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn results(scores: &[(&str, u64)]) -> ElectionResults {
        ElectionResults {
            election_id: "E1".to_string(),
            scores: scores
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            ballots_counted: 2,
        }
    }

    fn election(items: &[&str]) -> Election {
        let items: Vec<String> = items.iter().map(|x| x.to_string()).collect();
        Election::new("E1", "Board", &[], &items)
    }

    fn order(st: &[Standing]) -> Vec<&str> {
        st.iter().map(|s| s.item_id.as_str()).collect()
    }

    #[test]
    fn highest_score_first() {
        let st = standings(
            &results(&[("a", 2), ("b", 6), ("c", 4)]),
            &election(&["a", "b", "c"]),
            TieBreakMode::UseCandidateOrder,
        );
        assert_eq!(order(&st), ["b", "c", "a"]);
        assert_eq!(st[0].place, 1);
        assert!(st.iter().all(|s| !s.tied));
    }

    #[test]
    fn ties_follow_candidate_order() {
        let st = standings(
            &results(&[("item1", 3), ("item2", 3)]),
            &election(&["item2", "item1"]),
            TieBreakMode::UseCandidateOrder,
        );
        assert_eq!(order(&st), ["item2", "item1"]);
        assert!(st[0].tied && st[1].tied);
    }

    #[test]
    fn random_ties_are_reproducible() {
        let r = results(&[("a", 1), ("b", 1), ("c", 1), ("d", 5)]);
        let e = election(&["a", "b", "c", "d"]);
        let first = standings(&r, &e, TieBreakMode::Random(42));
        let again = standings(&r, &e, TieBreakMode::Random(42));
        assert_eq!(first, again);
        assert_eq!(first[0].item_id, "d");
        assert!(!first[0].tied);
    }
}
