use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::error::LedgerResult;
use crate::repository::Repository;
use crate::world_state::WorldState;

/// The Borda scores of an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResults {
    pub election_id: String,
    /// Score per votable item. Every item of the election is present, even
    /// with a score of zero.
    pub scores: BTreeMap<String, u64>,
    /// The number of registered voters who cast a ballot.
    pub ballots_counted: u64,
}

impl ElectionResults {
    pub fn score(&self, item_id: &str) -> Option<u64> {
        self.scores.get(item_id).cloned()
    }

    pub fn total_points(&self) -> u64 {
        self.scores.values().sum()
    }
}

/// Renders as `map[item1:3 item2:3]`, keys in sorted order.
impl Display for ElectionResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<String> = self
            .scores
            .iter()
            .map(|(item, score)| format!("{}:{}", item, score))
            .collect();
        write!(f, "map[{}]", entries.join(" "))
    }
}

/// The points earned by the item ranked at `position` (0 is the favourite)
/// among `num_items` candidates.
pub fn borda_weight(num_items: usize, position: usize) -> u64 {
    num_items.saturating_sub(position) as u64
}

/// Computes the Borda count of an election from the ballots of its
/// registered voters.
///
/// Voters who did not vote contribute nothing. Any failed lookup aborts the
/// whole tally. Ties are left in the scores: ordering the items is done by
/// [`crate::standings`].
pub fn tally<W: WorldState + ?Sized>(
    repo: &Repository<W>,
    election_id: &str,
) -> LedgerResult<ElectionResults> {
    let election = repo.get_election(election_id)?;
    let num_items = election.votable_items.len();
    info!(
        "tally: election {}: {} item(s), {} registered voter(s)",
        election_id,
        num_items,
        election.registered_voters.len()
    );

    let mut scores: BTreeMap<String, u64> = election
        .votable_items
        .iter()
        .map(|item| (item.clone(), 0))
        .collect();
    let mut ballots_counted: u64 = 0;

    for voter_id in election.registered_voters.iter() {
        let voter = repo.get_voter(voter_id)?;
        let ballot_id = match voter.ballots.get(election_id) {
            Some(id) => id,
            None => {
                debug!("tally: voter {} did not vote", voter_id);
                continue;
            }
        };
        let ballot = repo.get_ballot(ballot_id)?;
        for (position, item) in ballot.votable_items.iter().enumerate() {
            *scores.entry(item.clone()).or_insert(0) += borda_weight(num_items, position);
        }
        ballots_counted += 1;
        debug!("tally: counted ballot {}", ballot_id);
    }

    let res = ElectionResults {
        election_id: election_id.to_string(),
        scores,
        ballots_counted,
    };
    info!("tally: election {}: {}", election_id, res);
    Ok(res)
}
