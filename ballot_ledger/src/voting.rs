use log::{debug, info, warn};
use snafu::prelude::*;

use crate::entities::{Ballot, Voter};
use crate::error::*;
use crate::repository::Repository;
use crate::validator::validate_ballot;
use crate::world_state::WorldState;

/// Records a ballot in the voter's record, as ElectionID -> BallotID.
///
/// The voter key must exist. An existing link for the same election is
/// overwritten, so callers validate before linking.
pub fn link_ballot<W: WorldState + ?Sized>(
    repo: &mut Repository<W>,
    ballot: &Ballot,
) -> LedgerResult<Voter> {
    ensure!(
        repo.exists(&ballot.voter_id)?,
        NotFoundSnafu {
            kind: "asset",
            id: &ballot.voter_id,
        }
    );
    let mut voter = repo.get_voter(&ballot.voter_id)?;
    voter
        .ballots
        .insert(ballot.election_id.clone(), ballot.id.clone());
    repo.put_voter(&voter)?;
    debug!(
        "link_ballot: voter {} now holds {} ballot(s)",
        voter.id,
        voter.ballots.len()
    );
    Ok(voter)
}

/// Validates, stores and links the ballot of `voter_id` for `election_id`.
///
/// The ballot is stored under `voter_id-election_id`, whatever the ranking,
/// so a repeated call is rejected as [`LedgerError::AlreadyVoted`]. The ballot
/// write and the voter update must land in the same transaction.
pub fn cast_vote<W: WorldState + ?Sized>(
    repo: &mut Repository<W>,
    voter_id: &str,
    election_id: &str,
    ranked_items: &[String],
) -> LedgerResult<Ballot> {
    let ballot = Ballot::new(voter_id, election_id, ranked_items);
    debug!("cast_vote: candidate ballot {:?}", ballot);

    if let Err(e) = validate_ballot(repo, &ballot) {
        warn!("cast_vote: ballot {} rejected: {}", ballot.id, e);
        return Err(e);
    }

    repo.put_ballot(&ballot)?;
    link_ballot(repo, &ballot)?;
    info!(
        "cast_vote: voter {} cast ballot {} in election {}",
        voter_id, ballot.id, election_id
    );
    Ok(ballot)
}
