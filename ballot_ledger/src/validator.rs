use log::debug;
use snafu::prelude::*;
use std::collections::HashSet;

use crate::entities::Ballot;
use crate::error::*;
use crate::repository::Repository;
use crate::world_state::WorldState;

/// Checks that a ranking is exactly a permutation of the election items.
///
/// The ranking must have the same length as the candidate set and contain
/// every candidate. Together these reject duplicated entries, since a duplicate
/// pushes some candidate out of a ranking of the right length.
pub fn check_selection(
    election_items: &[String],
    ranked_items: &[String],
) -> Result<(), SelectionProblem> {
    if election_items.len() != ranked_items.len() {
        return Err(SelectionProblem::WrongLength {
            expected: election_items.len(),
            found: ranked_items.len(),
        });
    }
    let on_ballot: HashSet<&str> = ranked_items.iter().map(|s| s.as_str()).collect();
    if let Some(missing) = election_items
        .iter()
        .find(|item| !on_ballot.contains(item.as_str()))
    {
        return Err(SelectionProblem::MissingItem {
            item: missing.clone(),
        });
    }
    Ok(())
}

/// Checks a prospective ballot against the voter and election records.
///
/// Read only. The checks run in this order, and the first failure is returned:
/// the voter exists, has not voted in this election, the election exists, the
/// voter is registered for it, and the ranking is a permutation of its items.
pub fn validate_ballot<W: WorldState + ?Sized>(
    repo: &Repository<W>,
    ballot: &Ballot,
) -> LedgerResult<()> {
    let voter = repo.get_voter(&ballot.voter_id)?;
    ensure!(
        !voter.has_voted_in(&ballot.election_id),
        AlreadyVotedSnafu {
            voter_id: &ballot.voter_id,
            election_id: &ballot.election_id,
        }
    );

    let election = repo.get_election(&ballot.election_id)?;
    ensure!(
        election.is_registered(&ballot.voter_id),
        NotRegisteredSnafu {
            voter_id: &ballot.voter_id,
            election_id: &ballot.election_id,
        }
    );

    check_selection(&election.votable_items, &ballot.votable_items)
        .map_err(|problem| LedgerError::InvalidSelection { problem })?;

    debug!("validate_ballot: ballot {} is valid", ballot.id);
    Ok(())
}
