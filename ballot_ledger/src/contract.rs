//! The public operations of the voting ledger.
//!
//! Each operation is one transaction against the world state passed in by the
//! caller: its writes are buffered and reach the store only if the whole
//! operation succeeds.

use log::{info, warn};
use snafu::prelude::*;

use crate::builder::SeedBuilder;
use crate::entities::*;
use crate::error::*;
use crate::repository::Repository;
use crate::tally::{self, ElectionResults};
use crate::voting;
use crate::world_state::{Transaction, WorldState};

/// Runs `op` inside a transaction named `name` and commits on success.
pub fn submit<W, T, F>(state: &mut W, name: &str, op: F) -> LedgerResult<T>
where
    W: WorldState + ?Sized,
    F: FnOnce(&mut Repository<Transaction<W>>) -> LedgerResult<T>,
{
    let mut txn = Transaction::begin(name, state);
    let res = op(&mut Repository::new(&mut txn));
    match res {
        Ok(x) => {
            txn.commit().context(StorageSnafu)?;
            Ok(x)
        }
        Err(e) => {
            warn!("{}: rejected ({}): {}", name, e.code(), e);
            Err(e)
        }
    }
}

/// Seeds the sample dataset.
pub fn init_ledger<W: WorldState + ?Sized>(state: &mut W) -> LedgerResult<()> {
    submit(state, "InitLedger", |repo| SeedBuilder::sample().write(repo))?;
    info!("InitLedger: sample dataset written");
    Ok(())
}

pub fn new_voter<W: WorldState + ?Sized>(
    state: &mut W,
    id: &str,
    name: &str,
) -> LedgerResult<Voter> {
    submit(state, "NewVoter", |repo| {
        let voter = Voter::new(id, name);
        repo.put_voter(&voter)?;
        Ok(voter)
    })
}

pub fn new_election<W: WorldState + ?Sized>(
    state: &mut W,
    id: &str,
    name: &str,
    voter_ids: &[String],
    item_ids: &[String],
) -> LedgerResult<Election> {
    submit(state, "NewElection", |repo| {
        let election = Election::new(id, name, voter_ids, item_ids);
        repo.put_election(&election)?;
        Ok(election)
    })
}

pub fn new_votable_item<W: WorldState + ?Sized>(
    state: &mut W,
    id: &str,
    name: &str,
    description: &str,
) -> LedgerResult<VotableItem> {
    submit(state, "NewVotableItem", |repo| {
        let item = VotableItem::new(id, name, description);
        repo.put_votable_item(&item)?;
        Ok(item)
    })
}

/// Casts a ranked ballot, most preferred item first.
pub fn cast_vote<W: WorldState + ?Sized>(
    state: &mut W,
    voter_id: &str,
    election_id: &str,
    ranked_item_ids: &[String],
) -> LedgerResult<Ballot> {
    submit(state, "CastVote", |repo| {
        voting::cast_vote(repo, voter_id, election_id, ranked_item_ids)
    })
}

/// The Borda scores of an election. `to_string()` on the result gives the
/// textual rendering.
pub fn get_results<W: WorldState + ?Sized>(
    state: &mut W,
    election_id: &str,
) -> LedgerResult<ElectionResults> {
    submit(state, "GetResults", |repo| tally::tally(repo, election_id))
}

pub fn get_ballot<W: WorldState + ?Sized>(state: &mut W, id: &str) -> LedgerResult<Ballot> {
    submit(state, "GetBallot", |repo| repo.get_ballot(id))
}

pub fn get_voter<W: WorldState + ?Sized>(state: &mut W, id: &str) -> LedgerResult<Voter> {
    submit(state, "GetVoter", |repo| repo.get_voter(id))
}

pub fn get_election<W: WorldState + ?Sized>(state: &mut W, id: &str) -> LedgerResult<Election> {
    submit(state, "GetElection", |repo| repo.get_election(id))
}

pub fn get_votable_item<W: WorldState + ?Sized>(
    state: &mut W,
    id: &str,
) -> LedgerResult<VotableItem> {
    submit(state, "GetVotableItem", |repo| repo.get_votable_item(id))
}

pub fn asset_exists<W: WorldState + ?Sized>(state: &mut W, id: &str) -> LedgerResult<bool> {
    submit(state, "AssetExists", |repo| repo.exists(id))
}

/// The stored value of every record, in key order.
pub fn get_all_assets<W: WorldState + ?Sized>(state: &mut W) -> LedgerResult<Vec<String>> {
    submit(state, "GetAllAssets", |repo| repo.list_all())
}

pub fn delete_asset<W: WorldState + ?Sized>(state: &mut W, id: &str) -> LedgerResult<()> {
    submit(state, "DeleteAsset", |repo| repo.delete(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::BrokenWorldState;
    use crate::world_state::MemoryWorldState;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn init_ledger_seeds_sample() {
        let mut ws = MemoryWorldState::new();
        init_ledger(&mut ws).unwrap();
        assert_eq!(ws.len(), 7);
        let e = get_election(&mut ws, "election1").unwrap();
        assert_eq!(e.registered_voters, s(&["voter1", "voter2"]));
        assert_eq!(e.votable_items, s(&["item1", "item2"]));
        assert_eq!(get_voter(&mut ws, "voter3").unwrap().name, "Unregistered");
        assert_eq!(
            get_votable_item(&mut ws, "item3").unwrap().description,
            "Invalid Option."
        );
        assert_eq!(get_votable_item(&mut ws, "item1").unwrap().name, "A. Lincon");
        assert_eq!(get_votable_item(&mut ws, "item2").unwrap().name, "R. Nixon");
    }

    #[test]
    fn sample_election_rejects_unregistered_and_invalid_items() {
        let mut ws = MemoryWorldState::new();
        init_ledger(&mut ws).unwrap();
        assert!(matches!(
            cast_vote(&mut ws, "voter3", "election1", &s(&["item1", "item2"])),
            Err(LedgerError::NotRegistered { .. })
        ));
        assert!(matches!(
            cast_vote(&mut ws, "voter1", "election1", &s(&["item1", "item3"])),
            Err(LedgerError::InvalidSelection { .. })
        ));
        let b = cast_vote(&mut ws, "voter1", "election1", &s(&["item2", "item1"])).unwrap();
        assert_eq!(b.id, "voter1-election1");
        assert_eq!(
            get_results(&mut ws, "election1").unwrap().to_string(),
            "map[item1:1 item2:2]"
        );
    }

    #[test]
    fn new_records_overwrite() {
        let mut ws = MemoryWorldState::new();
        new_voter(&mut ws, "v1", "Al").unwrap();
        new_voter(&mut ws, "v1", "Alan").unwrap();
        assert_eq!(get_voter(&mut ws, "v1").unwrap().name, "Alan");
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn delete_and_exists() {
        let mut ws = MemoryWorldState::new();
        new_votable_item(&mut ws, "item1", "A", "d").unwrap();
        assert!(asset_exists(&mut ws, "item1").unwrap());
        delete_asset(&mut ws, "item1").unwrap();
        assert!(!asset_exists(&mut ws, "item1").unwrap());
        assert!(matches!(
            delete_asset(&mut ws, "item1"),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn failed_operation_commits_nothing() {
        let mut ws = MemoryWorldState::new();
        new_voter(&mut ws, "v1", "Al").unwrap();
        let before = ws.clone();
        // The ballot write succeeds inside the transaction, the link then fails.
        let res: LedgerResult<()> = submit(&mut ws, "Partial", |repo| {
            repo.put_ballot(&Ballot::new("v1", "E1", &s(&["a"])))?;
            voting::link_ballot(repo, &Ballot::new("ghost", "E1", &s(&["a"])))?;
            Ok(())
        });
        assert!(res.is_err());
        assert_eq!(ws, before);
    }

    #[test]
    fn all_assets_in_key_order() {
        let mut ws = MemoryWorldState::new();
        new_voter(&mut ws, "b", "Bea").unwrap();
        new_election(&mut ws, "a", "Board", &s(&["b"]), &s(&[])).unwrap();
        let all = get_all_assets(&mut ws).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].contains("\"RegisteredVoters\":[\"b\"]"));
    }

    #[test]
    fn storage_failure_surfaces() {
        let mut ws = BrokenWorldState;
        assert_eq!(init_ledger(&mut ws).unwrap_err().code(), "StorageError");
        assert_eq!(get_voter(&mut ws, "v1").unwrap_err().code(), "StorageError");
        assert_eq!(get_all_assets(&mut ws).unwrap_err().code(), "StorageError");
    }
}
