use log::info;
use snafu::prelude::*;

use crate::entities::*;
use crate::error::*;
use crate::repository::Repository;
use crate::world_state::{Transaction, WorldState};

/// A builder for seeding voters, votable items and elections.
///
/// Nothing is written until [`SeedBuilder::commit`], which stores every record
/// in one transaction.
///
/// ```
/// use ballot_ledger::builder::SeedBuilder;
/// use ballot_ledger::MemoryWorldState;
/// # use ballot_ledger::LedgerError;
///
/// let mut state = MemoryWorldState::new();
/// SeedBuilder::new()
///     .voter("v1", "Anna")
///     .votable_item("a", "Proposal A", "Repaint the hall")
///     .votable_item("b", "Proposal B", "Fix the roof")
///     .election("E1", "Works", &["v1"], &["a", "b"])
///     .commit(&mut state)?;
///
/// assert_eq!(state.len(), 4);
/// # Ok::<(), LedgerError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SeedBuilder {
    voters: Vec<Voter>,
    items: Vec<VotableItem>,
    elections: Vec<Election>,
}

fn to_strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

impl SeedBuilder {
    pub fn new() -> SeedBuilder {
        SeedBuilder::default()
    }

    /// The fixed sample dataset: three voters, three items and one election
    /// for which only the first two voters and items are registered.
    pub fn sample() -> SeedBuilder {
        SeedBuilder::new()
            .voter("voter1", "Alan Turing")
            .voter("voter2", "Ada Lovelace")
            .voter("voter3", "Unregistered")
            .votable_item("item1", "A. Lincon", "Candidate for president.")
            .votable_item("item2", "R. Nixon", "Candidate for president.")
            .votable_item("item3", "N. Real", "Invalid Option.")
            .election(
                "election1",
                "Sample Presidential Election",
                &["voter1", "voter2"],
                &["item1", "item2"],
            )
    }

    pub fn voter(mut self, id: &str, name: &str) -> SeedBuilder {
        self.voters.push(Voter::new(id, name));
        self
    }

    pub fn votable_item(mut self, id: &str, name: &str, description: &str) -> SeedBuilder {
        self.items.push(VotableItem::new(id, name, description));
        self
    }

    pub fn election(
        mut self,
        id: &str,
        name: &str,
        voters: &[&str],
        items: &[&str],
    ) -> SeedBuilder {
        self.elections.push(Election::new(
            id,
            name,
            &to_strings(voters),
            &to_strings(items),
        ));
        self
    }

    /// Writes the records, voters first, then items, then elections.
    pub fn write<W: WorldState + ?Sized>(&self, repo: &mut Repository<W>) -> LedgerResult<()> {
        for voter in self.voters.iter() {
            repo.put_voter(voter)?;
        }
        for item in self.items.iter() {
            repo.put_votable_item(item)?;
        }
        for election in self.elections.iter() {
            repo.put_election(election)?;
        }
        Ok(())
    }

    /// Writes the records in a transaction of their own.
    pub fn commit<W: WorldState + ?Sized>(&self, state: &mut W) -> LedgerResult<()> {
        let mut txn = Transaction::begin("Seed", state);
        self.write(&mut Repository::new(&mut txn))?;
        txn.commit().context(StorageSnafu)?;
        info!(
            "Seeded {} voter(s), {} item(s), {} election(s)",
            self.voters.len(),
            self.items.len(),
            self.elections.len()
        );
        Ok(())
    }
}
