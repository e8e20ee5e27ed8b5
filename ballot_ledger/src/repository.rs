//! Typed access to the records of the world state.

use log::debug;
use snafu::prelude::*;

use crate::entities::{Ballot, Election, Record, VotableItem, Voter};
use crate::error::*;
use crate::world_state::WorldState;

/// The outcome of reading one key.
///
/// Storage failures are reported by the surrounding `Result`, so the three
/// cases found / missing / failed never collapse into one.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Lookup<T> {
    Found(T),
    Missing,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Turns a missing record into [`LedgerError::NotFound`].
    pub fn found(self, kind: &'static str, id: &str) -> LedgerResult<T> {
        match self {
            Lookup::Found(x) => Ok(x),
            Lookup::Missing => NotFoundSnafu { kind, id }.fail(),
        }
    }
}

/// Loads and saves the ledger records. Holds no state of its own: every read
/// goes to the world state.
pub struct Repository<'s, W: WorldState + ?Sized> {
    state: &'s mut W,
}

impl<'s, W: WorldState + ?Sized> Repository<'s, W> {
    pub fn new(state: &'s mut W) -> Repository<'s, W> {
        Repository { state }
    }

    /// The raw bytes stored at this key.
    pub fn lookup_raw(&self, id: &str) -> LedgerResult<Lookup<Vec<u8>>> {
        let bytes = self.state.get_state(id).context(StorageSnafu)?;
        Ok(match bytes {
            Some(b) => Lookup::Found(b),
            None => Lookup::Missing,
        })
    }

    pub fn lookup<R: Record>(&self, id: &str) -> LedgerResult<Lookup<R>> {
        match self.lookup_raw(id)? {
            Lookup::Found(bytes) => {
                let record: R = serde_json::from_slice(&bytes).context(DecodeSnafu {
                    kind: R::KIND,
                    id,
                })?;
                Ok(Lookup::Found(record))
            }
            Lookup::Missing => Ok(Lookup::Missing),
        }
    }

    pub fn load<R: Record>(&self, id: &str) -> LedgerResult<R> {
        self.lookup::<R>(id)?.found(R::KIND, id)
    }

    pub fn save<R: Record>(&mut self, record: &R) -> LedgerResult<()> {
        let id = record.id();
        let bytes = serde_json::to_vec(record).context(EncodeSnafu { kind: R::KIND, id })?;
        debug!("save: {} {} ({} bytes)", R::KIND, id, bytes.len());
        self.state.put_state(id, &bytes).context(StorageSnafu)
    }

    pub fn get_voter(&self, id: &str) -> LedgerResult<Voter> {
        self.load(id)
    }

    pub fn put_voter(&mut self, voter: &Voter) -> LedgerResult<()> {
        self.save(voter)
    }

    pub fn get_election(&self, id: &str) -> LedgerResult<Election> {
        self.load(id)
    }

    pub fn put_election(&mut self, election: &Election) -> LedgerResult<()> {
        self.save(election)
    }

    pub fn get_votable_item(&self, id: &str) -> LedgerResult<VotableItem> {
        self.load(id)
    }

    pub fn put_votable_item(&mut self, item: &VotableItem) -> LedgerResult<()> {
        self.save(item)
    }

    pub fn get_ballot(&self, id: &str) -> LedgerResult<Ballot> {
        self.load(id)
    }

    pub fn put_ballot(&mut self, ballot: &Ballot) -> LedgerResult<()> {
        self.save(ballot)
    }

    /// True when some record, of any kind, is stored at this key.
    pub fn exists(&self, id: &str) -> LedgerResult<bool> {
        Ok(self.lookup_raw(id)?.is_found())
    }

    /// Every stored value of the keyspace, in key order.
    pub fn list_all(&self) -> LedgerResult<Vec<String>> {
        let kvs = self.state.get_state_by_range("", "").context(StorageSnafu)?;
        debug!("list_all: {} record(s)", kvs.len());
        Ok(kvs
            .into_iter()
            .map(|(_, v)| String::from_utf8_lossy(&v).into_owned())
            .collect())
    }

    pub fn delete(&mut self, id: &str) -> LedgerResult<()> {
        ensure!(
            self.exists(id)?,
            NotFoundSnafu {
                kind: "asset",
                id
            }
        );
        self.state.del_state(id).context(StorageSnafu)
    }
}
