//! Elections, voters, votable items and ranked ballots recorded on a shared
//! transactional key-value world state, with a Borda count tally.
//!
//! The entry points are the operations of [`contract`]: every one of them takes
//! the world state as an argument and runs as a single transaction against it.
//! Any type implementing [`WorldState`] can stand in for the store;
//! [`MemoryWorldState`] is an in-memory one.
//!
//! ```
//! use ballot_ledger::{contract, MemoryWorldState};
//! # use ballot_ledger::LedgerError;
//!
//! let mut state = MemoryWorldState::new();
//! let ids = |xs: &[&str]| xs.iter().map(|x| x.to_string()).collect::<Vec<String>>();
//!
//! contract::new_voter(&mut state, "v1", "Anna")?;
//! contract::new_voter(&mut state, "v2", "Bob")?;
//! contract::new_election(&mut state, "E1", "Chair", &ids(&["v1", "v2"]), &ids(&["item1", "item2"]))?;
//!
//! contract::cast_vote(&mut state, "v1", "E1", &ids(&["item1", "item2"]))?;
//! contract::cast_vote(&mut state, "v2", "E1", &ids(&["item2", "item1"]))?;
//!
//! let results = contract::get_results(&mut state, "E1")?;
//! assert_eq!(results.to_string(), "map[item1:3 item2:3]");
//! # Ok::<(), LedgerError>(())
//! ```

pub mod builder;
pub mod contract;
mod entities;
mod error;
pub mod manual;
mod repository;
pub mod standings;
mod tally;
mod validator;
pub mod voting;
mod world_state;

pub use crate::entities::*;
pub use crate::error::*;
pub use crate::repository::{Lookup, Repository};
pub use crate::standings::{Standing, TieBreakMode};
pub use crate::tally::{borda_weight, tally, ElectionResults};
pub use crate::validator::{check_selection, validate_ballot};
pub use crate::world_state::{KeyValue, MemoryWorldState, Transaction, WorldState, WriteSet};
