// ********* Errors ***********

use snafu::Snafu;
use std::fmt::Display;

/// A failure reported by the world state itself.
///
/// Implementations of [`crate::WorldState`] return this; the ledger logic wraps it
/// into [`LedgerError::Storage`] without interpreting it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("failed to read {key} from world state: {message}"))]
    Read { key: String, message: String },
    #[snafu(display("failed to put {key} to world state: {message}"))]
    Write { key: String, message: String },
    #[snafu(display("failed to scan world state range [{start}, {end}): {message}"))]
    Scan {
        start: String,
        end: String,
        message: String,
    },
}

/// Why a ranked selection does not match the candidates of an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SelectionProblem {
    /// The ballot does not rank as many items as the election offers.
    WrongLength { expected: usize, found: usize },
    /// An item of the election is absent from the ballot.
    MissingItem { item: String },
}

impl Display for SelectionProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionProblem::WrongLength { expected, found } => write!(
                f,
                "invalid number of selected votable items: expected {}, found {}",
                expected, found
            ),
            SelectionProblem::MissingItem { item } => {
                write!(f, "votable item {} is missing from the ranking", item)
            }
        }
    }
}

/// Errors of the ledger operations.
///
/// Every operation returns the most specific of these. Nothing is retried and
/// a failed operation never leaves partial writes behind (see [`crate::Transaction`]).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LedgerError {
    #[snafu(display("the {kind} {id} does not exist"))]
    NotFound { kind: &'static str, id: String },

    #[snafu(display(
        "voter {voter_id} has already cast a ballot for election {election_id}"
    ))]
    AlreadyVoted {
        voter_id: String,
        election_id: String,
    },

    #[snafu(display("voter {voter_id} is not registered for the election {election_id}"))]
    NotRegistered {
        voter_id: String,
        election_id: String,
    },

    #[snafu(display("{problem}"))]
    InvalidSelection { problem: SelectionProblem },

    #[snafu(display("world state failure: {source}"))]
    Storage { source: StoreError },

    #[snafu(display("record {id} is not a valid {kind}: {source}"))]
    Decode {
        kind: &'static str,
        id: String,
        source: serde_json::Error,
    },

    #[snafu(display("failed to serialize {kind} {id}: {source}"))]
    Encode {
        kind: &'static str,
        id: String,
        source: serde_json::Error,
    },
}

impl LedgerError {
    /// The stable tag of this error, as reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound { .. } => "NotFound",
            LedgerError::AlreadyVoted { .. } => "AlreadyVoted",
            LedgerError::NotRegistered { .. } => "NotRegistered",
            LedgerError::InvalidSelection { .. } => "InvalidSelection",
            LedgerError::Storage { .. } => "StorageError",
            LedgerError::Decode { .. } => "DecodeError",
            LedgerError::Encode { .. } => "EncodeError",
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
