use log::{debug, info, warn};

use ballot_ledger::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::govote::config_reader::*;
use crate::govote::file_state::FileWorldState;
use crate::govote::io_common::*;

pub mod config_reader;
pub mod file_state;
pub mod io_common;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GoVoteError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display(
        "Could not reserve {path} to save the ledger: another invocation is saving it, or a previous one was interrupted (remove the file if so)"
    ))]
    ReservingLedger {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(
        "The ledger {path} was modified by another invocation since it was read, nothing was written; run the command again"
    ))]
    LedgerChanged { path: String },
    #[snafu(display("Error serializing JSON output"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Could not read the list of IDs {input:?}"))]
    ParsingIdList {
        source: serde_json::Error,
        input: String,
    },
    #[snafu(display("{operation} failed: {source}"))]
    Ledger {
        operation: String,
        source: LedgerError,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type GoVoteResult<T> = Result<T, GoVoteError>;

fn to_json<T: Serialize>(x: &T) -> GoVoteResult<JSValue> {
    serde_json::to_value(x).context(SerializingJsonSnafu)
}

/// Runs one command against the given world state and returns what should be
/// printed.
pub fn execute<W: WorldState + ?Sized>(
    command: &Command,
    state: &mut W,
    settings: &Settings,
) -> GoVoteResult<JSValue> {
    let operation = command.operation();
    let ledger_ctx = || LedgerSnafu { operation };
    debug!("execute: {:?}", command);

    let res = match command {
        Command::InitLedger => {
            contract::init_ledger(state).context(ledger_ctx())?;
            json!({ "initialized": true })
        }
        Command::NewVoter { id, name } => {
            to_json(&contract::new_voter(state, id, name).context(ledger_ctx())?)?
        }
        Command::NewElection {
            id,
            name,
            voters,
            items,
        } => {
            let voter_ids = parse_id_list(voters)?;
            let item_ids = parse_id_list(items)?;
            to_json(
                &contract::new_election(state, id, name, &voter_ids, &item_ids)
                    .context(ledger_ctx())?,
            )?
        }
        Command::NewVotableItem {
            id,
            name,
            description,
        } => to_json(
            &contract::new_votable_item(state, id, name, description).context(ledger_ctx())?,
        )?,
        Command::CastVote {
            voter_id,
            election_id,
            items,
        } => {
            let ranking = parse_id_list(items)?;
            to_json(
                &contract::cast_vote(state, voter_id, election_id, &ranking)
                    .context(ledger_ctx())?,
            )?
        }
        Command::Results {
            election_id,
            standings: with_standings,
            reference,
        } => {
            let results = contract::get_results(state, election_id).context(ledger_ctx())?;
            let js = if *with_standings {
                let election = contract::get_election(state, election_id).context(ledger_ctx())?;
                let st = standings::standings(&results, &election, settings.tiebreak_mode);
                results_to_json(&results, Some(&st))
            } else {
                results_to_json(&results, None)
            };
            if let Some(reference_path) = reference {
                check_reference(&js, reference_path)?;
            }
            js
        }
        Command::GetBallot { id } => {
            to_json(&contract::get_ballot(state, id).context(ledger_ctx())?)?
        }
        Command::GetVoter { id } => {
            to_json(&contract::get_voter(state, id).context(ledger_ctx())?)?
        }
        Command::GetElection { id } => {
            to_json(&contract::get_election(state, id).context(ledger_ctx())?)?
        }
        Command::GetVotableItem { id } => {
            to_json(&contract::get_votable_item(state, id).context(ledger_ctx())?)?
        }
        Command::AssetExists { id } => {
            json!(contract::asset_exists(state, id).context(ledger_ctx())?)
        }
        Command::AllAssets => {
            assets_to_json(&contract::get_all_assets(state).context(ledger_ctx())?)
        }
        Command::DeleteAsset { id } => {
            contract::delete_asset(state, id).context(ledger_ctx())?;
            json!({ "deleted": id })
        }
    };
    Ok(res)
}

/// Opens the ledger file, runs the command, writes the ledger back if the
/// command changed it, and prints the outcome.
pub fn run(args: &Args) -> GoVoteResult<()> {
    let settings = resolve_settings(args)?;
    let mut ledger = FileWorldState::open(&settings.ledger_path)?;

    let output = execute(&args.command, &mut ledger, &settings)?;
    if ledger.save_if_changed()? {
        info!(
            "{}: ledger {:?} updated",
            args.command.operation(),
            settings.ledger_path
        );
    }

    println!("{}", render_json(&output, settings.pretty)?);
    Ok(())
}
